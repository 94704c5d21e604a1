use anyhow::Result;
use std::path::Path;

use allowance_deciles::{
    aggregate, apply_tax_prices, assign_by_state, assign_national, build_rows,
    check_revenue_neutrality, fetch_persons, national_base, state_bases, sweep, write_csv,
    DATA_URL,
};

fn main() -> Result<()> {
    println!("📊 Child allowance distributional impact by state");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Fetch the survey extract
    println!("\n📂 Fetching CPS/ASEC extract...");
    let persons = fetch_persons(DATA_URL)?;
    println!("✓ Loaded {} person records", persons.len());

    // 2. Aggregate to SPM units
    println!("\n🏠 Aggregating to SPM units...");
    let mut units = aggregate(&persons);
    println!("✓ {} SPM units", units.len());

    // 3. Assign resource deciles, nationally and within each state
    println!("\n📈 Assigning resource-per-person deciles...");
    assign_national(&mut units);
    assign_by_state(&mut units);

    // 4. Tax bases and per-unit tax prices
    println!("\n🧮 Computing tax prices...");
    let national = national_base(&units);
    let states = state_bases(&units);
    apply_tax_prices(&mut units, &national, &states)?;
    check_revenue_neutrality(&units)?;
    println!(
        "✓ Federal taxable income per child: ${:.0}",
        national.taxinc_per_child
    );

    // 5. Decile table, allowance sweep, output
    println!("\n🧾 Building scenario table...");
    let rows = build_rows(&units)?;
    let scenarios = sweep(&rows);

    let out = Path::new("deciles.csv");
    write_csv(out, &scenarios)?;
    println!("✓ Wrote {} rows to {}", scenarios.len(), out.display());

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🎉 Done");

    Ok(())
}

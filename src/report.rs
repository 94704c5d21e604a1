// Sweep & Reporter - decile-level impact cells crossed with allowance amounts
// Produces one flat CSV row per (decile, state, funding, monthly amount)

use crate::household::HouseholdUnit;
use crate::stats::weighted_mean;
use crate::taxprice::Funding;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Monthly allowance sweep: $0 to $500 in $25 steps.
pub const MONTHLY_STEP: u32 = 25;
pub const MONTHLY_MAX: u32 = 500;

/// Weighted mean net-per-dollar for one decile cell, before the sweep.
#[derive(Debug, Clone)]
pub struct DecileRow {
    pub decile: u8,
    pub net_per_dollar_ca: f64,
    pub funding: Funding,
    /// State name, or "US" for the national grouping.
    pub state: String,
    /// Weighted mean total resources of the cell's units.
    pub current_resources: f64,
}

/// One output row: a decile cell at one monthly allowance amount.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioRow {
    pub decile: u8,
    pub net_per_dollar_ca: f64,
    pub funding: Funding,
    pub state: String,
    pub current_resources: f64,
    pub monthly_ca: u32,
    pub net_chg: f64,
    pub pct_chg: f64,
}

/// Weighted mean net-per-dollar per cell for one funding scheme, grouped
/// either by (state decile, state) or by national decile with state "US".
fn grouped_net(
    units: &[HouseholdUnit],
    funding: Funding,
    by_state: bool,
) -> Vec<(u8, String, f64)> {
    let mut groups: HashMap<(u8, String), Vec<(f64, f64)>> = HashMap::new();
    for unit in units {
        let key = if by_state {
            (unit.state_decile, unit.state.clone())
        } else {
            (unit.decile, "US".to_string())
        };
        groups
            .entry(key)
            .or_default()
            .push((funding.net_per_dollar(unit), unit.spmwt));
    }

    let mut cells: Vec<(u8, String, f64)> = groups
        .into_iter()
        .map(|((decile, state), pairs)| (decile, state, weighted_mean(pairs)))
        .collect();
    cells.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    cells
}

/// Weighted mean total resources per cell, keyed by (decile, state), with
/// the national grouping under "US". The reference figure for percentage
/// changes.
fn current_resources(units: &[HouseholdUnit]) -> HashMap<(u8, String), f64> {
    let mut groups: HashMap<(u8, String), Vec<(f64, f64)>> = HashMap::new();
    for unit in units {
        groups
            .entry((unit.state_decile, unit.state.clone()))
            .or_default()
            .push((unit.spmtotres, unit.spmwt));
        groups
            .entry((unit.decile, "US".to_string()))
            .or_default()
            .push((unit.spmtotres, unit.spmwt));
    }

    groups
        .into_iter()
        .map(|(key, pairs)| (key, weighted_mean(pairs)))
        .collect()
}

/// Build the decile table: every funding scheme crossed with the per-state
/// and national groupings, joined against current resources.
pub fn build_rows(units: &[HouseholdUnit]) -> Result<Vec<DecileRow>> {
    let resources = current_resources(units);

    let mut rows = Vec::new();
    for funding in Funding::ALL {
        for by_state in [true, false] {
            for (decile, state, net) in grouped_net(units, funding, by_state) {
                let current = *resources
                    .get(&(decile, state.clone()))
                    .with_context(|| {
                        format!("No resource figure for decile {} in {}", decile, state)
                    })?;
                rows.push(DecileRow {
                    decile,
                    net_per_dollar_ca: net,
                    funding,
                    state,
                    current_resources: current,
                });
            }
        }
    }
    Ok(rows)
}

/// Cross the decile table against every monthly allowance amount. A dollar
/// of monthly allowance is twelve annual dollars per child, so the net
/// change scales linearly with the amount.
pub fn sweep(rows: &[DecileRow]) -> Vec<ScenarioRow> {
    let amounts: Vec<u32> = (0..=MONTHLY_MAX).step_by(MONTHLY_STEP as usize).collect();

    let mut scenarios = Vec::with_capacity(rows.len() * amounts.len());
    for &monthly in &amounts {
        for row in rows {
            let net_chg = monthly as f64 * 12.0 * row.net_per_dollar_ca;
            scenarios.push(ScenarioRow {
                decile: row.decile,
                net_per_dollar_ca: row.net_per_dollar_ca,
                funding: row.funding,
                state: row.state.clone(),
                current_resources: row.current_resources,
                monthly_ca: monthly,
                net_chg,
                pct_chg: 100.0 * net_chg / row.current_resources,
            });
        }
    }
    scenarios
}

/// Write the scenario table as CSV with one header row.
pub fn write_csv(path: &Path, scenarios: &[ScenarioRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("Failed to create output CSV")?;
    for scenario in scenarios {
        writer
            .serialize(scenario)
            .context("Failed to write scenario row")?;
    }
    writer.flush().context("Failed to flush output CSV")?;
    Ok(())
}

// Tax-Price Calculator - taxable income per child and per-unit tax price
// A unit's tax per dollar of child allowance is its taxable income divided
// by the partition's taxable income per child: a unit with average income
// pays the average amount, and deviations scale in proportion to income.

use crate::household::HouseholdUnit;
use crate::stats::{weighted_mean, weighted_sum};
use anyhow::{ensure, Context, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Absolute tolerance for the revenue-neutrality checks.
const NEUTRALITY_TOL: f64 = 1e-5;

/// Who bears the offsetting tax cost of the allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Funding {
    #[serde(rename = "deficit")]
    Deficit,
    #[serde(rename = "fed")]
    Fed,
    #[serde(rename = "state")]
    State,
}

impl Funding {
    pub const ALL: [Funding; 3] = [Funding::Deficit, Funding::Fed, Funding::State];

    pub fn label(&self) -> &'static str {
        match self {
            Funding::Deficit => "deficit",
            Funding::Fed => "fed",
            Funding::State => "state",
        }
    }

    /// The unit's net transfer per allowance dollar under this scheme.
    pub fn net_per_dollar(&self, unit: &HouseholdUnit) -> f64 {
        match self {
            Funding::Deficit => unit.net_per_dollar_deficit,
            Funding::Fed => unit.net_per_dollar_fed,
            Funding::State => unit.net_per_dollar_state,
        }
    }
}

/// Aggregate tax base for one partition (a state, or the nation).
#[derive(Debug, Clone)]
pub struct TaxBase {
    /// spmwt-weighted sum of unit taxable income.
    pub taxinc: f64,

    /// spmwt-weighted sum of unit children.
    pub children: f64,

    /// The funding denominator: taxinc / children.
    pub taxinc_per_child: f64,
}

impl TaxBase {
    fn from_units(units: &[&HouseholdUnit]) -> TaxBase {
        let taxinc = weighted_sum(units.iter().map(|u| (u.taxinc, u.spmwt)));
        let children = weighted_sum(units.iter().map(|u| (u.children, u.spmwt)));
        TaxBase {
            taxinc,
            children,
            taxinc_per_child: taxinc / children,
        }
    }
}

/// National tax base over all units.
pub fn national_base(units: &[HouseholdUnit]) -> TaxBase {
    let refs: Vec<&HouseholdUnit> = units.iter().collect();
    TaxBase::from_units(&refs)
}

/// One tax base per state.
pub fn state_bases(units: &[HouseholdUnit]) -> HashMap<String, TaxBase> {
    let mut grouped: HashMap<String, Vec<&HouseholdUnit>> = HashMap::new();
    for unit in units {
        grouped.entry(unit.state.clone()).or_default().push(unit);
    }

    grouped
        .into_iter()
        .map(|(state, members)| {
            let base = TaxBase::from_units(&members);
            (state, base)
        })
        .collect()
}

/// Fill in each unit's tax price and net transfer per allowance dollar
/// under all three funding schemes. Deficit funding levies no offsetting
/// tax, so its net transfer is the child count.
pub fn apply_tax_prices(
    units: &mut [HouseholdUnit],
    national: &TaxBase,
    states: &HashMap<String, TaxBase>,
) -> Result<()> {
    for unit in units.iter_mut() {
        let state_base = states
            .get(&unit.state)
            .with_context(|| format!("No tax base for state {}", unit.state))?;

        unit.tax_per_dollar_fed = unit.taxinc / national.taxinc_per_child;
        unit.net_per_dollar_fed = unit.children - unit.tax_per_dollar_fed;
        unit.tax_per_dollar_state = unit.taxinc / state_base.taxinc_per_child;
        unit.net_per_dollar_state = unit.children - unit.tax_per_dollar_state;
        unit.tax_per_dollar_deficit = 0.0;
        unit.net_per_dollar_deficit = unit.children;
    }
    Ok(())
}

/// Correctness assertion on the computed data: the federal scheme must net
/// out to zero, both overall and averaged across the national deciles. A
/// failure signals a logic or data error and aborts the run.
pub fn check_revenue_neutrality(units: &[HouseholdUnit]) -> Result<()> {
    let overall = weighted_mean(units.iter().map(|u| (u.net_per_dollar_fed, u.spmwt)));
    ensure!(
        overall.abs() <= NEUTRALITY_TOL,
        "Federal scheme is not revenue-neutral: overall weighted mean {}",
        overall
    );

    let mut decile_mean_sum = 0.0;
    let mut decile_count = 0.0;
    for decile in 1..=10u8 {
        let pairs: Vec<(f64, f64)> = units
            .iter()
            .filter(|u| u.decile == decile)
            .map(|u| (u.net_per_dollar_fed, u.spmwt))
            .collect();
        if pairs.is_empty() {
            continue;
        }
        decile_mean_sum += weighted_mean(pairs);
        decile_count += 1.0;
    }
    let across_deciles = decile_mean_sum / decile_count;
    ensure!(
        across_deciles.abs() <= NEUTRALITY_TOL,
        "Federal scheme is not revenue-neutral across deciles: mean of decile means {}",
        across_deciles
    );

    Ok(())
}

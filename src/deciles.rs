// Decile Assigner - survey-weighted deciles of resources per person
// Ranks SPM units nationally and within each state

use crate::household::HouseholdUnit;
use std::collections::HashMap;

/// Weighted decile rank for each observation of (value, weight).
///
/// Observations are ranked by value; the exact percentile of each one is
/// its running share of total weight, inclusive of its own weight. The
/// decile is ceil(percentile / 10), clamped into 1..=10: zero-weight rows
/// at the bottom of the sort would otherwise land in "decile 0", and
/// negative-resource units belong in the bottom decile rather than a
/// category of their own.
fn weighted_decile_ranks(observations: &[(f64, f64)]) -> Vec<u8> {
    let mut order: Vec<usize> = (0..observations.len()).collect();
    order.sort_by(|&a, &b| observations[a].0.total_cmp(&observations[b].0));

    let total_weight: f64 = observations.iter().map(|&(_, weight)| weight).sum();

    let mut deciles = vec![1u8; observations.len()];
    let mut cumulative = 0.0;
    for &i in &order {
        cumulative += observations[i].1;
        let percentile = 100.0 * cumulative / total_weight;
        let decile = (percentile / 10.0).ceil() as i32;
        deciles[i] = decile.clamp(1, 10) as u8;
    }
    deciles
}

/// Assign the national decile of resources per person to every unit.
pub fn assign_national(units: &mut [HouseholdUnit]) {
    let observations: Vec<(f64, f64)> =
        units.iter().map(|u| (u.resources_pp, u.spmwt)).collect();
    let ranks = weighted_decile_ranks(&observations);
    for (unit, decile) in units.iter_mut().zip(ranks) {
        unit.decile = decile;
    }
}

/// Assign the within-state decile, computed independently per state.
pub fn assign_by_state(units: &mut [HouseholdUnit]) {
    let mut by_state: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, unit) in units.iter().enumerate() {
        by_state.entry(unit.state.clone()).or_default().push(i);
    }

    for indices in by_state.values() {
        let observations: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (units[i].resources_pp, units[i].spmwt))
            .collect();
        let ranks = weighted_decile_ranks(&observations);
        for (&i, decile) in indices.iter().zip(ranks) {
            units[i].state_decile = decile;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_unit(state: &str, resources_pp: f64, spmwt: f64) -> HouseholdUnit {
        HouseholdUnit {
            spmfamunit: 0,
            year: 2019,
            state: state.to_string(),
            spmwt,
            spmtotres: resources_pp,
            children: 0.0,
            persons: 1.0,
            taxinc: 0.0,
            person_weight: spmwt,
            resources_pp,
            decile: 0,
            state_decile: 0,
            tax_per_dollar_fed: 0.0,
            net_per_dollar_fed: 0.0,
            tax_per_dollar_state: 0.0,
            net_per_dollar_state: 0.0,
            tax_per_dollar_deficit: 0.0,
            net_per_dollar_deficit: 0.0,
        }
    }

    #[test]
    fn test_equal_weights_spread_across_deciles() {
        let mut units: Vec<HouseholdUnit> = (1..=10)
            .map(|i| make_unit("California", i as f64 * 1_000.0, 1.0))
            .collect();

        assign_national(&mut units);

        for (i, unit) in units.iter().enumerate() {
            assert_eq!(unit.decile, (i + 1) as u8);
        }
    }

    #[test]
    fn test_deciles_stay_in_bounds() {
        let mut units: Vec<HouseholdUnit> = (0..137)
            .map(|i| make_unit("Texas", (i as f64 - 40.0) * 317.0, 1.0 + (i % 7) as f64))
            .collect();

        assign_national(&mut units);
        assign_by_state(&mut units);

        for unit in &units {
            assert!((1..=10).contains(&unit.decile));
            assert!((1..=10).contains(&unit.state_decile));
        }
    }

    #[test]
    fn test_negative_resources_land_in_bottom_decile() {
        let mut units: Vec<HouseholdUnit> = (1..=9)
            .map(|i| make_unit("California", i as f64 * 1_000.0, 1.0))
            .collect();
        units.push(make_unit("California", -5_000.0, 1.0));

        assign_national(&mut units);

        assert_eq!(units[9].decile, 1);
    }

    #[test]
    fn test_zero_weight_row_clamped_to_decile_one() {
        let mut units = vec![
            make_unit("California", -100.0, 0.0),
            make_unit("California", 1_000.0, 1.0),
        ];

        assign_national(&mut units);

        // Percentile 0 would give decile 0; the floor pulls it up to 1.
        assert_eq!(units[0].decile, 1);
    }

    #[test]
    fn test_state_deciles_partition_independently() {
        // California units are all poorer than Texas units; within each
        // state the ranking still spans 1..=10.
        let mut units: Vec<HouseholdUnit> = (1..=10)
            .map(|i| make_unit("California", i as f64 * 100.0, 1.0))
            .chain((1..=10).map(|i| make_unit("Texas", 50_000.0 + i as f64 * 100.0, 1.0)))
            .collect();

        assign_national(&mut units);
        assign_by_state(&mut units);

        for (i, unit) in units.iter().enumerate() {
            assert_eq!(unit.state_decile, ((i % 10) + 1) as u8);
        }
        // Nationally, every Texas unit outranks every California unit.
        assert!(units[..10].iter().all(|u| u.decile <= 5));
        assert!(units[10..].iter().all(|u| u.decile >= 6));
    }

    #[test]
    fn test_weight_mass_drives_the_cut_points() {
        // One unit carries 90% of the weight: it fills deciles up to 9,
        // and the heavier-resourced unit takes the top decile.
        let mut units = vec![
            make_unit("California", 1_000.0, 9.0),
            make_unit("California", 2_000.0, 1.0),
        ];

        assign_national(&mut units);

        assert_eq!(units[0].decile, 9);
        assert_eq!(units[1].decile, 10);
    }
}

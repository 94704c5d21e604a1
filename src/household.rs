// Household Aggregator - person records → SPM units
// Groups member rows into resource-sharing units and sums their counts

use crate::loader::PersonRecord;
use std::collections::HashMap;

/// One SPM (Supplemental Poverty Measure) resource-sharing unit.
///
/// Decile and tax-price fields start at zero and are filled in by the
/// later pipeline stages; nothing else is mutated after aggregation.
#[derive(Debug, Clone)]
pub struct HouseholdUnit {
    pub spmfamunit: u64,
    pub year: u16,
    pub state: String,

    /// SPM unit weight (already divided down to one year).
    pub spmwt: f64,

    /// Total SPM unit resources.
    pub spmtotres: f64,

    /// Members under 18, summed over rows.
    pub children: f64,

    /// Member count.
    pub persons: f64,

    /// Taxable income summed over members.
    pub taxinc: f64,

    /// spmwt * persons: weight representing number of people.
    pub person_weight: f64,

    /// Resources per person; the decile ranking variable.
    pub resources_pp: f64,

    /// National decile of resources per person (1..=10).
    pub decile: u8,

    /// Within-state decile of resources per person (1..=10).
    pub state_decile: u8,

    pub tax_per_dollar_fed: f64,
    pub net_per_dollar_fed: f64,
    pub tax_per_dollar_state: f64,
    pub net_per_dollar_state: f64,
    pub tax_per_dollar_deficit: f64,
    pub net_per_dollar_deficit: f64,
}

impl HouseholdUnit {
    fn from_member(person: &PersonRecord) -> HouseholdUnit {
        HouseholdUnit {
            spmfamunit: person.spmfamunit,
            year: person.year,
            state: person.state.clone(),
            spmwt: person.spmwt,
            spmtotres: person.spmtotres,
            children: 0.0,
            persons: 0.0,
            taxinc: 0.0,
            person_weight: 0.0,
            resources_pp: 0.0,
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
}

/// Group person rows into SPM units, summing children, persons and taxable
/// income. The key mirrors the unit identity: family id, year and state,
/// plus the unit-level weight and resource values repeated on member rows
/// (float components keyed by bit pattern). Assumes well-formed input.
pub fn aggregate(persons: &[PersonRecord]) -> Vec<HouseholdUnit> {
    let mut units: HashMap<(u64, u16, String, u64, u64), HouseholdUnit> = HashMap::new();

    for person in persons {
        let key = (
            person.spmfamunit,
            person.year,
            person.state.clone(),
            person.spmwt.to_bits(),
            person.spmtotres.to_bits(),
        );
        let unit = units
            .entry(key)
            .or_insert_with(|| HouseholdUnit::from_member(person));
        if person.child {
            unit.children += 1.0;
        }
        unit.persons += 1.0;
        unit.taxinc += person.taxinc;
    }

    let mut units: Vec<HouseholdUnit> = units.into_values().collect();
    for unit in &mut units {
        unit.person_weight = unit.spmwt * unit.persons;
        unit.resources_pp = unit.spmtotres / unit.persons;
    }

    // Deterministic order for the downstream decile sort.
    units.sort_by(|a, b| {
        (a.year, &a.state, a.spmfamunit).cmp(&(b.year, &b.state, b.spmfamunit))
    });
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_person(
        spmfamunit: u64,
        year: u16,
        age: u8,
        taxinc: f64,
        spmwt: f64,
        spmtotres: f64,
    ) -> PersonRecord {
        PersonRecord {
            year,
            statefip: 6,
            age,
            asecwt: spmwt,
            spmwt,
            taxinc,
            adjginc: taxinc,
            spmfamunit,
            spmtotres,
            state: "California".to_string(),
            child: age < 18,
        }
    }

    #[test]
    fn test_members_summed_into_one_unit() {
        let persons = vec![
            make_person(1, 2019, 40, 50_000.0, 100.0, 42_000.0),
            make_person(1, 2019, 38, 20_000.0, 100.0, 42_000.0),
            make_person(1, 2019, 10, 0.0, 100.0, 42_000.0),
            make_person(1, 2019, 7, 0.0, 100.0, 42_000.0),
        ];

        let units = aggregate(&persons);
        assert_eq!(units.len(), 1);

        let unit = &units[0];
        assert_eq!(unit.persons, 4.0);
        assert_eq!(unit.children, 2.0);
        assert_eq!(unit.taxinc, 70_000.0);
        assert_eq!(unit.resources_pp, 10_500.0);
        assert_eq!(unit.person_weight, 400.0);
    }

    #[test]
    fn test_distinct_family_ids_stay_separate() {
        let persons = vec![
            make_person(1, 2019, 40, 50_000.0, 100.0, 42_000.0),
            make_person(2, 2019, 40, 30_000.0, 80.0, 25_000.0),
        ];

        let units = aggregate(&persons);
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn test_same_id_different_year_stays_separate() {
        let persons = vec![
            make_person(7, 2018, 40, 10_000.0, 100.0, 20_000.0),
            make_person(7, 2019, 40, 10_000.0, 100.0, 20_000.0),
        ];

        let units = aggregate(&persons);
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn test_decile_fields_start_unassigned() {
        let persons = vec![make_person(1, 2019, 40, 0.0, 100.0, 10_000.0)];
        let units = aggregate(&persons);
        assert_eq!(units[0].decile, 0);
        assert_eq!(units[0].state_decile, 0);
    }
}

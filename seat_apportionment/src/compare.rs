use std::collections::BTreeSet;

use crate::config::*;

/// The seats of one party in two scenarios.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeatShift {
    pub party: String,
    pub base_seats: u32,
    pub other_seats: u32,
    pub delta: i64,
}

/// Differences between two apportionments of the same election, for example
/// before and after editing vote projections.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScenarioComparison {
    /// One entry per party present in either scenario, by party name.
    pub shifts: Vec<SeatShift>,
    /// Elected in the other scenario but not in the base one.
    pub entering: Vec<ElectedCandidate>,
    /// Elected in the base scenario but not in the other one.
    pub leaving: Vec<ElectedCandidate>,
}

impl ScenarioComparison {
    pub fn is_unchanged(&self) -> bool {
        self.entering.is_empty()
            && self.leaving.is_empty()
            && self.shifts.iter().all(|s| s.delta == 0)
    }
}

pub fn compare_results(
    base: &ApportionmentResult,
    other: &ApportionmentResult,
) -> ScenarioComparison {
    let names: BTreeSet<&str> = base
        .parties
        .iter()
        .chain(other.parties.iter())
        .map(|p| p.name.as_str())
        .collect();
    let seats_of = |r: &ApportionmentResult, name: &str| {
        r.party(name).map(|p| p.total_seats).unwrap_or(0)
    };
    let shifts = names
        .iter()
        .map(|name| {
            let base_seats = seats_of(base, name);
            let other_seats = seats_of(other, name);
            SeatShift {
                party: name.to_string(),
                base_seats,
                other_seats,
                delta: other_seats as i64 - base_seats as i64,
            }
        })
        .collect();

    let is_in = |r: &ApportionmentResult, e: &ElectedCandidate| {
        r.elected
            .iter()
            .any(|x| x.party == e.party && x.name == e.name)
    };
    let entering = other
        .elected
        .iter()
        .filter(|e| !is_in(base, *e))
        .cloned()
        .collect();
    let leaving = base
        .elected
        .iter()
        .filter(|e| !is_in(other, *e))
        .cloned()
        .collect();

    ScenarioComparison {
        shifts,
        entering,
        leaving,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_apportionment;

    fn party(name: &str, cands: &[(&str, i64)]) -> Party {
        Party {
            name: name.to_string(),
            candidates: cands.iter().map(|(n, v)| Candidate::new(n, *v)).collect(),
            list_votes: 0,
        }
    }

    #[test]
    fn seat_moves_between_parties() {
        // A: 410000 (2 direct, average 136666), B: 270000 (1 direct, average 135000).
        let base = vec![
            party("A", &[("A1", 300_000), ("A2", 100_000), ("A3", 10_000)]),
            party("B", &[("B1", 200_000), ("B2", 50_000), ("B3", 20_000)]),
        ];
        // B reaches 290000 (average 145000) and takes the leftover seat.
        let mut edited = base.clone();
        edited[1].candidates[2].votes = 40_000;

        let rules = ApportionmentRules::with_seats(4);
        let r1 = compute_apportionment(&base, 190_000.0, &rules).unwrap();
        let r2 = compute_apportionment(&edited, 190_000.0, &rules).unwrap();
        let cmp = compare_results(&r1, &r2);

        assert_eq!(
            cmp.shifts,
            vec![
                SeatShift {
                    party: "A".to_string(),
                    base_seats: 3,
                    other_seats: 2,
                    delta: -1
                },
                SeatShift {
                    party: "B".to_string(),
                    base_seats: 1,
                    other_seats: 2,
                    delta: 1
                },
            ]
        );
        let entering: Vec<&str> = cmp.entering.iter().map(|e| e.name.as_str()).collect();
        let leaving: Vec<&str> = cmp.leaving.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(entering, vec!["B2"]);
        assert_eq!(leaving, vec!["A3"]);
        assert!(!cmp.is_unchanged());
    }

    #[test]
    fn same_scenario_is_unchanged() {
        let parties = vec![party("A", &[("A1", 400_000)]), party("B", &[("B1", 200_000)])];
        let r = compute_apportionment(&parties, 190_000.0, &ApportionmentRules::with_seats(3))
            .unwrap();
        let cmp = compare_results(&r, &r);
        assert!(cmp.is_unchanged());
        assert_eq!(cmp.shifts[0].party, "A");
    }
}

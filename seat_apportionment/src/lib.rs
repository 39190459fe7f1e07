/*!
Seat apportionment under the Brazilian proportional rules.

Seats are distributed in two phases:
1. every party that reaches the eligibility threshold (80% of the electoral
   quotient by default) gets `floor(total / quotient)` direct seats,
2. the seats left over are awarded one at a time to the eligible party with
   the highest average `total / (seats + 1)` (D'Hondt).

The seats of each party are then filled by its candidates, by decreasing
number of votes.

```
use seat_apportionment::*;

let mut a = Party::new("A");
a.candidates.push(Candidate::new("Ana", 950_000));
let mut b = Party::new("B");
b.candidates.push(Candidate::new("Bruno", 250_000));
b.list_votes = 150_000;

let res = compute_apportionment(&[a, b], 190_000.0, &ApportionmentRules::DEFAULT_RULES)?;
assert_eq!(res.party("A").map(|p| p.total_seats), Some(6));
assert_eq!(res.party("B").map(|p| p.total_seats), Some(2));
# Ok::<(), ApportionmentErrors>(())
```
*/

pub mod builder;
pub mod compare;
mod config;
pub mod manual;
pub mod ordering;

use log::{debug, info, warn};

use std::{cmp::Ordering, collections::HashSet};

pub use crate::compare::{compare_results, ScenarioComparison, SeatShift};
pub use crate::config::*;
pub use crate::ordering::{order_results, OrderedReport};

// **** Private structures ****

type RoundId = u32;

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);

    fn checked_add(self, rhs: VoteCount) -> Option<VoteCount> {
        self.0.checked_add(rhs.0).map(VoteCount)
    }
}

// The votes of one party, once validated.
#[derive(Eq, PartialEq, Debug, Clone)]
struct PartyTally {
    name: String,
    // Named candidates only, in list order, with their gender.
    candidates: Vec<(String, VoteCount, Option<String>)>,
    candidate_votes: VoteCount,
    list_votes: VoteCount,
    total: VoteCount,
}

// A party competing for leftover seats.
#[derive(PartialEq, Debug, Clone)]
struct Contender {
    // Index in the input list.
    idx: usize,
    name: String,
    total: VoteCount,
    seats: u32,
    quotients: Vec<f64>,
}

/// Computes the seats won by each party and the candidates who fill them.
///
/// Arguments:
/// * `parties` the snapshot of the parties, their candidates and list votes
/// * `quotient` the electoral quotient: the number of votes worth one direct seat
/// * `rules` the seat budget, the eligibility threshold and the tie-break mode
///
/// Situations that still allow a result (no eligible party, direct seats
/// above the budget, not enough candidates) are reported in
/// [ApportionmentResult::conditions].
pub fn compute_apportionment(
    parties: &[Party],
    quotient: f64,
    rules: &ApportionmentRules,
) -> Result<ApportionmentResult, ApportionmentErrors> {
    info!(
        "Processing {:?} parties, quotient: {:?}, rules: {:?}",
        parties.len(),
        quotient,
        rules
    );
    check_quotient(quotient)?;
    if rules.seat_budget == 0 {
        return Err(ApportionmentErrors::InvalidSeatBudget);
    }
    check_party_names(parties)?;

    let tallies: Vec<PartyTally> = parties
        .iter()
        .map(aggregate_votes)
        .collect::<Result<Vec<_>, _>>()?;

    let eligibility_threshold = quotient * rules.eligibility_percent as f64 / 100.0;
    let eligible: Vec<bool> = tallies
        .iter()
        .map(|t| is_eligible(t.total, quotient, rules.eligibility_percent))
        .collect();
    for (t, e) in tallies.iter().zip(eligible.iter()) {
        debug!(
            "compute_apportionment: party {}: total {:?} (list {:?}) eligible: {:?}",
            t.name, t.total.0, t.list_votes.0, e
        );
    }

    let mut conditions: Vec<Condition> = Vec::new();

    // Direct seats. Ineligible parties get none, whatever their count.
    let mut contenders: Vec<Contender> = tallies
        .iter()
        .enumerate()
        .filter(|(idx, _)| eligible[*idx])
        .map(|(idx, t)| Contender {
            idx,
            name: t.name.clone(),
            total: t.total,
            seats: direct_seats(t.total, quotient),
            quotients: Vec::new(),
        })
        .collect();
    let direct: Vec<u32> = (0..tallies.len())
        .map(|idx| {
            contenders
                .iter()
                .find(|c| c.idx == idx)
                .map(|c| c.seats)
                .unwrap_or(0)
        })
        .collect();

    let total_direct: u64 = direct.iter().map(|s| *s as u64).sum();
    info!(
        "Direct seats: {} of {} (threshold: {})",
        total_direct, rules.seat_budget, eligibility_threshold
    );

    let remaining_seats: u32 = if total_direct > rules.seat_budget as u64 {
        warn!(
            "Direct seats ({}) exceed the seat budget ({}), no leftover seat is awarded",
            total_direct, rules.seat_budget
        );
        conditions.push(Condition::DirectSeatOverflow {
            direct_seats: u32::try_from(total_direct).unwrap_or(u32::MAX),
            seat_budget: rules.seat_budget,
        });
        0
    } else {
        rules.seat_budget - total_direct as u32
    };

    if contenders.is_empty() {
        warn!("No party reached the eligibility threshold {}", eligibility_threshold);
        conditions.push(Condition::NoEligibleParties);
    }

    let rounds = allocate_remainder(&mut contenders, remaining_seats, rules.tiebreak_mode);

    // Assemble the per-party results, in input order.
    let mut party_results: Vec<PartyResult> = Vec::new();
    let mut elected: Vec<ElectedCandidate> = Vec::new();
    for (idx, t) in tallies.iter().enumerate() {
        let contender = contenders.iter().find(|c| c.idx == idx);
        let total_seats = contender.map(|c| c.seats).unwrap_or(0);
        let (standings, condition) = assign_candidates(t, direct[idx], total_seats);
        if let Some(c) = condition {
            warn!("compute_apportionment: {:?}", c);
            conditions.push(c);
        }
        for s in standings.iter() {
            if let Some(seat_type) = s.seat_type {
                elected.push(ElectedCandidate {
                    party: t.name.clone(),
                    name: s.name.clone(),
                    votes: s.votes,
                    rank_within_party: s.rank,
                    seat_type,
                    gender: s.gender.clone(),
                });
            }
        }
        party_results.push(PartyResult {
            name: t.name.clone(),
            candidate_votes: t.candidate_votes.0,
            list_votes: t.list_votes.0,
            total_votes: t.total.0,
            eligible: eligible[idx],
            projected_seats: t.total.0 as f64 / quotient,
            direct_seats: direct[idx],
            remainder_seats: total_seats - direct[idx],
            total_seats,
            quotient_history: contender.map(|c| c.quotients.clone()).unwrap_or_default(),
            standings,
        });
    }

    let seats_awarded: u32 = party_results.iter().map(|p| p.total_seats).sum();
    let seat_deficit = rules.seat_budget.saturating_sub(seats_awarded);
    info!(
        "Seats awarded: {} (deficit: {}), elected candidates: {}",
        seats_awarded,
        seat_deficit,
        elected.len()
    );

    Ok(ApportionmentResult {
        quotient,
        seat_budget: rules.seat_budget,
        eligibility_threshold,
        parties: party_results,
        elected,
        rounds,
        seats_awarded,
        seat_deficit,
        conditions,
    })
}

fn check_quotient(quotient: f64) -> Result<(), ApportionmentErrors> {
    if quotient.is_finite() && quotient > 0.0 {
        Ok(())
    } else {
        Err(ApportionmentErrors::InvalidQuotient)
    }
}

fn check_party_names(parties: &[Party]) -> Result<(), ApportionmentErrors> {
    let mut seen: HashSet<&str> = HashSet::new();
    for p in parties.iter() {
        if !seen.insert(p.name.as_str()) {
            return Err(ApportionmentErrors::DuplicateParty(p.name.clone()));
        }
    }
    Ok(())
}

fn to_count(
    votes: i64,
    party: &Party,
    candidate: Option<&str>,
) -> Result<VoteCount, ApportionmentErrors> {
    u64::try_from(votes)
        .map(VoteCount)
        .map_err(|_| ApportionmentErrors::InvalidVotes {
            party: party.name.clone(),
            candidate: candidate.map(|s| s.to_string()),
        })
}

/// Sums the named candidates and the list votes of a party. Sentinel
/// records are moved to the list votes.
fn aggregate_votes(party: &Party) -> Result<PartyTally, ApportionmentErrors> {
    let overflow = || ApportionmentErrors::InvalidVotes {
        party: party.name.clone(),
        candidate: None,
    };
    let mut candidates: Vec<(String, VoteCount, Option<String>)> = Vec::new();
    let mut candidate_votes = VoteCount::EMPTY;
    let mut list_votes = to_count(party.list_votes, party, None)?;
    for c in party.candidates.iter() {
        let vc = to_count(c.votes, party, Some(c.name.as_str()))?;
        if is_list_vote_sentinel(&c.name) {
            debug!(
                "aggregate_votes: party {}: sentinel record {:?} with {} votes",
                party.name, c.name, vc.0
            );
            list_votes = list_votes.checked_add(vc).ok_or_else(overflow)?;
        } else {
            candidate_votes = candidate_votes.checked_add(vc).ok_or_else(overflow)?;
            candidates.push((c.name.clone(), vc, c.gender.clone()));
        }
    }
    let total = candidate_votes
        .checked_add(list_votes)
        .ok_or_else(overflow)?;
    Ok(PartyTally {
        name: party.name.clone(),
        candidates,
        candidate_votes,
        list_votes,
        total,
    })
}

// total >= percent / 100 * quotient, without rounding the percentage.
fn is_eligible(total: VoteCount, quotient: f64, eligibility_percent: u32) -> bool {
    (total.0 as f64) * 100.0 >= (eligibility_percent as f64) * quotient
}

fn direct_seats(total: VoteCount, quotient: f64) -> u32 {
    let seats: u64 = if quotient.fract() == 0.0 && quotient <= u64::MAX as f64 {
        total.0 / (quotient as u64)
    } else {
        (total.0 as f64 / quotient).floor() as u64
    };
    u32::try_from(seats).unwrap_or(u32::MAX)
}

/// Awards `remaining_seats` seats one at a time with the D'Hondt averages.
/// Stops early if there is no contender.
fn allocate_remainder(
    contenders: &mut [Contender],
    remaining_seats: u32,
    tiebreak: TieBreakMode,
) -> Vec<AllocationRound> {
    let mut rounds: Vec<AllocationRound> = Vec::new();
    if contenders.is_empty() {
        return rounds;
    }
    for round_id in 1..=remaining_seats {
        for c in contenders.iter_mut() {
            let q = c.total.0 as f64 / (c.seats as f64 + 1.0);
            c.quotients.push(q);
        }

        let mut best: Vec<usize> = vec![0];
        for idx in 1..contenders.len() {
            let b = &contenders[best[0]];
            let c = &contenders[idx];
            match cmp_quotients(c.total, c.seats, b.total, b.seats) {
                Ordering::Greater => {
                    best.clear();
                    best.push(idx);
                }
                Ordering::Equal => best.push(idx),
                Ordering::Less => {}
            }
        }
        let tie = best.len() > 1;
        let winner = if tie {
            let w = resolve_tie(contenders, &best, tiebreak, round_id);
            debug!(
                "allocate_remainder: round {}: tie between {:?}, resolved for {}",
                round_id,
                best.iter()
                    .map(|idx| contenders[*idx].name.as_str())
                    .collect::<Vec<_>>(),
                contenders[w].name
            );
            w
        } else {
            best[0]
        };

        let c = &mut contenders[winner];
        let winning_quotient = c.quotients.last().cloned().unwrap_or_default();
        c.seats += 1;
        info!(
            "Round {}: {} wins a leftover seat with average {:.2} (now {} seats)",
            round_id, c.name, winning_quotient, c.seats
        );
        rounds.push(AllocationRound {
            round: round_id,
            party: c.name.clone(),
            winning_quotient,
            seat_number_awarded: c.seats,
            tie,
        });
    }
    rounds
}

/// Compares v_a/(s_a+1) with v_b/(s_b+1) without floats.
fn cmp_quotients(v_a: VoteCount, s_a: u32, v_b: VoteCount, s_b: u32) -> Ordering {
    let lhs = (v_a.0 as u128) * (s_b as u128 + 1);
    let rhs = (v_b.0 as u128) * (s_a as u128 + 1);
    lhs.cmp(&rhs)
}

// Returns the index (in contenders) of the winner among the tied ones.
fn resolve_tie(
    contenders: &[Contender],
    tied: &[usize],
    tiebreak: TieBreakMode,
    round_id: RoundId,
) -> usize {
    let mut sorted: Vec<usize> = tied.to_vec();
    match tiebreak {
        TieBreakMode::PartyName => {
            sorted.sort_by(|a, b| contenders[*a].name.cmp(&contenders[*b].name));
        }
        TieBreakMode::HigherVotes => {
            sorted.sort_by(|a, b| {
                let (ca, cb) = (&contenders[*a], &contenders[*b]);
                cb.total.cmp(&ca.total).then_with(|| ca.name.cmp(&cb.name))
            });
        }
        TieBreakMode::Random(seed) => {
            let names: Vec<(usize, String)> = tied
                .iter()
                .map(|idx| (*idx, contenders[*idx].name.clone()))
                .collect();
            sorted = party_permutation_crypto(&names, seed, round_id);
        }
    }
    sorted[0]
}

/// Generates a "random" permutation of the parties. Random in this context means hard to guess in advance.
/// The permutation only depends on the seed, the round and the party names.
fn party_permutation_crypto(
    parties: &[(usize, String)],
    seed: u32,
    round_id: RoundId,
) -> Vec<usize> {
    let mut data: Vec<(usize, String)> = parties
        .iter()
        .map(|(idx, name)| {
            (
                *idx,
                sha256::digest(format!("{:08}{:08}{}", seed, round_id, name)),
            )
        })
        .collect();
    data.sort_by(|a, b| a.1.cmp(&b.1));
    data.iter().map(|p| p.0).collect()
}

/// Ranks the named candidates of a party and marks the elected ones.
fn assign_candidates(
    tally: &PartyTally,
    direct: u32,
    total_seats: u32,
) -> (Vec<CandidateStanding>, Option<Condition>) {
    let mut ranked: Vec<&(String, VoteCount, Option<String>)> =
        tally.candidates.iter().collect();
    // Stable: equal votes keep the list order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let standings: Vec<CandidateStanding> = ranked
        .iter()
        .enumerate()
        .map(|(idx, (name, vc, gender))| {
            let rank = idx as u32;
            let seat_type = if rank >= total_seats {
                None
            } else if rank < direct {
                Some(SeatType::Direct)
            } else {
                Some(SeatType::Remainder)
            };
            CandidateStanding {
                name: name.clone(),
                votes: vc.0,
                rank,
                seat_type,
                gender: gender.clone(),
            }
        })
        .collect();

    let num_candidates = standings.len() as u32;
    let condition = if total_seats > num_candidates {
        Some(Condition::SeatsExceedCandidates {
            party: tally.name.clone(),
            seats: total_seats,
            candidates: num_candidates,
        })
    } else {
        None
    };
    (standings, condition)
}

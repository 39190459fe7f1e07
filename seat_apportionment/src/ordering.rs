use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;

use crate::config::*;

/// The results of an apportionment, in presentation order.
#[derive(PartialEq, Debug, Clone)]
pub struct OrderedReport {
    /// Eligible parties by decreasing first-round average, then the
    /// ineligible ones by decreasing total.
    pub parties: Vec<PartyResult>,
    /// Grouped by party in display order, by decreasing votes within a party.
    pub elected: Vec<ElectedCandidate>,
}

/// Orders the results for display. Seat counts are not touched.
///
/// `party_display_order` is the order in which parties are shown (ballot
/// order, for instance). Parties that are not listed come after, by name.
pub fn order_results(
    result: &ApportionmentResult,
    party_display_order: &[String],
) -> OrderedReport {
    order_parts(&result.parties, &result.elected, party_display_order)
}

impl OrderedReport {
    /// Applies the same ordering again. Ordering is idempotent, so this
    /// returns an identical report.
    pub fn reorder(&self, party_display_order: &[String]) -> OrderedReport {
        order_parts(&self.parties, &self.elected, party_display_order)
    }
}

fn order_parts(
    parties: &[PartyResult],
    elected: &[ElectedCandidate],
    party_display_order: &[String],
) -> OrderedReport {
    let mut sorted_parties: Vec<PartyResult> = parties.to_vec();
    sorted_parties.sort_by(cmp_parties);

    let display_rank: HashMap<&str, usize> = party_display_order
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();
    let mut sorted_elected: Vec<ElectedCandidate> = elected.to_vec();
    sorted_elected.sort_by(|a, b| {
        let ra = display_rank.get(a.party.as_str());
        let rb = display_rank.get(b.party.as_str());
        let by_party = match (ra, rb) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.party.cmp(&b.party),
        };
        by_party
            .then_with(|| b.votes.cmp(&a.votes))
            .then_with(|| a.rank_within_party.cmp(&b.rank_within_party))
    });
    debug!(
        "order_results: parties: {:?}",
        sorted_parties.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
    );

    OrderedReport {
        parties: sorted_parties,
        elected: sorted_elected,
    }
}

fn cmp_parties(a: &PartyResult, b: &PartyResult) -> Ordering {
    match (a.eligible, b.eligible) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => {
            // total_a / (direct_a + 1) vs total_b / (direct_b + 1), exact.
            let lhs = a.total_votes as u128 * (b.direct_seats as u128 + 1);
            let rhs = b.total_votes as u128 * (a.direct_seats as u128 + 1);
            rhs.cmp(&lhs).then_with(|| a.name.cmp(&b.name))
        }
        (false, false) => b
            .total_votes
            .cmp(&a.total_votes)
            .then_with(|| a.name.cmp(&b.name)),
    }
}

// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// Names under which party-list votes have historically been recorded as a
/// pseudo-candidate. Matching is done on the trimmed, upper-cased name.
pub const LIST_VOTE_SENTINELS: [&str; 2] = ["VOTOS LEGENDA", "LEGENDA"];

/// Returns true if this candidate name is the bookkeeping record for the
/// votes cast for the party label.
pub fn is_list_vote_sentinel(name: &str) -> bool {
    let n = name.trim().to_uppercase();
    LIST_VOTE_SENTINELS.iter().any(|s| *s == n)
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub name: String,
    /// Negative counts are rejected with [ApportionmentErrors::InvalidVotes].
    pub votes: i64,
    /// Display only. Never used for ranking.
    pub gender: Option<String>,
}

impl Candidate {
    pub fn new(name: &str, votes: i64) -> Candidate {
        Candidate {
            name: name.to_string(),
            votes,
            gender: None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Party {
    pub name: String,
    /// In list order. This order breaks ties between candidates with the same votes.
    pub candidates: Vec<Candidate>,
    pub list_votes: i64,
}

impl Party {
    pub fn new(name: &str) -> Party {
        Party {
            name: name.to_string(),
            candidates: Vec::new(),
            list_votes: 0,
        }
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SeatType {
    /// Won by floor division of the party total by the quotient.
    Direct,
    /// Won in the highest-averages rounds.
    Remainder,
}

/// One candidate of a party, in ranking order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateStanding {
    pub name: String,
    pub votes: u64,
    /// 0-based rank within the party.
    pub rank: u32,
    /// None if this candidate did not get a seat.
    pub seat_type: Option<SeatType>,
    /// Display only, copied from the input.
    pub gender: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectedCandidate {
    pub party: String,
    pub name: String,
    pub votes: u64,
    pub rank_within_party: u32,
    pub seat_type: SeatType,
    pub gender: Option<String>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct PartyResult {
    pub name: String,
    /// Sum over the named candidates, sentinel records excluded.
    pub candidate_votes: u64,
    /// Party-list votes, sentinel records included.
    pub list_votes: u64,
    pub total_votes: u64,
    pub eligible: bool,
    /// total / quotient, unrounded. Display only.
    pub projected_seats: f64,
    pub direct_seats: u32,
    pub remainder_seats: u32,
    pub total_seats: u32,
    /// The D'Hondt average this party presented in each remainder round.
    /// Empty for ineligible parties.
    pub quotient_history: Vec<f64>,
    pub standings: Vec<CandidateStanding>,
}

impl PartyResult {
    /// total / (direct + 1): the average the party enters the remainder phase with.
    pub fn first_round_quotient(&self) -> f64 {
        self.total_votes as f64 / (self.direct_seats as f64 + 1.0)
    }
}

/// Audit record for one leftover seat.
#[derive(PartialEq, Debug, Clone)]
pub struct AllocationRound {
    pub round: u32,
    pub party: String,
    pub winning_quotient: f64,
    /// Seat count of the winning party after this award.
    pub seat_number_awarded: u32,
    /// True if several parties presented the winning quotient.
    pub tie: bool,
}

/// Recoverable situations. The result is still produced, but is not a
/// complete distribution of the seat budget.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Condition {
    /// The direct seats of the eligible parties already exceed the budget.
    /// Direct seats are reported unclamped and no leftover seat is awarded.
    DirectSeatOverflow { direct_seats: u32, seat_budget: u32 },
    /// No party reached the eligibility threshold.
    NoEligibleParties,
    /// A party won more seats than it has named candidates.
    SeatsExceedCandidates {
        party: String,
        seats: u32,
        candidates: u32,
    },
}

#[derive(PartialEq, Debug, Clone)]
pub struct ApportionmentResult {
    pub quotient: f64,
    pub seat_budget: u32,
    pub eligibility_threshold: f64,
    /// In input order.
    pub parties: Vec<PartyResult>,
    /// In input party order, then ranking order.
    pub elected: Vec<ElectedCandidate>,
    pub rounds: Vec<AllocationRound>,
    pub seats_awarded: u32,
    /// Seats of the budget that were not awarded.
    pub seat_deficit: u32,
    pub conditions: Vec<Condition>,
}

impl ApportionmentResult {
    pub fn is_complete(&self) -> bool {
        self.conditions.is_empty() && self.seat_deficit == 0
    }

    pub fn party(&self, name: &str) -> Option<&PartyResult> {
        self.parties.iter().find(|p| p.name == name)
    }
}

/// Errors that prevent the apportionment from being computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ApportionmentErrors {
    /// A negative (or overflowing) vote count. `candidate` is None for the list votes.
    InvalidVotes {
        party: String,
        candidate: Option<String>,
    },
    /// The quotient is zero, negative or not a finite number.
    InvalidQuotient,
    InvalidSeatBudget,
    DuplicateParty(String),
    UnknownParty(String),
}

impl Error for ApportionmentErrors {}

impl Display for ApportionmentErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApportionmentErrors::InvalidVotes {
                party,
                candidate: Some(c),
            } => write!(f, "invalid vote count for candidate {} of party {}", c, party),
            ApportionmentErrors::InvalidVotes {
                party,
                candidate: None,
            } => write!(f, "invalid list vote count for party {}", party),
            ApportionmentErrors::InvalidQuotient => {
                write!(f, "the electoral quotient must be a positive number")
            }
            ApportionmentErrors::InvalidSeatBudget => {
                write!(f, "the seat budget must be at least one seat")
            }
            ApportionmentErrors::DuplicateParty(p) => write!(f, "party {} is declared twice", p),
            ApportionmentErrors::UnknownParty(p) => write!(f, "party {} is not declared", p),
        }
    }
}

// ********* Configuration **********

/// How to pick the winner of a leftover seat when several parties present
/// exactly the same average.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// The lexicographically smallest party name wins.
    PartyName,
    /// The party with more total votes wins, then the party name.
    HigherVotes,
    /// Reproducible pseudo-random order, derived from a SHA-256 hash of the
    /// seed, the round and the party name.
    Random(u32),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ApportionmentRules {
    pub seat_budget: u32,
    /// Share of the quotient, in percent, a party needs to compete for
    /// leftover seats.
    pub eligibility_percent: u32,
    pub tiebreak_mode: TieBreakMode,
}

impl ApportionmentRules {
    pub const DEFAULT_RULES: ApportionmentRules = ApportionmentRules {
        seat_budget: 8,
        eligibility_percent: 80,
        tiebreak_mode: TieBreakMode::PartyName,
    };

    pub fn with_seats(seat_budget: u32) -> ApportionmentRules {
        ApportionmentRules {
            seat_budget,
            ..ApportionmentRules::DEFAULT_RULES
        }
    }
}

impl Default for ApportionmentRules {
    fn default() -> Self {
        ApportionmentRules::DEFAULT_RULES
    }
}

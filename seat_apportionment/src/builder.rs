pub use crate::config::*;

/// A builder for assembling the parties of an election.
///
/// Parties must be declared before their candidates. Declaring the same
/// party twice is an error.
///
/// ```
/// pub use seat_apportionment::builder::Builder;
/// pub use seat_apportionment::ApportionmentRules;
/// # use seat_apportionment::ApportionmentErrors;
///
/// let mut builder = Builder::new(&ApportionmentRules::DEFAULT_RULES)?
///     .parties(&["PT".to_string(), "PP".to_string()])?;
///
/// builder.add_candidate("PT", "ZE", 120_000)?;
/// builder.add_candidate("PT", "VOTOS LEGENDA", 10_000)?;
/// builder.add_candidate("PP", "ATILA", 105_000)?;
/// builder.add_list_votes("PP", 5_000)?;
///
/// let res = builder.compute(190_000.0)?;
/// assert_eq!(res.party("PT").map(|p| p.total_votes), Some(130_000));
///
/// # Ok::<(), ApportionmentErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ApportionmentRules,
    pub(crate) _parties: Vec<Party>,
}

impl Builder {
    pub fn new(rules: &ApportionmentRules) -> Result<Builder, ApportionmentErrors> {
        if rules.seat_budget == 0 {
            return Err(ApportionmentErrors::InvalidSeatBudget);
        }
        Ok(Builder {
            _rules: rules.clone(),
            _parties: Vec::new(),
        })
    }

    /// Declares the parties, in display order.
    pub fn parties(self, names: &[String]) -> Result<Builder, ApportionmentErrors> {
        let mut b = Builder {
            _rules: self._rules,
            _parties: Vec::new(),
        };
        for name in names {
            b.add_party(name)?;
        }
        Ok(b)
    }

    pub fn add_party(&mut self, name: &str) -> Result<(), ApportionmentErrors> {
        if self._parties.iter().any(|p| p.name == name) {
            return Err(ApportionmentErrors::DuplicateParty(name.to_string()));
        }
        self._parties.push(Party::new(name));
        Ok(())
    }

    /// Adds a candidate at the end of the list of a party.
    ///
    /// A candidate named `VOTOS LEGENDA` (or `LEGENDA`) is the record of the
    /// party-list votes: it counts for the party but is never elected.
    pub fn add_candidate(
        &mut self,
        party: &str,
        name: &str,
        votes: i64,
    ) -> Result<(), ApportionmentErrors> {
        self.add_candidate_2(party, &Candidate::new(name, votes))
    }

    pub fn add_candidate_2(
        &mut self,
        party: &str,
        candidate: &Candidate,
    ) -> Result<(), ApportionmentErrors> {
        self.party_mut(party)?.candidates.push(candidate.clone());
        Ok(())
    }

    /// Adds votes cast for the party label.
    pub fn add_list_votes(&mut self, party: &str, votes: i64) -> Result<(), ApportionmentErrors> {
        let p = self.party_mut(party)?;
        p.list_votes = p
            .list_votes
            .checked_add(votes)
            .ok_or_else(|| ApportionmentErrors::InvalidVotes {
                party: party.to_string(),
                candidate: None,
            })?;
        Ok(())
    }

    pub fn snapshot(&self) -> &[Party] {
        &self._parties
    }

    pub fn compute(&self, quotient: f64) -> Result<ApportionmentResult, ApportionmentErrors> {
        crate::compute_apportionment(&self._parties, quotient, &self._rules)
    }

    fn party_mut(&mut self, party: &str) -> Result<&mut Party, ApportionmentErrors> {
        self._parties
            .iter_mut()
            .find(|p| p.name == party)
            .ok_or_else(|| ApportionmentErrors::UnknownParty(party.to_string()))
    }
}

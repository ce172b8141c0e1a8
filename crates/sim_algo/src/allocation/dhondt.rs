//! D'Hondt (highest averages) allocation for one district, with full round history.
//!
//! Contract:
//! - Round 0 records the raw votes (quotient = votes, no winner).
//! - Each of the `seats` rounds records `votes / (seats_so_far + 1)` for every
//!   party, then awards the seat to the strict maximum.
//! - Ties go to the first party in the supplied canonical order.
//! - Negative votes count as 0; non-finite votes are an error.
//!
//! Determinism:
//! - Scans run in canonical party order (the `order` slice, then any vote key
//!   it does not list, by id).

use core::cmp::Ordering;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sim_core::{ids::PartyId, votes::VoteDistribution};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocError {
    /// Asked to allocate zero seats.
    #[error("seat count must be at least 1")]
    ZeroSeats,
    /// The district has no parties at all.
    #[error("no parties to allocate between")]
    NoParties,
    /// A vote value is NaN or infinite.
    #[error("vote share for '{0}' is not finite")]
    NonFiniteVotes(PartyId),
}

/// One line of a quotient table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuotientRow {
    pub party: PartyId,
    pub votes: f64,
    pub seats_so_far: u32,
    pub quotient: f64,
}

/// Snapshot of one round: the table the award was decided on, and the winner.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AllocationRound {
    pub round: u32,
    pub rows: Vec<QuotientRow>,
    /// `None` for round 0.
    pub winner: Option<PartyId>,
}

/// Final seats plus the `seats + 1` round records.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Apportionment {
    pub seats: BTreeMap<PartyId, u32>,
    pub history: Vec<AllocationRound>,
}

impl Apportionment {
    /// Seats allocated in total.
    pub fn total_seats(&self) -> u32 {
        self.seats.values().sum()
    }

    /// Closing highest-averages table: for every party and divisor
    /// `d = 1..=S` the row `(party, votes, d - 1, votes / d)`, sorted by
    /// quotient descending (ties: canonical party order, then divisor).
    ///
    /// The first `S` rows are exactly the awarded seats.
    pub fn closing_table(&self) -> Vec<QuotientRow> {
        let seats = self.total_seats();
        let Some(initial) = self.history.first() else {
            return Vec::new();
        };
        let mut rows: Vec<(usize, QuotientRow)> = Vec::with_capacity(initial.rows.len() * seats as usize);
        for (rank, r) in initial.rows.iter().enumerate() {
            for d in 1..=seats {
                rows.push((
                    rank,
                    QuotientRow {
                        party: r.party.clone(),
                        votes: r.votes,
                        seats_so_far: d - 1,
                        quotient: r.votes / f64::from(d),
                    },
                ));
            }
        }
        rows.sort_by(|(ra, a), (rb, b)| match b.quotient.total_cmp(&a.quotient) {
            Ordering::Equal => ra.cmp(rb).then(a.seats_so_far.cmp(&b.seats_so_far)),
            o => o,
        });
        rows.into_iter().map(|(_, r)| r).collect()
    }
}

/// Allocate `seats` seats by D'Hondt, recording every round.
///
/// `order` is the canonical tie-break order; vote keys missing from it are
/// appended by id. Parties listed in `order` but absent from `votes` take part
/// with 0 votes.
pub fn allocate_dhondt(
    votes: &VoteDistribution,
    seats: u32,
    order: &[PartyId],
) -> Result<Apportionment, AllocError> {
    if seats == 0 {
        return Err(AllocError::ZeroSeats);
    }
    let parties = scan_order(votes, order);
    if parties.is_empty() {
        return Err(AllocError::NoParties);
    }

    let mut v: Vec<f64> = Vec::with_capacity(parties.len());
    for p in &parties {
        let x = votes.get(p);
        if !x.is_finite() {
            return Err(AllocError::NonFiniteVotes(p.clone()));
        }
        v.push(x.max(0.0));
    }

    let mut won: Vec<u32> = vec![0; parties.len()];
    let mut history = Vec::with_capacity(seats as usize + 1);
    history.push(AllocationRound {
        round: 0,
        rows: parties
            .iter()
            .zip(&v)
            .map(|(p, &x)| QuotientRow { party: p.clone(), votes: x, seats_so_far: 0, quotient: x })
            .collect(),
        winner: None,
    });

    for round in 1..=seats {
        let rows: Vec<QuotientRow> = parties
            .iter()
            .enumerate()
            .map(|(i, p)| QuotientRow {
                party: p.clone(),
                votes: v[i],
                seats_so_far: won[i],
                quotient: v[i] / f64::from(won[i] + 1),
            })
            .collect();

        // Strict `>`: the first party in scan order keeps a tie.
        let mut best = 0usize;
        for (i, r) in rows.iter().enumerate().skip(1) {
            if r.quotient > rows[best].quotient {
                best = i;
            }
        }
        won[best] += 1;
        history.push(AllocationRound { round, rows, winner: Some(parties[best].clone()) });
    }

    let seats = parties.into_iter().zip(won).collect();
    Ok(Apportionment { seats, history })
}

/// `order` (deduplicated) followed by vote keys it does not mention.
fn scan_order(votes: &VoteDistribution, order: &[PartyId]) -> Vec<PartyId> {
    let mut out: Vec<PartyId> = Vec::with_capacity(order.len() + votes.len());
    for p in order {
        if !out.contains(p) {
            out.push(p.clone());
        }
    }
    for p in votes.parties() {
        if !out.contains(p) {
            out.push(p.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> PartyId { s.parse().unwrap() }

    fn dist(pairs: &[(&str, f64)]) -> VoteDistribution {
        pairs.iter().map(|(p, v)| (pid(p), *v)).collect()
    }

    fn order(ids: &[&str]) -> Vec<PartyId> { ids.iter().map(|s| pid(s)).collect() }

    #[test]
    fn fifty_thirty_twenty_over_six_seats() {
        let votes = dist(&[("A", 50.0), ("B", 30.0), ("C", 20.0)]);
        let out = allocate_dhondt(&votes, 6, &order(&["A", "B", "C"])).unwrap();
        assert_eq!(out.seats[&pid("A")], 3);
        assert_eq!(out.seats[&pid("B")], 2);
        assert_eq!(out.seats[&pid("C")], 1);
        assert_eq!(out.history.len(), 7);

        let winners: Vec<&str> = out.history[1..]
            .iter()
            .map(|r| r.winner.as_ref().unwrap().as_str())
            .collect();
        // 50, 30, 25, 20, 16.67, 15
        assert_eq!(winners, vec!["A", "B", "A", "C", "A", "B"]);
    }

    #[test]
    fn round_zero_is_raw_votes() {
        let votes = dist(&[("A", 60.0), ("B", 40.0)]);
        let out = allocate_dhondt(&votes, 2, &order(&["A", "B"])).unwrap();
        let r0 = &out.history[0];
        assert!(r0.winner.is_none());
        assert_eq!(r0.rows[0].quotient, 60.0);
        // Round 2 shows A's halved quotient.
        let r2 = &out.history[2];
        assert_eq!(r2.rows[0].seats_so_far, 1);
        assert_eq!(r2.rows[0].quotient, 30.0);
    }

    #[test]
    fn ties_go_to_first_in_order() {
        let votes = dist(&[("A", 50.0), ("B", 50.0)]);
        let first = allocate_dhondt(&votes, 1, &order(&["B", "A"])).unwrap();
        assert_eq!(first.seats[&pid("B")], 1);
        let again = allocate_dhondt(&votes, 1, &order(&["A", "B"])).unwrap();
        assert_eq!(again.seats[&pid("A")], 1);
    }

    #[test]
    fn closing_table_top_rows_are_the_awards() {
        let votes = dist(&[("A", 50.0), ("B", 30.0), ("C", 20.0)]);
        let out = allocate_dhondt(&votes, 6, &order(&["A", "B", "C"])).unwrap();
        let table = out.closing_table();
        assert_eq!(table.len(), 18);
        let mut counted: BTreeMap<PartyId, u32> = BTreeMap::new();
        for r in &table[..6] {
            *counted.entry(r.party.clone()).or_default() += 1;
        }
        assert_eq!(counted, out.seats);
        // First unallocated row: A's fourth divisor, 12.5.
        assert_eq!(table[6].party.as_str(), "A");
        assert_eq!(table[6].seats_so_far, 3);
        assert_eq!(table[6].quotient, 12.5);
        // Equal quotients (10.0) fall back to canonical order.
        let tens: Vec<&str> = table[7..10].iter().map(|r| r.party.as_str()).collect();
        assert_eq!(tens, vec!["A", "B", "C"]);
    }

    #[test]
    fn errors_and_degenerate_inputs() {
        let votes = dist(&[("A", 10.0)]);
        assert_eq!(allocate_dhondt(&votes, 0, &[]), Err(AllocError::ZeroSeats));
        assert_eq!(
            allocate_dhondt(&VoteDistribution::new(), 3, &[]),
            Err(AllocError::NoParties)
        );
        let bad = dist(&[("A", f64::NAN)]);
        assert!(matches!(allocate_dhondt(&bad, 1, &[]), Err(AllocError::NonFiniteVotes(_))));
        assert_eq!(
            AllocError::NonFiniteVotes(pid("A")).to_string(),
            "vote share for 'A' is not finite"
        );
        assert_eq!(AllocError::ZeroSeats.to_string(), "seat count must be at least 1");
        let neg = dist(&[("A", -5.0), ("B", 1.0)]);
        let out = allocate_dhondt(&neg, 2, &order(&["A", "B"])).unwrap();
        assert_eq!(out.seats[&pid("B")], 2);
    }
}

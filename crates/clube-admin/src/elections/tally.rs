use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::domain::{Ballot, Election, Slate, SlateResult, TallyResult};

/// Aggregates ballots into per-slate results.
///
/// Slates keep their load order among equal vote counts. Ballots naming a
/// slate outside `slates` are reported as stray, apart from blank ballots.
pub fn tally_ballots(election: Election, slates: Vec<Slate>, ballots: &[Ballot]) -> TallyResult {
    let known: HashSet<&str> = slates.iter().map(|slate| slate.id.as_str()).collect();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    let mut blank_votes = 0u64;
    let mut stray_votes = 0u64;

    for ballot in ballots {
        match ballot.slate_id.as_deref() {
            Some(slate_id) if known.contains(slate_id) => {
                *counts.entry(slate_id).or_insert(0) += 1;
            }
            Some(slate_id) => {
                warn!(
                    election_id = %election.id,
                    ballot_id = %ballot.id,
                    slate_id,
                    "ballot names a slate outside the election"
                );
                stray_votes += 1;
            }
            None => blank_votes += 1,
        }
    }

    let total_votes = ballots.len() as u64;
    let mut results: Vec<SlateResult> = slates
        .iter()
        .map(|slate| {
            let votes = counts.get(slate.id.as_str()).copied().unwrap_or(0);
            (slate, votes)
        })
        .map(|(slate, votes)| SlateResult {
            slate: slate.clone(),
            votes,
            percentage: share(votes, total_votes),
        })
        .collect();
    results.sort_by(|a, b| b.votes.cmp(&a.votes));

    TallyResult {
        election,
        slates: results,
        total_votes,
        blank_votes,
        stray_votes,
    }
}

/// Percentage of `total` rounded to two decimals, half-cents to even; zero
/// when nobody voted.
pub fn share(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = votes as f64 / total as f64 * 100.0;
    (raw * 100.0).round_ties_even() / 100.0
}

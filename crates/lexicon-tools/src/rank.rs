//! Rank & Deduplicate

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::matcher::MatchCandidate;

/// Keep the best candidate per path, order by confidence, cap at `limit`.
///
/// Equal confidences keep first-seen order, both when merging and when
/// sorting.
pub fn rank(candidates: Vec<MatchCandidate>, limit: usize) -> Vec<MatchCandidate> {
    let mut best: IndexMap<String, MatchCandidate> = IndexMap::new();

    for candidate in candidates {
        match best.entry(candidate.path.clone()) {
            Entry::Occupied(mut slot) => {
                if candidate.confidence > slot.get().confidence {
                    slot.insert(candidate);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }
    }

    let mut ranked: Vec<MatchCandidate> = best.into_values().collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked.truncate(limit);
    ranked
}

//! Group formation: anchors first, randomized fill for the remaining slots.
//!
//! The fill is a uniform shuffle rather than a deterministic scan so players
//! sharing identical availability windows are not systematically favored by
//! roster order. The random source is injected so outcomes are reproducible
//! under a seeded [`rand::rngs::StdRng`]. Grouping is skill-blind: no rating
//! or rank data ever reaches this module.

use rand::{Rng, seq::SliceRandom};
use time::OffsetDateTime;

use crate::state::event::Event;

/// Number of players per game.
pub const GROUP_SIZE: usize = 4;

/// Form a group of [`GROUP_SIZE`] players from anchors plus random fill.
///
/// Anchors are deduped into the base group; remaining slots are filled by
/// shuffling the roster restricted to players matchable at `at` and not
/// already chosen. Returns `None` when four players cannot be reached, which
/// is a normal outcome, not an error.
pub fn build_group<R: Rng + ?Sized>(
    anchors: &[String],
    event: &Event,
    at: OffsetDateTime,
    rng: &mut R,
) -> Option<Vec<String>> {
    let mut group: Vec<String> = Vec::with_capacity(GROUP_SIZE);
    for anchor in anchors {
        if !group.contains(anchor) {
            group.push(anchor.clone());
        }
        if group.len() == GROUP_SIZE {
            break;
        }
    }

    if group.len() < GROUP_SIZE {
        let mut candidates: Vec<String> = event
            .players
            .values()
            .filter(|player| player.is_matchable_at(at) && !group.contains(&player.id))
            .map(|player| player.id.clone())
            .collect();

        candidates.shuffle(rng);
        group.extend(candidates.into_iter().take(GROUP_SIZE - group.len()));
    }

    (group.len() == GROUP_SIZE).then_some(group)
}

/// Fallback draw ignoring anchors entirely: four uniformly random matchable
/// players, or `None` if fewer than four exist.
pub fn random_group<R: Rng + ?Sized>(
    event: &Event,
    at: OffsetDateTime,
    rng: &mut R,
) -> Option<Vec<String>> {
    build_group(&[], event, at, rng)
}

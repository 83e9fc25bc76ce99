//! FIFO waiting-list operations layered on the availability filter.
//!
//! The queue is set-like: a player appears at most once, ordered by first
//! enqueue. Every queued id refers to a player in the Waiting state.

use time::OffsetDateTime;

use crate::state::{event::Event, player::PlayerState};

/// Move every named Idle or Waiting player into the queue.
///
/// Players already Playing are left alone. `waiting_since` is stamped only on
/// the first enqueue so requeued players keep their original priority marker.
pub fn enqueue_if_waiting(event: &mut Event, ids: &[String], at: OffsetDateTime) {
    for id in ids {
        let Some(player) = event.players.get_mut(id) else {
            continue;
        };
        if player.state == PlayerState::Playing {
            continue;
        }

        player.state = PlayerState::Waiting;
        if player.waiting_since.is_none() {
            player.waiting_since = Some(at);
        }
        if !event.queue.contains(id) {
            event.queue.push(id.clone());
        }
    }
}

/// Drop queue entries that are no longer eligible at `at`.
///
/// Survivors keep their relative order. Players purged because their
/// availability window closed return to Idle; Playing players are simply
/// removed (their queue slot is stale).
pub fn purge_stale(event: &mut Event, at: OffsetDateTime) {
    let queue = std::mem::take(&mut event.queue);
    for id in queue {
        match event.players.get_mut(&id) {
            Some(player) if player.state == PlayerState::Playing => {}
            Some(player) if !player.is_available_at(at) => {
                player.state = PlayerState::Idle;
                player.waiting_since = None;
            }
            Some(_) => event.queue.push(id),
            None => {}
        }
    }
}

/// Pop up to `k` eligible players off the front of the queue.
///
/// The queue is purged first; eligibility is re-checked at pop time so the
/// returned anchors are guaranteed matchable at `at`. Popped players stay
/// Waiting until a group is finalized.
pub fn dequeue_up_to(event: &mut Event, k: usize, at: OffsetDateTime) -> Vec<String> {
    purge_stale(event, at);

    let mut anchors = Vec::with_capacity(k);
    while anchors.len() < k && !event.queue.is_empty() {
        let id = event.queue.remove(0);
        match event.players.get_mut(&id) {
            Some(player) if player.is_matchable_at(at) => anchors.push(id),
            Some(player) => {
                player.state = PlayerState::Idle;
                player.waiting_since = None;
            }
            None => {}
        }
    }
    anchors
}

/// Put anchors back at the front of the queue, preserving their order.
///
/// Used when group formation fails after anchors were already popped, so the
/// longest-waiting players keep their priority for the next attempt.
pub fn restore_front(event: &mut Event, anchors: Vec<String>) {
    for id in anchors.into_iter().rev() {
        if !event.queue.contains(&id) {
            event.queue.insert(0, id);
        }
    }
}

/// Remove the given ids from the queue. Idempotent.
pub fn remove_from_queue(event: &mut Event, ids: &[String]) {
    event.queue.retain(|queued| !ids.contains(queued));
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::state::player::{Player, RegistrationStatus};

    fn event_with(ids: &[&str]) -> Event {
        let players = ids
            .iter()
            .map(|id| {
                Player::new(
                    (*id).into(),
                    format!("Player {id}"),
                    datetime!(2025-06-01 09:00 UTC),
                    datetime!(2025-06-01 12:00 UTC),
                    RegistrationStatus::Registered,
                )
            })
            .collect();
        Event::new(1, players)
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn enqueue_is_set_like_and_fifo() {
        let mut event = event_with(&["a", "b", "c"]);
        let at = datetime!(2025-06-01 10:00 UTC);

        enqueue_if_waiting(&mut event, &ids(&["a", "b"]), at);
        enqueue_if_waiting(&mut event, &ids(&["b", "c", "a"]), at);

        assert_eq!(event.queue, ids(&["a", "b", "c"]));
        assert!(
            event
                .players
                .values()
                .all(|p| p.state == PlayerState::Waiting)
        );
    }

    #[test]
    fn enqueue_keeps_original_waiting_since() {
        let mut event = event_with(&["a"]);
        let first = datetime!(2025-06-01 10:00 UTC);
        let later = datetime!(2025-06-01 10:30 UTC);

        enqueue_if_waiting(&mut event, &ids(&["a"]), first);
        enqueue_if_waiting(&mut event, &ids(&["a"]), later);

        assert_eq!(event.players["a"].waiting_since, Some(first));
    }

    #[test]
    fn enqueue_skips_playing_players() {
        let mut event = event_with(&["a"]);
        event.players.get_mut("a").unwrap().state = PlayerState::Playing;

        enqueue_if_waiting(&mut event, &ids(&["a"]), datetime!(2025-06-01 10:00 UTC));

        assert!(event.queue.is_empty());
        assert_eq!(event.players["a"].state, PlayerState::Playing);
    }

    #[test]
    fn purge_drops_expired_and_keeps_order() {
        let mut event = event_with(&["a", "b", "c"]);
        let at = datetime!(2025-06-01 10:00 UTC);
        enqueue_if_waiting(&mut event, &ids(&["a", "b", "c"]), at);
        event.players.get_mut("b").unwrap().available_end = datetime!(2025-06-01 09:30 UTC);

        purge_stale(&mut event, at);

        assert_eq!(event.queue, ids(&["a", "c"]));
        assert_eq!(event.players["b"].state, PlayerState::Idle);
        assert!(event.players["b"].waiting_since.is_none());
    }

    #[test]
    fn dequeue_pops_oldest_waiters_first() {
        let mut event = event_with(&["a", "b", "c"]);
        let at = datetime!(2025-06-01 10:00 UTC);
        enqueue_if_waiting(&mut event, &ids(&["a", "b", "c"]), at);

        let anchors = dequeue_up_to(&mut event, 2, at);

        assert_eq!(anchors, ids(&["a", "b"]));
        assert_eq!(event.queue, ids(&["c"]));
    }

    #[test]
    fn dequeue_rechecks_eligibility_at_pop_time() {
        let mut event = event_with(&["a", "b"]);
        let at = datetime!(2025-06-01 10:00 UTC);
        enqueue_if_waiting(&mut event, &ids(&["a", "b"]), at);
        // Simulate a player flipped to Playing between purge and pop.
        event.players.get_mut("a").unwrap().state = PlayerState::Playing;

        let anchors = dequeue_up_to(&mut event, 2, at);

        assert_eq!(anchors, ids(&["b"]));
        assert!(event.queue.is_empty());
    }

    #[test]
    fn restore_front_preserves_anchor_order() {
        let mut event = event_with(&["a", "b", "c"]);
        let at = datetime!(2025-06-01 10:00 UTC);
        enqueue_if_waiting(&mut event, &ids(&["c"]), at);

        restore_front(&mut event, ids(&["a", "b"]));

        assert_eq!(event.queue, ids(&["a", "b", "c"]));
    }

    #[test]
    fn remove_from_queue_is_idempotent() {
        let mut event = event_with(&["a", "b"]);
        let at = datetime!(2025-06-01 10:00 UTC);
        enqueue_if_waiting(&mut event, &ids(&["a", "b"]), at);

        remove_from_queue(&mut event, &ids(&["a"]));
        remove_from_queue(&mut event, &ids(&["a"]));

        assert_eq!(event.queue, ids(&["b"]));
    }
}

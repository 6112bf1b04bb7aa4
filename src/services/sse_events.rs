use serde::Serialize;
use tracing::warn;

use crate::{
    dao::models::StoredRound,
    dto::{
        game::RoundSnapshot,
        rounds::RoundSummary,
        sse::{RoundsUpdatedEvent, ServerEvent},
    },
    state::{SharedState, state_machine::Snapshot},
};

const EVENT_ROUND_SNAPSHOT: &str = "round.snapshot";
const EVENT_ROUNDS_UPDATED: &str = "rounds.updated";
const EVENT_INFO: &str = "info";

/// Broadcast the full rounds history after it changed.
pub fn broadcast_rounds_updated(state: &SharedState, rounds: Vec<StoredRound>) {
    if let Some(event) = rounds_updated_event(rounds) {
        state.public_sse().broadcast(event);
    }
}

/// `round.snapshot` event for `snapshot`.
pub fn round_snapshot_event(snapshot: &Snapshot) -> Option<ServerEvent> {
    json_event(EVENT_ROUND_SNAPSHOT, &RoundSnapshot::from(snapshot))
}

/// `rounds.updated` event carrying the whole history.
pub fn rounds_updated_event(rounds: Vec<StoredRound>) -> Option<ServerEvent> {
    let payload = RoundsUpdatedEvent {
        rounds: rounds.into_iter().map(RoundSummary::from).collect(),
    };
    json_event(EVENT_ROUNDS_UPDATED, &payload)
}

/// Plain text `info` event.
pub fn info_event(message: &str) -> ServerEvent {
    ServerEvent::new(Some(EVENT_INFO.to_string()), message.to_string())
}

fn json_event(event: &str, payload: &impl Serialize) -> Option<ServerEvent> {
    ServerEvent::json(Some(event.to_string()), payload)
        .inspect_err(|err| warn!(event, error = %err, "failed to serialize public SSE payload"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::state_machine::{RoundContext, RoundPhase};

    #[test]
    fn snapshot_event_is_named_and_json_encoded() {
        let snapshot = Snapshot {
            phase: RoundPhase::ReadyToStart,
            version: 3,
            context: RoundContext {
                team_name: "Divas".into(),
                latency_compensation: 250.0,
                game_played_at: None,
                ms_off: None,
                score: None,
            },
        };

        let event = round_snapshot_event(&snapshot).unwrap();
        assert_eq!(event.event.as_deref(), Some("round.snapshot"));

        let data: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(data["phase"], "ready");
        assert_eq!(data["team_name"], "Divas");
        assert_eq!(data["version"], 3);
    }

    #[test]
    fn rounds_event_hides_infinite_offsets() {
        let event =
            rounds_updated_event(vec![StoredRound::new("Divas".into(), 0, f64::INFINITY, 7)])
                .unwrap();
        let data: serde_json::Value = serde_json::from_str(&event.data).unwrap();

        assert_eq!(data["rounds"][0]["timed_out"], true);
        assert!(data["rounds"][0]["ms_off"].is_null());
    }
}

use serde::{Deserialize, Serialize};

/// Finished round as persisted in the rounds slot.
///
/// Field names follow the camelCase layout of the stored JSON documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredRound {
    /// Name of the team that played the round.
    pub team_name: String,
    /// Points earned.
    pub score: u32,
    /// Absolute deviation from the ideal hit in milliseconds, infinite for a timeout.
    #[serde(with = "ms_off")]
    pub ms_off: f64,
    /// Epoch milliseconds of the round start.
    pub game_played_at: u64,
    /// Identifier of the round, equal to [`StoredRound::game_played_at`].
    pub id: u64,
}

impl StoredRound {
    /// Build a record whose identifier is its start timestamp.
    pub fn new(team_name: String, score: u32, ms_off: f64, game_played_at: u64) -> Self {
        Self {
            team_name,
            score,
            ms_off,
            game_played_at,
            id: game_played_at,
        }
    }

    /// Whether the round ended on the timer rather than on a hit.
    pub fn timed_out(&self) -> bool {
        self.ms_off.is_infinite()
    }
}

/// JSON has no infinity: a timed-out deviation is stored as `null`.
mod ms_off {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_round_uses_camel_case_fields() {
        let round = StoredRound::new("Divas".into(), 7, 412.5, 1_700_000_000_000);
        let value = serde_json::to_value(&round).unwrap();
        assert_eq!(
            value,
            json!({
                "teamName": "Divas",
                "score": 7,
                "msOff": 412.5,
                "gamePlayedAt": 1_700_000_000_000u64,
                "id": 1_700_000_000_000u64,
            })
        );
    }

    #[test]
    fn timed_out_deviation_survives_persistence() {
        let round = StoredRound::new("Divas".into(), 0, f64::INFINITY, 42);
        let raw = serde_json::to_string(&round).unwrap();
        assert!(raw.contains("\"msOff\":null"));

        let restored: StoredRound = serde_json::from_str(&raw).unwrap();
        assert!(restored.timed_out());
        assert_eq!(restored.score, 0);
    }
}

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::dao::{
    models::StoredRound,
    storage::{SlotStore, StorageError, StorageResult},
};

/// Slot holding the JSON array of finished rounds.
pub const ROUNDS_SLOT: &str = "whitney_houston_rounds";

/// Append-only log of finished rounds kept in a single storage slot.
///
/// Storage failures never reach callers: they are logged and turned into an empty history.
/// Appends and clears are serialized so a read-modify-write never drops a concurrent append.
#[derive(Clone)]
pub struct RoundsRepository {
    store: Arc<dyn SlotStore>,
    write_lock: Arc<Mutex<()>>,
}

impl RoundsRepository {
    /// Wrap a slot store.
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Every persisted round in insertion order.
    pub async fn load_rounds(&self) -> Vec<StoredRound> {
        match self.try_load().await {
            Ok(rounds) => rounds,
            Err(err) => {
                error!(error = %err, "failed to load rounds from storage");
                Vec::new()
            }
        }
    }

    /// Append `round` (its id forced to its start timestamp) and return the updated history.
    pub async fn add_round(&self, round: StoredRound) -> Vec<StoredRound> {
        let _guard = self.write_lock.lock().await;
        let mut rounds = self.load_rounds().await;
        rounds.push(StoredRound {
            id: round.game_played_at,
            ..round
        });
        if let Err(err) = self.save_rounds(&rounds).await {
            error!(error = %err, "failed to save rounds to storage");
        }
        rounds
    }

    /// Drop the whole history.
    pub async fn clear_rounds(&self) {
        let _guard = self.write_lock.lock().await;
        if let Err(err) = self.store.remove(ROUNDS_SLOT).await {
            warn!(error = %err, "failed to clear rounds from storage");
        }
    }

    async fn try_load(&self) -> StorageResult<Vec<StoredRound>> {
        let Some(raw) = self.store.read(ROUNDS_SLOT).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| StorageError::malformed(ROUNDS_SLOT, source))
    }

    async fn save_rounds(&self, rounds: &[StoredRound]) -> StorageResult<()> {
        let raw = serde_json::to_string(rounds)
            .map_err(|source| StorageError::malformed(ROUNDS_SLOT, source))?;
        self.store.write(ROUNDS_SLOT, raw).await
    }
}

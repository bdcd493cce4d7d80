//! RecordGenerationHandler - Counts a generated mockup against the ledger.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::paywall::Signal;
use crate::ports::{LedgerStoreError, UsageLedgerStore};

use super::DeviceState;

/// Counters after recording, plus any milestone reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordGenerationResult {
    pub daily_count: u32,
    pub lifetime_count: u64,
    pub milestone: Option<Signal>,
}

/// Handler for ledger bookkeeping after a permitted generation.
///
/// Never refuses: the quota check happened in the guard. The new ledger is
/// persisted first and only then replaces the in-memory one.
pub struct RecordGenerationHandler {
    store: Arc<dyn UsageLedgerStore>,
}

impl RecordGenerationHandler {
    pub fn new(store: Arc<dyn UsageLedgerStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        state: &mut DeviceState,
        now: Timestamp,
    ) -> Result<RecordGenerationResult, LedgerStoreError> {
        let next = state.ledger.clone().record_generation(now.date());
        state.commit(self.store.as_ref(), next).await?;

        tracing::info!(
            device_id = %state.device_id,
            daily_count = state.ledger.daily_count,
            lifetime_count = state.ledger.lifetime_count,
            "Generation recorded"
        );

        Ok(RecordGenerationResult {
            daily_count: state.ledger.daily_count,
            lifetime_count: state.ledger.lifetime_count,
            milestone: Signal::milestone(state.ledger.lifetime_count),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryLedgerStore;
    use crate::domain::foundation::DeviceId;
    use crate::domain::usage::UsageLedger;

    fn fixture() -> (RecordGenerationHandler, InMemoryLedgerStore, DeviceState) {
        let store = InMemoryLedgerStore::new();
        let handler = RecordGenerationHandler::new(Arc::new(store.clone()));
        let state = DeviceState::new(
            DeviceId::new("device-1").unwrap(),
            UsageLedger::new_free(Timestamp::now().date()),
        );
        (handler, store, state)
    }

    #[tokio::test]
    async fn increments_and_persists() {
        let (handler, store, mut state) = fixture();

        let result = handler.handle(&mut state, Timestamp::now()).await.unwrap();

        assert_eq!(result.daily_count, 1);
        assert_eq!(result.lifetime_count, 1);
        assert_eq!(store.get(&state.device_id).await, Some(state.ledger.clone()));
    }

    #[tokio::test]
    async fn first_and_tenth_generation_are_milestones() {
        let (handler, _store, mut state) = fixture();
        let mut milestones = Vec::new();

        for _ in 0..10 {
            let result = handler.handle(&mut state, Timestamp::now()).await.unwrap();
            if result.milestone.is_some() {
                milestones.push(result.lifetime_count);
            }
        }

        assert_eq!(milestones, vec![1, 10]);
    }

    #[tokio::test]
    async fn persist_failure_leaves_counts_unchanged() {
        let (handler, store, mut state) = fixture();
        store.fail_saves(true);

        assert!(handler.handle(&mut state, Timestamp::now()).await.is_err());
        assert_eq!(state.ledger.daily_count, 0);
        assert_eq!(state.ledger.lifetime_count, 0);
    }
}

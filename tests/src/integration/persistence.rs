//! State survives a store reopen.
//!
//! The idempotency key lives in the store, not in process memory: after a
//! restart, redelivered events must still be recognized as replays.

#[cfg(test)]
mod tests {
    use mesh_ledger::test_utils::FixedClock;
    use mesh_ledger::{LedgerConfig, LedgerService, StockMutationApi, StockQueryApi};
    use mesh_runtime::adapters::{RocksDbConfig, RocksDbStore};
    use tempfile::TempDir;

    use crate::integration::harness::{decrement, refund};

    fn open_service(path: &std::path::Path) -> LedgerService<RocksDbStore, FixedClock> {
        let store = RocksDbStore::open(RocksDbConfig::for_testing(path)).unwrap();
        LedgerService::new(store, FixedClock::at(1_000), LedgerConfig::default())
    }

    #[test]
    fn test_ledger_state_survives_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let service = open_service(dir.path());
            service
                .apply_event(&refund("shop1", "999", "1", "WIDGET-A", 10))
                .unwrap();
            service
                .apply_event(&decrement("shop1", "1001", "1", "WIDGET-A", 2))
                .unwrap();
            assert_eq!(service.on_hand(&"WIDGET-A".into()).unwrap(), Some(8));
        }

        // Reopen: stock, products, and the idempotency keys are all back.
        let service = open_service(dir.path());
        assert_eq!(service.on_hand(&"WIDGET-A".into()).unwrap(), Some(8));

        let replay = service
            .apply_event(&decrement("shop1", "1001", "1", "WIDGET-A", 2))
            .unwrap();
        assert!(!replay.applied);
        assert_eq!(replay.new_on_hand, 8);
        assert_eq!(
            service.entries_for_sku(&"WIDGET-A".into()).unwrap().len(),
            2
        );
    }
}

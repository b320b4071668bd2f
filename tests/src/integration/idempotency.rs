//! Redelivery and duplicate-event properties.
//!
//! For any number of deliveries of the same (site, order, line item, kind),
//! exactly one ledger entry and one stock delta are applied.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use mesh_ledger::{StockMutationApi, StockQueryApi};

    use crate::integration::harness::{decrement, make_site, refund, simple_product, Harness};

    fn harness() -> Harness {
        Harness::fast(
            vec![make_site("shop1"), make_site("shop2")],
            vec![simple_product(42, "WIDGET-A")],
            3,
        )
    }

    #[test]
    fn test_n_deliveries_apply_once() {
        let h = harness();
        h.ledger
            .apply_event(&refund("shop1", "999", "1", "WIDGET-A", 10))
            .unwrap();

        let event = decrement("shop1", "1001", "1", "WIDGET-A", 2);
        let first = h.ledger.apply_event(&event).unwrap();
        assert!(first.applied);
        assert_eq!(first.new_on_hand, 8);

        for _ in 0..5 {
            let replay = h.ledger.apply_event(&event).unwrap();
            assert!(!replay.applied);
            assert_eq!(replay.new_on_hand, 8);
        }

        // One row for the seed, one for the decrement.
        let entries = h.ledger.entries_for_sku(&"WIDGET-A".into()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(h.ledger.on_hand(&"WIDGET-A".into()).unwrap(), Some(8));
    }

    #[test]
    fn test_concurrent_redelivery_applies_once() {
        let h = harness();
        h.ledger
            .apply_event(&refund("shop1", "999", "1", "WIDGET-A", 10))
            .unwrap();

        let ledger = Arc::clone(&h.ledger);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    ledger
                        .apply_event(&decrement("shop1", "1001", "1", "WIDGET-A", 2))
                        .unwrap()
                        .applied
                })
            })
            .collect();

        let applied: usize = handles
            .into_iter()
            .map(|handle| usize::from(handle.join().unwrap()))
            .sum();

        assert_eq!(applied, 1);
        assert_eq!(h.ledger.on_hand(&"WIDGET-A".into()).unwrap(), Some(8));
    }

    #[test]
    fn test_same_line_different_kind_is_new_event() {
        let h = harness();
        h.ledger
            .apply_event(&refund("shop1", "999", "1", "WIDGET-A", 10))
            .unwrap();

        h.ledger
            .apply_event(&decrement("shop1", "1001", "1", "WIDGET-A", 2))
            .unwrap();
        let back = h
            .ledger
            .apply_event(&refund("shop1", "1001", "1", "WIDGET-A", 2))
            .unwrap();

        assert!(back.applied);
        assert_eq!(back.new_on_hand, 10);
    }
}

//! Interleaved mutations: per-SKU serialization without lost updates.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use mesh_ledger::{StockMutationApi, StockQueryApi};

    use crate::integration::harness::{decrement, make_site, refund, simple_product, Harness};

    fn harness() -> Harness {
        Harness::fast(
            vec![make_site("shop1")],
            vec![simple_product(42, "WIDGET-A")],
            3,
        )
    }

    #[test]
    fn test_no_lost_updates_on_one_sku() {
        let h = harness();
        h.ledger
            .apply_event(&refund("shop1", "seed", "1", "WIDGET-A", 100))
            .unwrap();

        // 10 writers x 5 distinct orders, each decrementing 2.
        let handles: Vec<_> = (0..10)
            .map(|writer| {
                let ledger = Arc::clone(&h.ledger);
                thread::spawn(move || {
                    for order in 0..5 {
                        ledger
                            .apply_event(&decrement(
                                "shop1",
                                &format!("order-{writer}-{order}"),
                                "1",
                                "WIDGET-A",
                                2,
                            ))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // 100 - 10*5*2 = 0: every delta landed exactly once.
        assert_eq!(h.ledger.on_hand(&"WIDGET-A".into()).unwrap(), Some(0));
        let entries = h.ledger.entries_for_sku(&"WIDGET-A".into()).unwrap();
        assert_eq!(entries.len(), 51);
    }

    #[test]
    fn test_overlapping_duplicate_deliveries() {
        let h = harness();
        h.ledger
            .apply_event(&refund("shop1", "seed", "1", "WIDGET-A", 40))
            .unwrap();

        // Three couriers race to deliver the same 20 orders.
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let ledger = Arc::clone(&h.ledger);
                thread::spawn(move || {
                    for order in 0..20 {
                        ledger
                            .apply_event(&decrement(
                                "shop1",
                                &format!("order-{order}"),
                                "1",
                                "WIDGET-A",
                                2,
                            ))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Each order applied once: 40 - 20*2 = 0.
        assert_eq!(h.ledger.on_hand(&"WIDGET-A".into()).unwrap(), Some(0));
        assert_eq!(
            h.ledger.entries_for_sku(&"WIDGET-A".into()).unwrap().len(),
            21
        );
    }

    #[test]
    fn test_distinct_skus_mutate_in_parallel() {
        let h = harness();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&h.ledger);
                thread::spawn(move || {
                    let sku = format!("SKU-{i}");
                    for order in 0..10 {
                        ledger
                            .apply_event(&refund(
                                "shop1",
                                &format!("order-{i}-{order}"),
                                "1",
                                &sku,
                                1,
                            ))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..8 {
            let sku = format!("SKU-{i}");
            assert_eq!(h.ledger.on_hand(&sku.as_str().into()).unwrap(), Some(10));
        }
    }

    #[test]
    fn test_concurrent_clamped_decrements_never_go_negative() {
        let h = harness();
        h.ledger
            .apply_event(&refund("shop1", "seed", "1", "WIDGET-A", 5))
            .unwrap();

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let ledger = Arc::clone(&h.ledger);
                thread::spawn(move || {
                    ledger
                        .apply_event(&decrement(
                            "shop1",
                            &format!("order-{i}"),
                            "1",
                            "WIDGET-A",
                            3,
                        ))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let on_hand = h.ledger.on_hand(&"WIDGET-A".into()).unwrap().unwrap();
        assert_eq!(on_hand, 0);
    }
}

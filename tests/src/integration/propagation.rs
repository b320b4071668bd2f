//! Fan-out, convergence, retry, and dead-letter behavior end to end.

#[cfg(test)]
mod tests {
    use mesh_ledger::StockQueryApi;
    use mesh_mapping::MappingApi;
    use mesh_propagation::{PropagationApi, PropagationError, PushError};

    use crate::integration::harness::{
        decrement, make_site, refund, simple_product, wait_until, Harness,
    };

    async fn mapped_harness(max_attempts: u32) -> Harness {
        let h = Harness::fast(
            vec![make_site("shop1"), make_site("shop2"), make_site("shop3")],
            vec![simple_product(42, "WIDGET-A")],
            max_attempts,
        );
        h.mapping.refresh(&make_site("shop2")).await.unwrap();
        h.mapping.refresh(&make_site("shop3")).await.unwrap();
        h
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_scenario_decrement_and_redelivery() {
        let h = mapped_harness(3).await;
        h.dispatcher.spawn_workers();

        // Seed WIDGET-A to 10 and let the seed fan-out drain.
        h.handle_event(&refund("shop1", "999", "1", "WIDGET-A", 10));
        wait_until(|| h.storefront.push_count() == 2).await;

        // The scenario event: shop1 order 1001 line 1, delta -2.
        let outcome = h.handle_event(&decrement("shop1", "1001", "1", "WIDGET-A", 2));
        assert!(outcome.applied);
        assert_eq!(outcome.new_on_hand, 8);
        wait_until(|| h.storefront.push_count() == 4).await;

        let pushes = h.storefront.pushes();
        let fanout: Vec<_> = pushes.iter().skip(2).collect();
        assert_eq!(fanout.len(), 2);
        assert!(fanout.iter().all(|p| p.quantity == 8));
        let mut sites: Vec<&str> = fanout.iter().map(|p| p.site_id.as_str()).collect();
        sites.sort_unstable();
        assert_eq!(sites, vec!["shop2", "shop3"]);

        // Identical redelivery: stock unchanged, nothing enqueued.
        let replay = h.handle_event(&decrement("shop1", "1001", "1", "WIDGET-A", 2));
        assert!(!replay.applied);
        assert_eq!(replay.new_on_hand, 8);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(h.storefront.push_count(), 4);
        assert_eq!(
            h.ledger.entries_for_sku(&"WIDGET-A".into()).unwrap().len(),
            2
        );

        h.dispatcher.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_convergence_pushes_current_value() {
        let h = mapped_harness(3).await;

        // Two mutations enqueue their fan-outs before any worker runs, so
        // both queued tasks carry stale quantities.
        h.handle_event(&refund("shop1", "999", "1", "WIDGET-A", 10));
        h.handle_event(&decrement("shop1", "1001", "1", "WIDGET-A", 7));
        assert_eq!(h.ledger.on_hand(&"WIDGET-A".into()).unwrap(), Some(3));

        h.dispatcher.spawn_workers();
        wait_until(|| h.storefront.push_count() == 4).await;

        // Every delivery reads the authoritative value at send time, so
        // the remotes converge on 3 regardless of delivery order.
        assert!(h.storefront.pushes().iter().all(|p| p.quantity == 3));
        h.dispatcher.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_retry_exhaustion_exactly_one_dead_letter() {
        // A single target site, so the event produces exactly one task.
        let single = Harness::fast(
            vec![make_site("shop1"), make_site("shop2")],
            vec![simple_product(42, "WIDGET-A")],
            3,
        );
        single.mapping.refresh(&make_site("shop2")).await.unwrap();
        single
            .storefront
            .script_failures(vec![
                PushError::Transient("gateway timeout".to_string()),
                PushError::Transient("gateway timeout".to_string()),
                PushError::Transient("gateway timeout".to_string()),
            ]);

        single.handle_event(&refund("shop1", "999", "1", "WIDGET-A", 10));
        single.dispatcher.spawn_workers();
        wait_until(|| !single.failures.list().unwrap().is_empty()).await;

        let rows = single.failures.list().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attempts, 3);
        assert_eq!(rows[0].error, "gateway timeout");
        assert_eq!(rows[0].site_id.as_str(), "shop2");

        single.dispatcher.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dead_letter_replay_after_transient_outage() {
        let h = Harness::fast(
            vec![make_site("shop1"), make_site("shop2")],
            vec![simple_product(42, "WIDGET-A")],
            2,
        );
        h.mapping.refresh(&make_site("shop2")).await.unwrap();
        h.storefront.script_failures(vec![
            PushError::Transient("down".to_string()),
            PushError::Transient("down".to_string()),
        ]);

        h.handle_event(&refund("shop1", "999", "1", "WIDGET-A", 10));
        h.dispatcher.spawn_workers();
        wait_until(|| !h.failures.list().unwrap().is_empty()).await;

        // Outage over (script drained): replay succeeds and clears the row.
        use mesh_propagation::DeadLetterApi;
        let id = h.failures.list().unwrap()[0].id;
        h.dispatcher.retry_failure(&id).unwrap();
        wait_until(|| h.storefront.push_count() == 1).await;
        assert!(h.failures.list().unwrap().is_empty());
        assert_eq!(h.storefront.pushes()[0].quantity, 10);

        h.dispatcher.shutdown();
    }

    #[tokio::test]
    async fn test_backpressure_rejects_when_full() {
        let h = Harness::new(
            vec![make_site("shop1"), make_site("shop2")],
            vec![simple_product(42, "WIDGET-A")],
            mesh_propagation::PropagationConfig {
                workers: 0,
                queue_capacity: 2,
                ..Default::default()
            },
        );

        h.dispatcher
            .enqueue_for_site(&"shop2".into(), &"WIDGET-A".into(), 1)
            .unwrap();
        h.dispatcher
            .enqueue_for_site(&"shop2".into(), &"WIDGET-A".into(), 2)
            .unwrap();

        let rejected = h
            .dispatcher
            .enqueue_for_site(&"shop2".into(), &"WIDGET-A".into(), 3);
        assert!(matches!(
            rejected,
            Err(PropagationError::QueueFull { capacity: 2 })
        ));
    }
}

//! Mapping rebuild and full-state resync.

#[cfg(test)]
mod tests {
    use mesh_ledger::StockQueryApi;
    use mesh_mapping::MappingApi;
    use mesh_reconcile::ReconcileApi;
    use shared_types::Site;

    use crate::integration::harness::{
        make_site, refund, simple_product, wait_until, Harness,
    };

    fn inactive(mut site: Site) -> Site {
        site.active = false;
        site
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reconcile_builds_mappings_for_fresh_site() {
        let h = Harness::fast(
            vec![make_site("shop1"), make_site("shop2")],
            vec![
                simple_product(1, "WIDGET-A"),
                simple_product(2, "WIDGET-B"),
                simple_product(3, "WIDGET-C"),
            ],
            3,
        );

        // The local catalog already knows two of the SKUs through events.
        h.handle_event(&refund("shop1", "1", "1", "WIDGET-A", 5));
        h.handle_event(&refund("shop1", "2", "1", "WIDGET-B", 5));

        let report = h.reconciler.reconcile(&"shop2".into(), false).await.unwrap();
        assert_eq!(report.mapped, 3);
        assert_eq!(report.push_errors, 0);

        // Every SKU present both locally and remotely is now mapped.
        for sku in ["WIDGET-A", "WIDGET-B", "WIDGET-C"] {
            assert!(h
                .mapping
                .resolve(&"shop2".into(), &sku.into())
                .unwrap()
                .is_some());
        }
        // Refresh also registered the remote-only SKU locally.
        assert!(h.ledger.product(&"WIDGET-C".into()).unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_resync_pushes_current_on_hand_per_mapped_sku() {
        let h = Harness::fast(
            vec![make_site("shop1"), make_site("shop2")],
            vec![simple_product(1, "WIDGET-A"), simple_product(2, "WIDGET-B")],
            3,
        );
        // Seed through the ledger alone: no fan-out, the replicas have
        // never heard of this stock.
        {
            use mesh_ledger::StockMutationApi;
            h.ledger
                .apply_event(&refund("shop1", "1", "1", "WIDGET-A", 4))
                .unwrap();
        }
        h.dispatcher.spawn_workers();

        let report = h.reconciler.reconcile(&"shop2".into(), true).await.unwrap();
        assert_eq!(report.mapped, 2);
        assert_eq!(report.pushed, 2);

        wait_until(|| h.storefront.push_count() == 2).await;
        let pushes = h.storefront.pushes();
        let a = pushes.iter().find(|p| p.remote.product_id == 1).unwrap();
        let b = pushes.iter().find(|p| p.remote.product_id == 2).unwrap();
        assert_eq!(a.quantity, 4);
        assert_eq!(b.quantity, 0);

        h.dispatcher.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reconcile_all_covers_active_sites() {
        let h = Harness::fast(
            vec![
                make_site("shop1"),
                make_site("shop2"),
                inactive(make_site("dormant")),
            ],
            vec![simple_product(1, "WIDGET-A")],
            3,
        );

        let reports = h.reconciler.reconcile_all(false).await;
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.site_id.as_str() != "dormant"));
        assert!(reports.iter().all(|r| r.mapped == 1));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reconcile_is_safe_to_repeat() {
        let h = Harness::fast(
            vec![make_site("shop1"), make_site("shop2")],
            vec![simple_product(1, "WIDGET-A")],
            3,
        );

        let first = h.reconciler.reconcile(&"shop2".into(), false).await.unwrap();
        let second = h.reconciler.reconcile(&"shop2".into(), false).await.unwrap();
        assert_eq!(first.mapped, second.mapped);
        assert_eq!(h.mapping.mappings_for(&"shop2".into()).unwrap().len(), 1);
    }
}

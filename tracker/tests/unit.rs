//! Unit tests for the record store and dispatch processor
//!
//! These tests drive `RecordStore` directly, without a tracker task or adapter.

mod common;

use common::{TestFixtures, TestHelpers};
use shared::{MaterialType, RecordId, RecordQuery, RecordState, SkipReason, SortKey, SortOrder};
use std::collections::HashSet;
use tracker::core::{entries_for_batch, group_active_by_type, regroup_entries};
use tracker::{RecordStore, TrackerError, WeightMode};

mod grouping_tests {
    use super::*;

    #[test]
    fn test_scenario_a_one_group_per_type() {
        let store = TestHelpers::store_with(TestFixtures::scenario_a());
        let groups = store.active_groups();

        assert_eq!(groups.len(), 2);
        let plastic = groups.get(&MaterialType::Plastic).unwrap();
        assert_eq!(plastic.count, 1);
        assert_eq!(plastic.record_ids, vec![RecordId(1)]);
        TestHelpers::assert_weight_eq(plastic.total_weight_kg, 2.5);

        let glass = groups.get(&MaterialType::Glass).unwrap();
        assert_eq!(glass.count, 1);
        assert_eq!(glass.record_ids, vec![RecordId(2)]);
        TestHelpers::assert_weight_eq(glass.total_weight_kg, 3.2);
    }

    #[test]
    fn test_scenario_d_same_type_accumulates() {
        let store = TestHelpers::store_with(TestFixtures::scenario_d());
        let groups = store.active_groups();

        assert_eq!(groups.len(), 1);
        let plastic = groups.get(&MaterialType::Plastic).unwrap();
        assert_eq!(plastic.count, 2);
        TestHelpers::assert_weight_eq(plastic.total_weight_kg, 25.5);
    }

    #[test]
    fn test_groups_cover_exactly_active_records() {
        let mut store = TestHelpers::store_with(TestFixtures::mixed_intake());
        store.process_dispatch(&TestHelpers::dispatch_ids(&[2, 4])).unwrap();

        let groups = group_active_by_type(store.records());
        let grouped: HashSet<RecordId> = groups
            .groups()
            .iter()
            .flat_map(|group| group.record_ids.iter().copied())
            .collect();
        let active: HashSet<RecordId> = store.active_records().map(|record| record.id).collect();

        assert_eq!(grouped, active);
        let total: usize = groups.groups().iter().map(|group| group.count).sum();
        assert_eq!(total, active.len());

        for group in groups.groups() {
            let expected: f64 = group
                .record_ids
                .iter()
                .filter_map(|id| store.get(*id))
                .map(|record| record.weight_kg)
                .sum();
            TestHelpers::assert_weight_eq(group.total_weight_kg, expected);
        }
    }

    #[test]
    fn test_people_deduplicated_in_first_seen_order() {
        let store = TestHelpers::store_with(TestFixtures::mixed_intake());
        let plastic = store.active_groups().get(&MaterialType::Plastic).cloned().unwrap();

        assert_eq!(plastic.people, vec![TestFixtures::OPERATOR, TestFixtures::SECOND_OPERATOR]);
    }
}

mod dispatch_tests {
    use super::*;

    #[test]
    fn test_scenario_b_dispatch_one_group() {
        let mut store = TestHelpers::store_with(TestFixtures::scenario_a());
        let request = TestHelpers::dispatch_request(vec![TestFixtures::selection(MaterialType::Plastic, &[1])]);

        let outcome = store.process_dispatch(&request).unwrap();

        assert!(!outcome.is_partial());
        assert_eq!(store.get(RecordId(1)).unwrap().state, RecordState::Dispatched);
        assert_eq!(store.get(RecordId(2)).unwrap().state, RecordState::Active);
        assert_eq!(store.batches().len(), 1);

        let batch = &store.batches()[0];
        assert_eq!(batch.dispatch_id.value(), 1);
        assert_eq!(batch.authorized_by, TestFixtures::SUPERVISOR);
        assert_eq!(batch.groups.len(), 1);
        assert_eq!(batch.groups[0].material_type, MaterialType::Plastic);
        assert_eq!(batch.groups[0].count, 1);
        assert_eq!(batch.groups[0].record_ids, vec![RecordId(1)]);
        TestHelpers::assert_weight_eq(batch.groups[0].total_weight_kg, 2.5);
    }

    #[test]
    fn test_scenario_c_empty_selection_rejected() {
        let mut store = TestHelpers::store_with(TestFixtures::scenario_a());
        let before = store.clone();

        let err = store.process_dispatch(&TestHelpers::dispatch_request(vec![])).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(store, before);
        assert!(store.batches().is_empty());
    }

    #[test]
    fn test_redispatch_is_rejected_without_new_batch() {
        let mut store = TestHelpers::store_with(TestFixtures::scenario_a());
        store.process_dispatch(&TestHelpers::dispatch_ids(&[1])).unwrap();
        let before = store.clone();

        let err = store.process_dispatch(&TestHelpers::dispatch_ids(&[1])).unwrap_err();

        match err {
            TrackerError::NothingToDispatch { skipped } => {
                assert_eq!(skipped.len(), 1);
                assert_eq!(skipped[0].record_id, RecordId(1));
                assert_eq!(skipped[0].reason, SkipReason::AlreadyDispatched);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store, before);
        assert_eq!(store.batches().len(), 1);
    }

    #[test]
    fn test_partial_success_reports_skipped_ids() {
        let mut store = TestHelpers::store_with(TestFixtures::mixed_intake());
        store.process_dispatch(&TestHelpers::dispatch_ids(&[3])).unwrap();

        let outcome = store.process_dispatch(&TestHelpers::dispatch_ids(&[1, 3, 99, 2])).unwrap();

        assert!(outcome.is_partial());
        let reasons: Vec<(u64, SkipReason)> = outcome
            .skipped
            .iter()
            .map(|skip| (skip.record_id.value(), skip.reason))
            .collect();
        assert_eq!(reasons, vec![(3, SkipReason::AlreadyDispatched), (99, SkipReason::NotFound)]);
        assert_eq!(outcome.batch.record_count, 2);
        assert_eq!(outcome.batch.dispatch_id.value(), 2);
    }

    #[test]
    fn test_batch_groups_partition_touched_ids() {
        let mut store = TestHelpers::store_with(TestFixtures::mixed_intake());
        // Declared types are advisory; ids repeat across selections
        let request = TestHelpers::dispatch_request(vec![
            TestFixtures::selection(MaterialType::Glass, &[1, 2, 4]),
            TestFixtures::selection(MaterialType::Glass, &[4, 5]),
        ]);

        let outcome = store.process_dispatch(&request).unwrap();

        let mut seen = HashSet::new();
        for group in &outcome.batch.groups {
            for id in &group.record_ids {
                assert!(seen.insert(*id), "record {id} appears twice");
                assert_eq!(store.get(*id).unwrap().material_type, group.material_type);
                assert_eq!(store.get(*id).unwrap().state, RecordState::Dispatched);
            }
        }
        let expected: HashSet<RecordId> = [1, 2, 4, 5].into_iter().map(RecordId).collect();
        assert_eq!(seen, expected);
        assert_eq!(outcome.batch.record_count, 4);

        let types: Vec<&MaterialType> = outcome.batch.groups.iter().map(|group| &group.material_type).collect();
        assert_eq!(types, vec![&MaterialType::Plastic, &MaterialType::Cardboard, &MaterialType::Metal]);
    }

    #[test]
    fn test_missing_authorizer_is_validation_error() {
        let mut store = TestHelpers::store_with(TestFixtures::scenario_a());
        let mut request = TestHelpers::dispatch_ids(&[1]);
        request.authorized_by = "  ".to_string();

        match store.process_dispatch(&request).unwrap_err() {
            TrackerError::Validation(errors) => assert!(errors.contains("authorized_by")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.get(RecordId(1)).unwrap().is_active());
    }

    #[test]
    fn test_stale_plan_conflicts() {
        let mut store = TestHelpers::store_with(TestFixtures::scenario_a());
        let first = store.plan_dispatch(&TestHelpers::dispatch_ids(&[1])).unwrap();
        let second = store.plan_dispatch(&TestHelpers::dispatch_ids(&[1, 2])).unwrap();

        store.apply_dispatch(first).unwrap();
        let err = store.apply_dispatch(second).unwrap_err();

        assert!(err.is_conflict());
        assert!(store.get(RecordId(2)).unwrap().is_active());
        assert_eq!(store.batches().len(), 1);
    }
}

mod registration_tests {
    use super::*;

    #[test]
    fn test_sequential_ids_from_empty_store() {
        let mut store = RecordStore::new();
        for n in 1..=25u64 {
            let record = store
                .register(TestFixtures::new_record("Metal", n as f64), TestFixtures::registered_at())
                .unwrap();
            assert_eq!(record.id, RecordId(n));
            assert_eq!(record.state, RecordState::Active);
        }
        assert_eq!(store.len(), 25);
    }

    #[test]
    fn test_invalid_registration_lists_every_field() {
        let mut store = RecordStore::new();
        let mut input = TestFixtures::new_record("", -1.0);
        input.registered_by = String::new();

        match store.register(input, TestFixtures::registered_at()).unwrap_err() {
            TrackerError::Validation(errors) => {
                assert!(errors.contains("material_type"));
                assert!(errors.contains("weight_kg"));
                assert!(errors.contains("registered_by"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_registration_time_defaults_to_now() {
        let mut store = RecordStore::new();
        let mut input = TestFixtures::new_record("Glass", 1.0);
        input.registered_at = None;
        let now = TestFixtures::dispatched_at();

        let record = store.register(input, now).unwrap();
        assert_eq!(record.registered_at, now);
    }
}

mod ledger_tests {
    use super::*;

    #[test]
    fn test_entries_regroup_into_same_batches() {
        let mut store = TestHelpers::store_with(TestFixtures::mixed_intake());
        store.process_dispatch(&TestHelpers::dispatch_ids(&[1, 2, 4])).unwrap();
        store.process_dispatch(&TestHelpers::dispatch_ids(&[3, 5])).unwrap();

        let entries: Vec<_> = store
            .batches()
            .iter()
            .flat_map(|batch| entries_for_batch(batch, store.records(), WeightMode::Exact))
            .collect();
        assert_eq!(entries.len(), 5);

        let regrouped = regroup_entries(&entries, store.records());
        assert_eq!(regrouped, store.batches().to_vec());
    }

    #[test]
    fn test_group_average_rounds_to_cents() {
        let mut store = TestHelpers::store_with(vec![
            TestFixtures::new_record("Plastic", 1.0),
            TestFixtures::new_record("Plastic", 1.0),
            TestFixtures::new_record("Plastic", 2.0),
        ]);
        let outcome = store.process_dispatch(&TestHelpers::dispatch_ids(&[1, 2, 3])).unwrap();

        let entries = entries_for_batch(&outcome.batch, store.records(), WeightMode::GroupAverage);
        assert!(entries.iter().all(|entry| entry.weight_kg == 1.33));

        let exact = entries_for_batch(&outcome.batch, store.records(), WeightMode::Exact);
        let weights: Vec<f64> = exact.iter().map(|entry| entry.weight_kg).collect();
        assert_eq!(weights, vec![1.0, 1.0, 2.0]);
    }
}

mod query_tests {
    use super::*;

    #[test]
    fn test_filter_by_state_and_sort_by_weight() {
        let mut store = TestHelpers::store_with(TestFixtures::mixed_intake());
        store.process_dispatch(&TestHelpers::dispatch_ids(&[2])).unwrap();

        let records = store.query(&RecordQuery {
            state: Some(RecordState::Active),
            sort: Some(SortKey::Weight),
            order: SortOrder::Desc,
            ..Default::default()
        });
        let ids: Vec<u64> = records.iter().map(|record| record.id.value()).collect();
        assert_eq!(ids, vec![3, 1, 4, 5]);
    }

    #[test]
    fn test_short_search_term_is_ignored() {
        let store = TestHelpers::store_with(TestFixtures::mixed_intake());

        let all = store.query(&RecordQuery {
            search: Some("p".to_string()),
            ..Default::default()
        });
        assert_eq!(all.len(), 5);

        let pedro = store.query(&RecordQuery {
            search: Some("PEDRO".to_string()),
            ..Default::default()
        });
        assert_eq!(pedro.len(), 1);
        assert_eq!(pedro[0].id, RecordId(4));
    }

    #[test]
    fn test_stats_and_summary() {
        let mut store = TestHelpers::store_with(TestFixtures::scenario_d());
        store.process_dispatch(&TestHelpers::dispatch_ids(&[2])).unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.active_records, 1);
        assert_eq!(stats.dispatched_records, 1);
        assert_eq!(stats.dispatch_count, 1);
        assert_eq!(stats.dispatch_rate_pct, 50.0);
        TestHelpers::assert_weight_eq(stats.total_weight_kg, 25.5);

        let summary = store.type_summary();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].weight_share_pct, 100.0);
        assert_eq!(summary.totals.dispatched_records, 1);
    }
}

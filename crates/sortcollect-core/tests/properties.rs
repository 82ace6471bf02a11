use proptest::prelude::*;
use sortcollect_core::{fetcher::WaitingRowFetcher, prelude::*};
use std::sync::Arc;

// Generous upper bound on get_some calls for the input sizes generated here.
const MAX_BATCHES: usize = 512;

fn arb_sorted_rows() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0_i64..6, -1_000_i64..1_000), 0..40).prop_map(|mut rows| {
        rows.sort_by_key(|(key, _)| *key);
        rows
    })
}

// Values near the integer range edges so partial sums leave `Int`/`Uint`.
fn arb_edge_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Int(i64::MIN)),
        Just(Value::Int(i64::MAX)),
        Just(Value::Uint(u64::MAX)),
        Just(Value::Null),
        (-3_i64..3).prop_map(Value::Int),
    ]
}

// Key runs as generated, paired with the same runs shuffled within each key.
fn arb_runs_and_shuffled() -> impl Strategy<Value = (Vec<Vec<Value>>, Vec<Vec<Value>>)> {
    prop::collection::vec(prop::collection::vec(arb_edge_value(), 1..6), 0..5).prop_flat_map(
        |runs| {
            let shuffled = runs
                .iter()
                .cloned()
                .map(|run| Just(run).prop_shuffle())
                .collect::<Vec<_>>();

            (Just(runs), shuffled)
        },
    )
}

fn keyed_runs(runs: &[Vec<Value>]) -> Vec<Vec<Value>> {
    runs.iter()
        .zip(0_i64..)
        .flat_map(|(run, key)| run.iter().map(move |val| vec![Value::Int(key), val.clone()]))
        .collect()
}

fn to_values(rows: &[(i64, i64)]) -> Vec<Vec<Value>> {
    rows.iter()
        .map(|(key, val)| vec![Value::Int(*key), Value::Int(*val)])
        .collect()
}

fn to_input_rows(rows: &[(i64, i64)]) -> Vec<InputRow> {
    to_values(rows)
        .into_iter()
        .zip(1..)
        .map(|(values, id)| InputRow::new(RowId::new(id), values))
        .collect()
}

fn full_config() -> Arc<SortedCollectConfig> {
    Arc::new(
        SortedCollectConfig::new(2, 4)
            .with_group(0, 0)
            .with_aggregate("SUM", 1, 1)
            .with_aggregate("LENGTH", 2, 1)
            .with_collect(3, CollectMode::Expression { input: 1 }),
    )
}

fn order_free_config() -> Arc<SortedCollectConfig> {
    Arc::new(
        SortedCollectConfig::new(2, 4)
            .with_group(0, 0)
            .with_aggregate("SUM", 1, 1)
            .with_aggregate("LENGTH", 2, 1)
            .with_aggregate("COUNT_DISTINCT", 3, 1),
    )
}

fn count_config() -> Arc<SortedCollectConfig> {
    Arc::new(SortedCollectConfig::new(2, 2).with_group(0, 0).with_count(1))
}

// Consecutive runs of equal keys, in input order.
fn runs(rows: &[(i64, i64)]) -> Vec<(i64, Vec<i64>)> {
    let mut runs: Vec<(i64, Vec<i64>)> = Vec::new();
    for (key, val) in rows {
        match runs.last_mut() {
            Some((last, vals)) if last == key => vals.push(*val),
            _ => runs.push((*key, vec![*val])),
        }
    }

    runs
}

fn expected_full(rows: &[(i64, i64)]) -> Vec<Vec<Value>> {
    runs(rows)
        .into_iter()
        .map(|(key, vals)| {
            vec![
                Value::Int(key),
                Value::Int(vals.iter().sum()),
                Value::Uint(vals.len() as u64),
                Value::List(vals.into_iter().map(Value::Int).collect()),
            ]
        })
        .collect()
}

fn collect_all<F: RowFetcher>(
    config: Arc<SortedCollectConfig>,
    fetcher: F,
    batch: usize,
) -> Vec<Vec<Value>> {
    let mut block = CollectBlock::new(config, fetcher).expect("block should build");
    let mut out = Vec::new();

    for _ in 0..MAX_BATCHES {
        let (state, rows) = block.get_some(batch).expect("get_some should succeed");
        out.extend(rows.into_iter().map(OutputRow::into_values));
        if state == ExecutionState::Done {
            return out;
        }
    }

    panic!("collect block did not finish within {MAX_BATCHES} batches");
}

proptest! {
    #[test]
    fn grouping_and_aggregates_match_reference(rows in arb_sorted_rows(), batch in 1_usize..5) {
        let out = collect_all(full_config(), VecRowFetcher::from_values(to_values(&rows)), batch);

        prop_assert_eq!(out, expected_full(&rows));
    }

    #[test]
    fn aggregates_ignore_row_order_within_a_group(
        (runs, shuffled) in arb_runs_and_shuffled(),
        batch in 1_usize..4,
    ) {
        let fetch = |runs: &[Vec<Value>]| VecRowFetcher::from_values(keyed_runs(runs));
        let original = collect_all(order_free_config(), fetch(&runs), batch);
        let reordered = collect_all(order_free_config(), fetch(&shuffled), batch);

        prop_assert_eq!(original.len(), runs.len());
        prop_assert_eq!(reordered, original);
    }

    #[test]
    fn count_mode_matches_run_lengths(rows in arb_sorted_rows()) {
        let out = collect_all(count_config(), VecRowFetcher::from_values(to_values(&rows)), 3);
        let expected = runs(&rows)
            .into_iter()
            .map(|(key, vals)| vec![Value::Int(key), Value::Uint(vals.len() as u64)])
            .collect::<Vec<_>>();

        prop_assert_eq!(out, expected);
    }

    #[test]
    fn waiting_injection_does_not_change_output(
        rows in arb_sorted_rows(),
        schedule in prop::collection::vec(0_usize..41, 0..20),
        batch in 1_usize..5,
    ) {
        let plain = collect_all(full_config(), VecRowFetcher::from_values(to_values(&rows)), batch);
        let waiting = WaitingRowFetcher::new(VecRowFetcher::from_values(to_values(&rows)), schedule);
        let suspended = collect_all(full_config(), waiting, batch);

        prop_assert_eq!(suspended, plain);
    }

    #[test]
    fn input_rows_are_released_after_completion(rows in arb_sorted_rows()) {
        let inputs = to_input_rows(&rows);
        let _ = collect_all(full_config(), VecRowFetcher::new(inputs.clone()), 2);

        prop_assert!(inputs.iter().all(|row| row.handle_count() == 1));
    }

    #[test]
    fn input_rows_are_released_when_dropped_midway(rows in arb_sorted_rows(), batch in 1_usize..3) {
        let inputs = to_input_rows(&rows);
        {
            let mut block = CollectBlock::new(full_config(), VecRowFetcher::new(inputs.clone()))
                .expect("block should build");
            let _ = block.get_some(batch).expect("get_some should succeed");
        }

        prop_assert!(inputs.iter().all(|row| row.handle_count() == 1));
    }
}

#[test]
fn empty_input_finishes_without_output() {
    let mut block = CollectBlock::new(full_config(), VecRowFetcher::new(Vec::new()))
        .expect("block should build");

    let (state, rows) = block.get_some(4).expect("get_some should succeed");
    assert_eq!(state, ExecutionState::Done);
    assert!(rows.is_empty());
    assert_eq!(block.executor().stats().groups_emitted, 0);
}

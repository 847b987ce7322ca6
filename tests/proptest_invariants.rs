use ideal_fit::domain::{BestFitMapping, Series, SeriesTable};
use ideal_fit::fit::{ACCEPTANCE_RADIUS, build_annotated_tables, select_best_fits};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

const MAX_ROWS: usize = 24;

fn grid(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 * 0.5 - 3.0).collect()
}

fn table(x: &[f64], columns: &[Vec<f64>]) -> SeriesTable {
    let n = x.len();
    SeriesTable::new(
        x.to_vec(),
        columns
            .iter()
            .enumerate()
            .map(|(i, v)| Series::new(format!("y{}", i + 1), v[..n].to_vec()))
            .collect(),
    )
    .unwrap()
}

fn naive_sse(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(p, q)| (p - q) * (p - q)).sum()
}

fn test_table(x: &[f64], rows: &[(usize, f64)]) -> SeriesTable {
    let (tx, ty): (Vec<f64>, Vec<f64>) = rows.iter().map(|&(i, y)| (x[i % x.len()], y)).unzip();
    SeriesTable::new(tx, vec![Series::new("y", ty)]).unwrap()
}

fn columns(count: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-100.0f64..100.0, MAX_ROWS), count)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    #[test]
    fn selection_covers_every_training_column_with_a_minimum(
        n in 1usize..MAX_ROWS,
        ideal_cols in columns(1..8),
        train_cols in columns(1..5),
    ) {
        let x = grid(n);
        let ideal = table(&x, &ideal_cols);
        let training = table(&x, &train_cols);

        let mapping = select_best_fits(&training, &ideal).unwrap();
        prop_assert_eq!(mapping.len(), training.columns().len());
        prop_assert_eq!(&select_best_fits(&training, &ideal).unwrap(), &mapping);

        for (fit, train) in mapping.iter().zip(training.columns()) {
            prop_assert_eq!(&fit.test_column, &train.name);
            let chosen = ideal.column(&fit.best_fit_col_ideal).unwrap();
            let best = ideal
                .columns()
                .iter()
                .map(|c| naive_sse(&c.values, &train.values))
                .fold(f64::INFINITY, f64::min);
            let tol = 1e-9 * (1.0 + best);
            prop_assert!(fit.squared_diff >= 0.0);
            prop_assert!((fit.squared_diff - best).abs() <= tol);
            prop_assert!((naive_sse(&chosen.values, &train.values) - best).abs() <= tol);
        }
    }

    #[test]
    fn copying_an_ideal_column_gives_a_zero_sse_match(
        n in 1usize..MAX_ROWS,
        ideal_cols in columns(1..8),
        pick in 0usize..8,
    ) {
        let x = grid(n);
        let ideal = table(&x, &ideal_cols);
        let copied = ideal.columns()[pick % ideal.columns().len()].values.clone();
        let training = SeriesTable::new(x, vec![Series::new("t", copied.clone())]).unwrap();

        let mapping = select_best_fits(&training, &ideal).unwrap();
        let fit = &mapping.as_slice()[0];
        prop_assert_eq!(fit.squared_diff, 0.0);
        prop_assert_eq!(&ideal.column(&fit.best_fit_col_ideal).unwrap().values, &copied);
    }

    #[test]
    fn classification_respects_the_strict_radius(
        n in 1usize..MAX_ROWS,
        ideal_cols in columns(1..4),
        rows in prop::collection::vec((0usize..MAX_ROWS, -100.0f64..100.0), 0..30),
    ) {
        let x = grid(n);
        let ideal = table(&x, &ideal_cols);
        let test = test_table(&x, &rows);
        let mapping = select_best_fits(&ideal, &ideal).unwrap();

        let result = build_annotated_tables(&ideal, &test, &mapping).unwrap();
        prop_assert_eq!(result.len(), mapping.len());
        for c in &result {
            let annotated = c.outcome.as_ref().unwrap();
            prop_assert_eq!(annotated.rows.len(), test.len());
            prop_assert!(annotated.rows.windows(2).all(|w| w[0].x <= w[1].x));
            for r in &annotated.rows {
                prop_assert_eq!(r.distance, (r.ideal_y - r.test_y).abs());
                prop_assert_eq!(r.result, r.distance < ACCEPTANCE_RADIUS);
            }
        }
    }

    #[test]
    fn classification_ignores_test_row_order(
        ideal_cols in columns(1..4),
        picks in prop::sample::subsequence((0..MAX_ROWS).collect::<Vec<_>>(), 0..MAX_ROWS),
        ys in prop::collection::vec(-10.0f64..10.0, MAX_ROWS),
        rotate in 0usize..MAX_ROWS,
    ) {
        let x = grid(MAX_ROWS);
        let ideal = table(&x, &ideal_cols);
        let mapping: BestFitMapping = select_best_fits(&ideal, &ideal).unwrap();

        let rows: Vec<(usize, f64)> = picks.iter().map(|&i| (i, ys[i])).collect();
        let mut shuffled: Vec<(usize, f64)> = rows.iter().rev().copied().collect();
        if !shuffled.is_empty() {
            let k = rotate % shuffled.len();
            shuffled.rotate_left(k);
        }

        let a = build_annotated_tables(&ideal, &test_table(&x, &rows), &mapping).unwrap();
        let b = build_annotated_tables(&ideal, &test_table(&x, &shuffled), &mapping).unwrap();
        prop_assert_eq!(a, b);
    }
}

use ndarray::{Array1, Array2};
use polars::df;
use polars::prelude::*;

use crate::data_handling::pinotti::region_mask;
use crate::data_handling::weights::WeightSet;
use crate::helper_functions::{column_f64, round2};

/// Display labels for the eight matching predictors, in table order.
pub const PREDICTOR_LABELS: [&str; 8] = [
    "GDP per Capita",
    "Investment Rate",
    "Industry VA",
    "Agriculture VA",
    "Market Services VA",
    "Non-market Services VA",
    "Human Capital",
    "Population Density",
];

/// Matching-period characteristics of the treated unit, the four synthetic
/// controls and the raw control units (mean/min/max over the matching
/// years). One row per predictor, every cell rounded to 2 decimals.
///
/// The treated column is derived from `x1`; predictors and control units
/// are selected by column name and region code.
pub fn matching_period_table(
    weights: &WeightSet,
    x0: &Array2<f64>,
    x1: &Array1<f64>,
    data: &DataFrame,
    predictor_columns: &[&str],
    control_regions: &[i64],
    matching_years: (i64, i64),
    study_name: &str,
) -> PolarsResult<DataFrame> {
    if predictor_columns.len() != PREDICTOR_LABELS.len()
        || x0.nrows() != PREDICTOR_LABELS.len()
        || x1.len() != PREDICTOR_LABELS.len()
    {
        return Err(PolarsError::ShapeMismatch(
            format!(
                "expected {} predictors, got {} columns / X0 rows {} / X1 len {}",
                PREDICTOR_LABELS.len(),
                predictor_columns.len(),
                x0.nrows(),
                x1.len()
            )
            .into(),
        ));
    }

    let x_pred_nested = predict(x0, &weights.nested_arr())?;
    let x_pred_global = predict(x0, &weights.global_arr())?;
    let x_pred_pinotti = predict(x0, &weights.pinotti_arr())?;
    let x_pred_becker = predict(x0, &weights.becker_arr())?;

    // Descriptive statistics of the raw control units over the matching years
    let (lo, hi) = matching_years;
    let year = data.column("year")?.i64()?;
    let matching = data.filter(&(region_mask(data, control_regions)? & (year.gt_eq(lo) & year.lt_eq(hi))))?;

    let mut means = Vec::with_capacity(predictor_columns.len());
    let mut mins = Vec::with_capacity(predictor_columns.len());
    let mut maxs = Vec::with_capacity(predictor_columns.len());
    for &col in predictor_columns {
        let values = column_f64(&matching, col)?;
        let n = values.len().max(1) as f64;
        means.push(round2(values.iter().sum::<f64>() / n));
        mins.push(round2(values.iter().cloned().fold(f64::INFINITY, f64::min)));
        maxs.push(round2(values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)));
    }

    let rounded = |a: &Array1<f64>| a.iter().map(|&v| round2(v)).collect::<Vec<f64>>();

    let table = df![
        "Predictor" => PREDICTOR_LABELS.to_vec(),
        "Treated Actual" => rounded(x1),
        "Pinotti Synth" => rounded(&x_pred_pinotti),
        "Becker MSCMT" => rounded(&x_pred_becker),
        "SCM/Nested" => rounded(&x_pred_nested),
        "SCM/Global" => rounded(&x_pred_global),
        "Mean" => means,
        "Min" => mins,
        "Max" => maxs
    ]?;

    println!(
        "\nMatching Period Characteristics: {}, Synthetic Control, Control Units",
        study_name
    );
    println!("{}", table);

    Ok(table)
}

/// `X0 w`: one synthetic predictor value per row of the predictor matrix.
fn predict(x0: &Array2<f64>, w: &Array1<f64>) -> PolarsResult<Array1<f64>> {
    if x0.ncols() != w.len() {
        return Err(PolarsError::ShapeMismatch(
            format!(
                "weight vector has {} entries but X0 has {} control units",
                w.len(),
                x0.ncols()
            )
            .into(),
        ));
    }
    Ok(x0.dot(w))
}

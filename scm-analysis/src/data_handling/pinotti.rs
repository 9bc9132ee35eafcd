use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::info;

use crate::helper_functions::{column_f64, distinct_years, read_csv};
use crate::models::Dataset;

/// Long-format regional panel: one row per (region, year) with the outcome
/// and predictor columns, regions identified by their `reg` code.
pub struct PinottiDataset {
    pub path: String,
}

impl Dataset for PinottiDataset {
    fn load(&self) -> PolarsResult<DataFrame> {
        read_csv(&self.path)
    }
}

/// Wide outcome panels carved out of the long table.
///
/// Control matrices are (units x years); rows correspond 1:1, in order, to
/// the region codes the caller passed (the same order every weight vector
/// uses), columns follow first appearance of each year in the file.
pub struct RegionPanels {
    pub years: Vec<i64>,
    pub y_control: Array2<f64>,
    pub y_treat: Array1<f64>,
    pub murd_control: Array2<f64>,
    pub murd_treat: Array1<f64>,
}

impl RegionPanels {
    pub fn build(
        data: &DataFrame,
        treated_region: i64,
        control_regions: &[i64],
    ) -> PolarsResult<Self> {
        let years = distinct_years(data)?;
        let n_years = years.len();
        let n_controls = control_regions.len();

        let controls = data.filter(&region_mask(data, control_regions)?)?;
        let treated = data.filter(&region_mask(data, &[treated_region])?)?;

        // Panel rows must line up with weight-vector entries, so the file
        // has to present the control regions in the caller's order.
        let seen = region_order(&controls)?;
        if seen != control_regions {
            return Err(PolarsError::ComputeError(
                format!(
                    "control regions appear in the file as {:?}, expected {:?}",
                    seen, control_regions
                )
                .into(),
            ));
        }

        let y_control = outcome_panel(&controls, "gdppercap", n_controls, n_years)?;
        let murd_control = outcome_panel(&controls, "murd", n_controls, n_years)?;
        let y_treat = outcome_row(&treated, "gdppercap", n_years)?;
        let murd_treat = outcome_row(&treated, "murd", n_years)?;

        info!(
            "Built region panels: {} control units x {} years",
            n_controls, n_years
        );

        Ok(Self {
            years,
            y_control,
            y_treat,
            murd_control,
            murd_treat,
        })
    }
}

/// Reshape one outcome column of a region-major long table into a
/// (units x years) matrix. The dimensions come from the data, and a column
/// whose length is not `units * years` is a hard error, never a silent
/// truncation.
pub fn outcome_panel(
    df: &DataFrame,
    column: &str,
    n_units: usize,
    n_years: usize,
) -> PolarsResult<Array2<f64>> {
    let values = column_f64(df, column)?;
    Array2::from_shape_vec((n_units, n_years), values).map_err(|e| {
        PolarsError::ShapeMismatch(
            format!(
                "cannot reshape '{}' into ({}, {}): {}",
                column, n_units, n_years, e
            )
            .into(),
        )
    })
}

/// Single-unit counterpart of [`outcome_panel`].
pub fn outcome_row(df: &DataFrame, column: &str, n_years: usize) -> PolarsResult<Array1<f64>> {
    let values = column_f64(df, column)?;
    if values.len() != n_years {
        return Err(PolarsError::ShapeMismatch(
            format!(
                "treated '{}' has {} observations, expected {}",
                column,
                values.len(),
                n_years
            )
            .into(),
        ));
    }
    Ok(Array1::from_vec(values))
}

/// Matching-period predictor matrices: X0 is (predictors x control units)
/// of per-region means over the matching years, X1 the treated unit's
/// means. Predictors are selected by column name.
pub fn predictor_matrices(
    data: &DataFrame,
    predictor_columns: &[&str],
    treated_region: i64,
    control_regions: &[i64],
    matching_years: (i64, i64),
) -> PolarsResult<(Array2<f64>, Array1<f64>)> {
    let p = predictor_columns.len();
    let (lo, hi) = matching_years;
    let year = data.column("year")?.i64()?;
    let year_mask = year.gt_eq(lo) & year.lt_eq(hi);

    let mut x0 = Array2::<f64>::zeros((p, control_regions.len()));
    for (j, &code) in control_regions.iter().enumerate() {
        let sub = data.filter(&(region_mask(data, &[code])? & year_mask.clone()))?;
        if sub.height() == 0 {
            log::warn!("No matching-period rows for control region {}", code);
        }
        for (i, &col) in predictor_columns.iter().enumerate() {
            x0[[i, j]] = mean(&column_f64(&sub, col)?);
        }
    }

    let treated = data.filter(&(region_mask(data, &[treated_region])? & year_mask))?;
    let mut x1 = Array1::<f64>::zeros(p);
    for (i, &col) in predictor_columns.iter().enumerate() {
        x1[i] = mean(&column_f64(&treated, col)?);
    }

    Ok((x0, x1))
}

/// Region codes in first-seen order.
fn region_order(df: &DataFrame) -> PolarsResult<Vec<i64>> {
    let reg = df.column("reg")?.i64()?;
    let mut codes: Vec<i64> = Vec::new();
    for r in reg.into_no_null_iter() {
        if !codes.contains(&r) {
            codes.push(r);
        }
    }
    Ok(codes)
}

pub(crate) fn region_mask(df: &DataFrame, codes: &[i64]) -> PolarsResult<BooleanChunked> {
    let reg = df.column("reg")?.i64()?;
    let mask: Vec<bool> = reg
        .into_no_null_iter()
        .map(|r| codes.contains(&r))
        .collect();
    Ok(BooleanChunked::from_slice(PlSmallStr::from("mask"), &mask))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

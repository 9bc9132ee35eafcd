use ndarray::{Array1, Array2};
use plotly::color::NamedColor;
use plotly::common::Mode;
use plotly::layout::{Annotation, Axis, Layout, Shape, ShapeLine, ShapeType};
use plotly::{Plot, Scatter};
use polars::prelude::*;
use tracing::info;

use crate::analysis::projection::synth_series;

/// End of the matching (pre-treatment) period; weights are fitted on the
/// years up to and including this one.
const MATCHING_END_YEAR: i64 = 1960;

/// Evolution of observed GDP per capita vs. the synthetic estimates from
/// the nested optimizer, Becker & Klößner and Pinotti weights.
///
/// Returns the assembled plot; the caller decides where it is rendered.
pub fn trend_comparison_plot(
    w_nested: &Array1<f64>,
    w_becker: &Array1<f64>,
    w_pinotti: &Array1<f64>,
    y_control: &Array2<f64>,
    y_treat: &Array1<f64>,
    years: &[i64],
) -> PolarsResult<Plot> {
    if years.len() != y_control.ncols() || years.len() != y_treat.len() {
        return Err(PolarsError::ShapeMismatch(
            format!(
                "year axis has {} entries but the GDP series have {} periods",
                years.len(),
                y_control.ncols()
            )
            .into(),
        ));
    }

    let y_synth_nested = synth_series(w_nested, y_control)?;
    let y_synth_becker = synth_series(w_becker, y_control)?;
    let y_synth_pinotti = synth_series(w_pinotti, y_control)?;

    let x: Vec<i64> = years.to_vec();
    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(x.clone(), y_synth_nested.to_vec())
            .mode(Mode::Lines)
            .name("Nested Optimizer"),
    );
    plot.add_trace(
        Scatter::new(x.clone(), y_synth_becker.to_vec())
            .mode(Mode::Lines)
            .name("Becker and Klößner"),
    );
    plot.add_trace(
        Scatter::new(x.clone(), y_synth_pinotti.to_vec())
            .mode(Mode::Lines)
            .name("Pinotti"),
    );
    plot.add_trace(
        Scatter::new(x, y_treat.to_vec())
            .mode(Mode::Lines)
            .name("Treated unit"),
    );

    // Vertical marker where the matching period ends
    let cutoff = Shape::new()
        .shape_type(ShapeType::Line)
        .x0(MATCHING_END_YEAR)
        .y0(0.0)
        .x1(MATCHING_END_YEAR)
        .y1(11000.0)
        .line(ShapeLine::new().color(NamedColor::Black).width(1.0));

    let note = Annotation::new()
        .x(MATCHING_END_YEAR)
        .y(12000.0)
        .text("End of Matching<br>Period")
        .show_arrow(false);

    plot.set_layout(
        Layout::new()
            .x_axis(Axis::new().title("Time"))
            .y_axis(Axis::new().title("GDP per Capita"))
            .shapes(vec![cutoff])
            .annotations(vec![note]),
    );

    info!("Assembled GDP trend comparison ({} periods)", y_treat.len());
    Ok(plot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn builds_with_consistent_shapes() {
        let panel = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let w = Array1::from_vec(vec![0.5, 0.5]);
        let treated = Array1::from_vec(vec![2.0, 3.0]);
        let plot = trend_comparison_plot(&w, &w, &w, &panel, &treated, &[1951, 1952]);
        assert!(plot.is_ok());
    }

    #[test]
    fn rejects_short_year_axis() {
        let panel = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let w = Array1::from_vec(vec![0.5, 0.5]);
        let treated = Array1::from_vec(vec![2.0, 3.0]);
        let res = trend_comparison_plot(&w, &w, &w, &panel, &treated, &[1951]);
        assert!(matches!(res, Err(PolarsError::ShapeMismatch(_))));
    }
}

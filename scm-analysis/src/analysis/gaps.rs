use ndarray::Array1;
use plotters::prelude::*;
use polars::df;
use polars::prelude::*;
use tracing::info;

use crate::analysis::projection::synth_series;
use crate::data_handling::pinotti::RegionPanels;
use crate::helper_functions::{colour_for_series, column_f64};
use crate::models::polars_err;

const GDP_GAP_LIMIT: f64 = 20.0;
const MURDER_GAP_LIMIT: f64 = 4.5;
/// Years of the mafia outbreak highlighted on the chart.
const OUTBREAK_SPAN: (f64, f64) = (1975.0, 1980.0);

/// Deviation of the treated outcome from its synthetic control, in percent
/// of the synthetic value.
pub fn percentage_gap(treated: &Array1<f64>, synth: &Array1<f64>) -> Array1<f64> {
    (treated - synth) / synth * 100.0
}

/// Absolute deviation of the treated outcome from its synthetic control.
pub fn absolute_gap(treated: &Array1<f64>, synth: &Array1<f64>) -> Array1<f64> {
    treated - synth
}

/// One gap table per optimization regime: a `year` column plus the murder
/// and GDP gap series.
pub fn gap_table(
    years: &[i64],
    murder_gap: &Array1<f64>,
    gdp_gap: &Array1<f64>,
) -> PolarsResult<DataFrame> {
    df![
        "year" => years.to_vec(),
        "Murder Gap" => murder_gap.to_vec(),
        "GDP Gap" => gdp_gap.to_vec()
    ]
}

/// Local vs. global optimum: evolution of the gaps between observed and
/// synthetic estimates for GDP per capita (percent, bars, left axis) and
/// murder rate (absolute, lines, right axis).
///
/// Renders the dual-axis chart to `output_path` and returns the
/// local-optimum gap table; the global table feeds the chart only.
pub fn gap_analysis_report(
    w_nested: &Array1<f64>,
    w_global: &Array1<f64>,
    panels: &RegionPanels,
    output_path: &str,
) -> PolarsResult<DataFrame> {
    let synth_gdp_local = synth_series(w_nested, &panels.y_control)?;
    let synth_gdp_global = synth_series(w_global, &panels.y_control)?;
    let synth_murd_local = synth_series(w_nested, &panels.murd_control)?;
    let synth_murd_global = synth_series(w_global, &panels.murd_control)?;

    let diff_gdp_local = percentage_gap(&panels.y_treat, &synth_gdp_local);
    let diff_gdp_global = percentage_gap(&panels.y_treat, &synth_gdp_global);
    let diff_murder_local = absolute_gap(&panels.murd_treat, &synth_murd_local);
    let diff_murder_global = absolute_gap(&panels.murd_treat, &synth_murd_global);

    let diff_data_local = gap_table(&panels.years, &diff_murder_local, &diff_gdp_local)?;
    let diff_data_global = gap_table(&panels.years, &diff_murder_global, &diff_gdp_global)?;

    draw_gap_chart(output_path, &panels.years, &diff_data_local, &diff_data_global)?;
    info!("Gap analysis chart saved to: {}", output_path);

    Ok(diff_data_local)
}

fn draw_gap_chart(
    output_path: &str,
    years: &[i64],
    local: &DataFrame,
    global: &DataFrame,
) -> PolarsResult<()> {
    let gdp_local = column_f64(local, "GDP Gap")?;
    let gdp_global = column_f64(global, "GDP Gap")?;
    let murd_local = column_f64(local, "Murder Gap")?;
    let murd_global = column_f64(global, "Murder Gap")?;

    let caption_font = ("sans-serif bold", 26);
    let axis_font = ("sans-serif", 22);
    let label_font = ("sans-serif bold", 18);

    let (first, last) = match (years.first(), years.last()) {
        (Some(&a), Some(&b)) => (a as f64, b as f64),
        _ => {
            return Err(PolarsError::ComputeError(
                "cannot draw a gap chart for an empty year axis".into(),
            ))
        }
    };
    let (x_lo, x_hi) = (first - 1.0, last + 1.0);

    let root = BitMapBackend::new(output_path, (900, 650)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| polars_err(Box::new(e)))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("GDP and Murder Gaps for Local and Global Optimum", caption_font)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, -GDP_GAP_LIMIT..GDP_GAP_LIMIT)
        .map_err(|e| polars_err(Box::new(e)))?
        .set_secondary_coord(x_lo..x_hi, -MURDER_GAP_LIMIT..MURDER_GAP_LIMIT);

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("GDP per capita, % Gap")
        .axis_desc_style(axis_font)
        .label_style(label_font)
        .draw()
        .map_err(|e| polars_err(Box::new(e)))?;

    chart
        .configure_secondary_axes()
        .y_desc("Murder Rate, Difference")
        .axis_desc_style(axis_font)
        .label_style(label_font)
        .draw()
        .map_err(|e| polars_err(Box::new(e)))?;

    // Outbreak span goes down first so every series draws on top of it
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [
                (OUTBREAK_SPAN.0, -GDP_GAP_LIMIT),
                (OUTBREAK_SPAN.1, GDP_GAP_LIMIT),
            ],
            YELLOW.mix(0.5).filled(),
        )))
        .map_err(|e| polars_err(Box::new(e)))?
        .label("Mafia Outbreak")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 25, y + 6)], YELLOW.mix(0.5).filled()));

    // GDP gap bars, local first, global overlaid as in the reference figure
    for (name, series) in [
        ("GDP per capita (Local)", &gdp_local),
        ("GDP per capita (Global)", &gdp_global),
    ] {
        let colour = colour_for_series(name);
        chart
            .draw_series(years.iter().zip(series.iter()).map(|(&yr, &g)| {
                Rectangle::new(
                    [(yr as f64 - 0.25, 0.0), (yr as f64 + 0.25, g)],
                    colour.filled(),
                )
            }))
            .map_err(|e| polars_err(Box::new(e)))?
            .label(name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 25, y + 6)], colour.filled()));
    }

    // Zero line on each axis
    chart
        .draw_series(LineSeries::new(
            vec![(x_lo, 0.0), (x_hi, 0.0)],
            BLACK.stroke_width(1),
        ))
        .map_err(|e| polars_err(Box::new(e)))?;
    chart
        .draw_secondary_series(LineSeries::new(
            vec![(x_lo, 0.0), (x_hi, 0.0)],
            BLACK.stroke_width(1),
        ))
        .map_err(|e| polars_err(Box::new(e)))?;

    // Murder gaps on the secondary axis
    for (name, series) in [
        ("Murders (Local)", &murd_local),
        ("Murders (Global)", &murd_global),
    ] {
        let colour = colour_for_series(name);
        chart
            .draw_secondary_series(LineSeries::new(
                years.iter().zip(series.iter()).map(|(&yr, &g)| (yr as f64, g)),
                colour.stroke_width(3),
            ))
            .map_err(|e| polars_err(Box::new(e)))?
            .label(name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 25, y)], colour.stroke_width(3))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(label_font)
        .legend_area_size(25)
        .position(SeriesLabelPosition::LowerMiddle)
        .draw()
        .map_err(|e| polars_err(Box::new(e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn percentage_gap_matches_hand_computation() {
        let treated = Array1::from_vec(vec![100.0]);
        let synth = Array1::from_vec(vec![80.0]);
        let gap = percentage_gap(&treated, &synth);
        assert_eq!(gap[0], 25.0);
    }

    #[test]
    fn absolute_gap_matches_hand_computation() {
        let treated = Array1::from_vec(vec![5.0]);
        let synth = Array1::from_vec(vec![3.0]);
        assert_eq!(absolute_gap(&treated, &synth)[0], 2.0);
    }

    #[test]
    fn gap_table_is_indexed_by_year() {
        let years = vec![1951i64, 1952, 1953];
        let murder = Array1::from_vec(vec![0.1, -0.2, 0.3]);
        let gdp = Array1::from_vec(vec![1.0, 2.0, -3.0]);
        let table = gap_table(&years, &murder, &gdp).unwrap();
        assert_eq!(table.height(), 3);
        let names: Vec<&str> = table.get_column_names_str();
        assert_eq!(names, vec!["year", "Murder Gap", "GDP Gap"]);
    }

    #[test]
    fn gap_table_rejects_length_mismatch() {
        let years = vec![1951i64, 1952];
        let murder = Array1::from_vec(vec![0.1, -0.2, 0.3]);
        let gdp = Array1::from_vec(vec![1.0, 2.0, -3.0]);
        assert!(gap_table(&years, &murder, &gdp).is_err());
    }

    #[test]
    fn report_renders_and_returns_local_table() {
        let panels = RegionPanels {
            years: vec![1951, 1952, 1953],
            y_control: arr2(&[[100.0, 110.0, 120.0], [80.0, 90.0, 100.0]]),
            y_treat: Array1::from_vec(vec![95.0, 105.0, 115.0]),
            murd_control: arr2(&[[1.0, 2.0, 3.0], [2.0, 3.0, 4.0]]),
            murd_treat: Array1::from_vec(vec![1.5, 2.5, 4.0]),
        };
        let w_nested = Array1::from_vec(vec![0.5, 0.5]);
        let w_global = Array1::from_vec(vec![0.4, 0.6]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gaps.png");
        let table =
            gap_analysis_report(&w_nested, &w_global, &panels, path.to_str().unwrap()).unwrap();

        assert!(path.exists());
        assert_eq!(table.height(), 3);
        let gdp = table.column("GDP Gap").unwrap().f64().unwrap();
        // treated 95 vs synthetic 90 in 1951
        assert!((gdp.get(0).unwrap() - (5.0 / 90.0 * 100.0)).abs() < 1e-9);
    }
}

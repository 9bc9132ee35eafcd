use std::fs::create_dir_all;

use polars::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::analysis::gaps::gap_analysis_report;
use crate::analysis::matching_table::matching_period_table;
use crate::analysis::trends::trend_comparison_plot;
use crate::data_handling::pinotti::{predictor_matrices, PinottiDataset, RegionPanels};
use crate::data_handling::weights::WeightSet;
use crate::helper_functions::{dataframe_to_csv, project_root};
use crate::models::{polars_err, Dataset};

mod analysis;
mod data_handling;
mod helper_functions;
mod models;

const STUDY_NAME: &str = "Apulia and Basilicata";

/// Region codes of the long panel: 21 is the aggregated treated unit, the
/// controls are the remaining regions outside the treated south.
const TREATED_REGION: i64 = 21;
const CONTROL_REGIONS: [i64; 15] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 20];

/// Pre-treatment years the weights were fitted on.
const MATCHING_YEARS: (i64, i64) = (1951, 1960);

/// Predictor columns of the matching table, by name.
const PREDICTOR_COLUMNS: [&str; 8] = [
    "gdppercap", "invrate", "shvain", "shvaag", "shvams", "shvanms", "shskill", "density",
];

fn main() -> PolarsResult<()> {
    // Setup logging and project configuration
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting synthetic control analysis for {}", STUDY_NAME);

    let root = project_root();
    let path = |rel: &str| root.join(rel).to_string_lossy().into_owned();

    create_dir_all(root.join("figures")).map_err(|e| polars_err(Box::new(e)))?;
    create_dir_all(root.join("results")).map_err(|e| polars_err(Box::new(e)))?;

    // Load the long regional panel and the precomputed weight vectors
    let data = PinottiDataset {
        path: path("data/pinotti.csv"),
    }
    .load()?;
    let weights = WeightSet::from_json(&path("data/weights.json"))?;

    let panels = RegionPanels::build(&data, TREATED_REGION, &CONTROL_REGIONS)?;
    let (x0, x1) = predictor_matrices(
        &data,
        &PREDICTOR_COLUMNS,
        TREATED_REGION,
        &CONTROL_REGIONS,
        MATCHING_YEARS,
    )?;

    // Observed GDP per capita vs. the synthetic estimates
    let trend_plot = trend_comparison_plot(
        &weights.nested_arr(),
        &weights.becker_arr(),
        &weights.pinotti_arr(),
        &panels.y_control,
        &panels.y_treat,
        &panels.years,
    )?;
    let trend_path = path("figures/gdp_trends.html");
    trend_plot.write_html(&trend_path);
    info!("Trend comparison saved to: {}", trend_path);

    // Matching-period characteristics table
    let mut table = matching_period_table(
        &weights,
        &x0,
        &x1,
        &data,
        &PREDICTOR_COLUMNS,
        &CONTROL_REGIONS,
        MATCHING_YEARS,
        STUDY_NAME,
    )?;
    dataframe_to_csv(&mut table, &path("results/matching_period_table.csv"))?;

    // Local vs. global optimum gap analysis
    let mut gap_local = gap_analysis_report(
        &weights.nested_arr(),
        &weights.global_arr(),
        &panels,
        &path("figures/gap_analysis.png"),
    )?;
    dataframe_to_csv(&mut gap_local, &path("results/gap_local.csv"))?;

    info!("Analysis complete");
    Ok(())
}

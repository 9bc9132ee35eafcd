use std::env;
use std::path::PathBuf;

use polars::prelude::*;
use tracing::info;

use crate::models::polars_err;

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

pub fn read_csv(file_path: &str) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()
}

pub fn dataframe_to_csv(df: &mut DataFrame, path: &str) -> PolarsResult<()> {
    let mut file = std::fs::File::create(path).map_err(|e| polars_err(Box::new(e)))?;
    CsvWriter::new(&mut file).finish(df)?;
    info!("Table saved to: {}", path);
    Ok(())
}

/// Round to 2 decimal places, the display precision used by every table.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Extract a column as `Vec<f64>`, casting integer columns on the way.
/// Missing values are an error here; letting them slip through would shift
/// every downstream reshape and mean.
pub fn column_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    let series = df.column(name)?;
    if series.null_count() > 0 {
        return Err(PolarsError::ComputeError(
            format!(
                "column '{}' has {} missing values",
                name,
                series.null_count()
            )
            .into(),
        ));
    }
    match series.f64() {
        Ok(ca) => Ok(ca.into_no_null_iter().collect()),
        Err(_) => {
            info!("Casting column '{}' to f64", name);
            Ok(series
                .cast(&DataType::Float64)?
                .f64()?
                .into_no_null_iter()
                .collect())
        }
    }
}

/// The distinct years of the long panel, in first-seen order.
pub fn distinct_years(df: &DataFrame) -> PolarsResult<Vec<i64>> {
    let year_col = df.column("year")?.i64()?;
    let mut years: Vec<i64> = Vec::new();
    for y in year_col.into_no_null_iter() {
        if !years.contains(&y) {
            years.push(y);
        }
    }
    Ok(years)
}

// ---------- fixed colour map ----------
use plotters::style::RGBColor;
pub fn colour_for_series(series: &str) -> RGBColor {
    match series {
        "GDP per capita (Local)"  => RGBColor( 31, 119, 180),
        "GDP per capita (Global)" => RGBColor(255, 140,   0),
        "Murders (Local)"         => RGBColor(  0,   0,   0),
        "Murders (Global)"        => RGBColor(130, 130, 130),
        _ => RGBColor(0, 0, 0), // fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn round2_truncates_display_noise() {
        assert_eq!(round2(2395.001), 2395.0);
        assert_eq!(round2(0.325), 0.33);
        assert_eq!(round2(134.784), 134.78);
    }

    #[test]
    fn distinct_years_first_seen_order() {
        let df = df![
            "year" => &[1951i64, 1952, 1951, 1952],
            "gdppercap" => &[1.0, 2.0, 3.0, 4.0]
        ]
        .unwrap();
        assert_eq!(distinct_years(&df).unwrap(), vec![1951, 1952]);
    }

    #[test]
    fn column_f64_casts_integers() {
        let df = df!["murd" => &[1i64, 2, 3]].unwrap();
        assert_eq!(column_f64(&df, "murd").unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn column_f64_rejects_missing_values() {
        let df = df!["murd" => &[Some(1.0), None, Some(3.0)]].unwrap();
        let res = column_f64(&df, "murd");
        assert!(matches!(res, Err(PolarsError::ComputeError(_))));
    }
}

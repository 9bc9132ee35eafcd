use std::fs::File;

use ndarray::Array1;
use polars::prelude::*;
use tracing::info;

use crate::models::polars_err;

/// The four precomputed weight vectors under comparison, one entry per
/// control region, in the same region order as every control panel.
///
/// The optimizers that produce these live outside this crate; we only
/// consume their output.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WeightSet {
    pub nested: Vec<f64>,
    pub global: Vec<f64>,
    pub becker: Vec<f64>,
    pub pinotti: Vec<f64>,
}

impl WeightSet {
    pub fn from_json(path: &str) -> PolarsResult<Self> {
        let file = File::open(path).map_err(|e| polars_err(Box::new(e)))?;
        let set: WeightSet =
            serde_json::from_reader(file).map_err(|e| polars_err(Box::new(e)))?;
        info!(
            "Loaded weight vectors from {} ({} control units)",
            path,
            set.nested.len()
        );
        Ok(set)
    }

    pub fn nested_arr(&self) -> Array1<f64> {
        Array1::from_vec(self.nested.clone())
    }

    pub fn global_arr(&self) -> Array1<f64> {
        Array1::from_vec(self.global.clone())
    }

    pub fn becker_arr(&self) -> Array1<f64> {
        Array1::from_vec(self.becker.clone())
    }

    pub fn pinotti_arr(&self) -> Array1<f64> {
        Array1::from_vec(self.pinotti.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_json_roundtrip() {
        let set = WeightSet {
            nested: vec![0.5, 0.5],
            global: vec![0.4, 0.6],
            becker: vec![1.0, 0.0],
            pinotti: vec![0.0, 1.0],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let mut file = File::create(&path).unwrap();
        write!(file, "{}", serde_json::to_string_pretty(&set).unwrap()).unwrap();

        let loaded = WeightSet::from_json(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.nested, set.nested);
        assert_eq!(loaded.pinotti_arr().len(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(WeightSet::from_json("./no_such_weights.json").is_err());
    }
}

use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Project a weight vector onto a (units x periods) control panel:
/// `s = w' M`, one synthetic observation per period.
///
/// Weights are used as given, no normalization. The only requirement is
/// that the vector has one entry per panel row.
pub fn synth_series(w: &Array1<f64>, panel: &Array2<f64>) -> PolarsResult<Array1<f64>> {
    if w.len() != panel.nrows() {
        return Err(PolarsError::ShapeMismatch(
            format!(
                "weight vector has {} entries but the control panel has {} units",
                w.len(),
                panel.nrows()
            )
            .into(),
        ));
    }
    Ok(w.dot(panel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn panel() -> Array2<f64> {
        arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])
    }

    #[test]
    fn projection_has_one_value_per_period() {
        let w = Array1::from_vec(vec![0.5, 0.5]);
        let s = synth_series(&w, &panel()).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.to_vec(), vec![2.5, 3.5, 4.5]);
    }

    #[test]
    fn projection_is_linear_in_weights() {
        let w = Array1::from_vec(vec![0.3, 0.7]);
        let s = synth_series(&w, &panel()).unwrap();
        let doubled = synth_series(&(&w * 2.0), &panel()).unwrap();
        for (a, b) in s.iter().zip(doubled.iter()) {
            assert!((2.0 * a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn one_hot_weight_selects_a_row() {
        let w = Array1::from_vec(vec![0.0, 1.0]);
        let s = synth_series(&w, &panel()).unwrap();
        assert_eq!(s.to_vec(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let w = Array1::from_vec(vec![0.2, 0.3, 0.5]);
        let err = synth_series(&w, &panel()).unwrap_err();
        assert!(matches!(err, PolarsError::ShapeMismatch(_)));
    }
}

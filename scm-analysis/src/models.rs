use std::error::Error;

use polars::prelude::*;

/// Wrap any boxed error into a `PolarsError` so plotting and IO failures
/// can travel through `PolarsResult` like everything else.
pub fn polars_err(e: Box<dyn Error>) -> PolarsError {
    PolarsError::ComputeError(format!("{}", e).into())
}

/// A source of the long-format regional panel.
pub trait Dataset {
    fn load(&self) -> PolarsResult<DataFrame>;
}

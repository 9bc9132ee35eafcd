pub mod pinotti;
pub mod weights;

pub mod gaps;
pub mod matching_table;
pub mod projection;
pub mod trends;

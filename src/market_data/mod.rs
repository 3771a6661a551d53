pub mod path_builder;
pub mod series;

// Re-export for convenient access (e.g. `use crate::market_data::Series`).
pub use path_builder::{path_to_series, PathBuilder, PathParams, PathPoint, SessionWindow};
pub use series::Series;

// =============================================================================
// Forecast Model Module
// =============================================================================

pub mod forecast;

pub use forecast::{CoefficientTable, ForecastModel};

pub mod interpolation;
pub mod orchestrator;
pub mod table;
pub mod timeseries;

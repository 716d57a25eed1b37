// Simulation time-series report
pub mod simulation;

// Sensitivity analysis report
pub mod sensitivity;

// Tabular view over reports and CSV exports
pub mod frame;

// Descriptive statistics
pub mod stats;

// Renderer-independent chart description
pub mod figure;

// Domain-specific error types
pub mod errors;

// Static figures for a single simulation run
pub mod simulation_plots;

// Static figures for sensitivity analyses
pub mod sensitivity_plots;

// Interactive HTML dashboards
pub mod interactive;

// Figure batches to image files
pub mod rendering;

// Console summaries and JSON export
pub mod reporting;

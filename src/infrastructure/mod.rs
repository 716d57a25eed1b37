pub mod loader;
pub mod observability;
pub mod plotly;
pub mod plotting;

pub use loader::{SensitivityData, SimulationData, load_sensitivity_data, load_simulation_data};
pub use plotting::{RenderSettings, render_figure};

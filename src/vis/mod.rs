//! Module providing visualization for simulated datasets
//!
//! High-quality plot output (violin + box + jitter panels via plotters)
//! lives in `plotters_ext`; `text` provides a dependency-free histogram
//! for quick terminal inspection.

pub mod plotters_ext;
pub mod text;

// Re-export public items
pub use plotters_ext::{plot_cells, OutputType, PlotSettings};
pub use text::render_histogram;

// 特定の警告を無効化
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod dataset;
pub mod design;
pub mod error;
pub mod io;
pub mod report;
pub mod sim;
pub mod stats;
#[cfg(feature = "visualization")]
pub mod vis;

// Re-export commonly used types
pub use dataset::{Observation, SimDataset};
pub use design::{CellSpec, DesignSpec, Factor, GroupSpec};
pub use error::{Error, Result};
pub use report::{run_scenario, ScenarioConfig, ScenarioReport, TestOutcome, TestPlan};
pub use sim::{sim_design, sim_from_data, SimOptions};
pub use stats::{
    AnovaResult, DescriptiveStats, RecoveryReport, RecoveryTolerance, TTestConfig, TTestResult,
    Tail,
};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

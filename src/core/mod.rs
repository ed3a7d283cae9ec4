// mod.rs - Core classification module

pub mod classify;
pub mod combination;
pub mod error;
pub mod one_switch;
pub mod read;
pub mod read_pair;
pub mod settings;

// Re-export main types for convenience
pub use classify::{Classification, Classifier, ReadOutcome};
pub use combination::{AlleleCombination, CombinationVerdict, IndicatorString, Mark, SwitchSummary, TurnoverRegion};
pub use error::{HybridError, HybridResult};
pub use one_switch::{OneSwitchData, OneSwitchReport, SwitchAlleleRow};
pub use read::{MismatchProfile, MismatchReport, Read, RelativePositions};
pub use read_pair::ReadPair;
pub use settings::PipelineConfig;

// lib.rs - hybrid_reads library root

//! # hybrid_reads - Detection of hybrid HLA reads in paired-end alignments
//!
//! Every read pair of a sample is aligned together with the sample's HLA
//! alleles. This library decides, per read pair, whether it is explained by a
//! single allele (non-hybrid), by no allele unambiguously (zero), or only by a
//! combination of two alleles with one or more switch points (hybrid).
//!
//! ## Features
//!
//! - **Quality control**: Length, N-count and base quality filters per mate
//! - **Artefact masking**: Columns where the read disagrees with every allele are ignored
//! - **Switch detection**: Indicator strings per allele pair with turnover regions
//! - **Parallel**: Read pairs are classified with rayon, output stays in input order
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use hybrid_reads::prelude::*;
//!
//! let parsed = parse_file("msa_output_S0001.txt")?;
//! let classifier = Classifier::new(parsed.allele_names.clone(), PipelineConfig::default())
//!     .map_err(|e| e.to_string())?;
//!
//! for block in &parsed.blocks {
//!     let outcome = classifier.classify_block(block).map_err(|e| e.to_string())?;
//!     println!("{}\t{}", outcome.name, outcome.classification.label());
//! }
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod output;
pub mod pipeline;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{Classification, Classifier, ReadOutcome};
    pub use crate::core::{HybridError, HybridResult, PipelineConfig};
    pub use crate::data::{parse_file, parse_input, AlignedSeq, ParsedInput, RawBlock, Symbol};
    pub use crate::output::{OutputPaths, OutputWriter, RunCounters};
    pub use crate::pipeline::{RunReport, RunSettings};
    pub use crate::VERSION;
}

// Re-export main types at the root level for convenience
pub use crate::cli::{Args, ValidationResult};
pub use crate::core::{Classification, Classifier, HybridError, PipelineConfig, ReadOutcome};
pub use crate::data::{AlignedSeq, ParsedInput, Symbol};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "hybrid_reads v{} - Hybrid read detection for HLA read pairs",
        VERSION
    )
}

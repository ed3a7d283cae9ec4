// settings.rs - Thresholds threaded through the classification pipeline

use serde::{Deserialize, Serialize};

/// Every tunable threshold of the pipeline, passed explicitly to each step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum raw length of each mate
    pub min_read_length: usize,
    /// Maximum number of N symbols allowed in each aligned mate
    pub max_n_count: usize,
    /// Bases with a quality score below this value are masked with N
    pub min_quality: u8,
    /// Minimum number of X and of Y marks for a combination to be informative
    pub min_indicative_snps: usize,
    /// A combination with more mutual mismatches than this is rejected
    pub max_mutual_snps: usize,
    /// A combination with more artefacts than this is rejected
    pub max_alternating_artefacts: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_read_length: 80,
            max_n_count: 5,
            min_quality: 18,
            min_indicative_snps: 2,
            max_mutual_snps: 2,
            max_alternating_artefacts: 2,
        }
    }
}

/// Highest score in the quality alphabet ('I')
pub const MAX_QUALITY_SCORE: u8 = 40;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_read_length, 80);
        assert_eq!(config.max_n_count, 5);
        assert_eq!(config.min_quality, 18);
        assert_eq!(config.min_indicative_snps, 2);
        assert_eq!(config.max_mutual_snps, 2);
        assert_eq!(config.max_alternating_artefacts, 2);
    }
}

// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub input: Option<String>,
    pub output_dir: Option<String>,
    pub tag: Option<String>,
    pub summary_json: Option<String>,

    // Read pair filter
    pub min_read_length: Option<usize>,
    pub max_n_count: Option<usize>,
    pub min_quality: Option<u8>,

    // Allele combination checks
    pub min_indicative_snps: Option<usize>,
    pub max_mutual_snps: Option<usize>,
    pub max_alternating_artefacts: Option<usize>,

    // Performance
    pub threads: Option<usize>,

    // Flags
    pub dry_run: Option<bool>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# hybrid_reads.toml - Configuration file for hybrid_reads
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Alignment dump with read pairs aligned against the sample's alleles
input = "/path/to/msa_output_S0001.txt"

# Directory for the five result files
output_dir = "results"

# Tag used in result file names (omit to derive it from the input file name)
# tag = "S0001"

# JSON summary of the run
# summary_json = "results/summary_S0001.json"

# =============================================================================
# READ PAIR FILTER
# =============================================================================

# Minimum raw length of each mate
min_read_length = 80

# Maximum number of N bases in each aligned mate
max_n_count = 5

# Bases with a quality score below this value are masked with N (0-40)
min_quality = 18

# =============================================================================
# ALLELE COMBINATION CHECKS
# =============================================================================

# Minimum number of X and of Y marks in an indicator string
min_indicative_snps = 2

# Maximum number of mutual mismatches (M marks)
max_mutual_snps = 2

# Maximum number of alternating XYX / YXY artefacts
max_alternating_artefacts = 2

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
# threads = 8

# =============================================================================
# FLAGS
# =============================================================================

# Validate inputs without classification (dry run)
dry_run = false

# Hide the progress bar
quiet = false

# Print per read pair diagnostics
verbose = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::generate_sample()).unwrap();
        assert_eq!(config.min_read_length, Some(80));
        assert_eq!(config.min_quality, Some(18));
        assert_eq!(config.output_dir.as_deref(), Some("results"));
        assert!(config.tag.is_none());
        assert!(config.threads.is_none());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        let config = Config {
            max_mutual_snps: Some(1),
            tag: Some("S0002".to_string()),
            ..Config::new()
        };
        config.to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.max_mutual_snps, Some(1));
        assert_eq!(loaded.tag.as_deref(), Some("S0002"));
    }
}

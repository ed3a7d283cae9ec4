// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};
use crate::core::PipelineConfig;

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        let defaults = PipelineConfig::default();

        // Input/Output
        if self.input.is_none() {
            self.input = config.input;
        }
        if self.output_dir == "." {
            if let Some(output_dir) = config.output_dir {
                self.output_dir = output_dir;
            }
        }
        if self.tag.is_none() {
            self.tag = config.tag;
        }
        if self.summary_json.is_none() {
            self.summary_json = config.summary_json;
        }

        // Thresholds (only override defaults, not explicit CLI values)
        if self.min_read_length == defaults.min_read_length {
            if let Some(value) = config.min_read_length {
                self.min_read_length = value;
            }
        }
        if self.max_n_count == defaults.max_n_count {
            if let Some(value) = config.max_n_count {
                self.max_n_count = value;
            }
        }
        if self.min_quality == defaults.min_quality {
            if let Some(value) = config.min_quality {
                self.min_quality = value;
            }
        }
        if self.min_indicative_snps == defaults.min_indicative_snps {
            if let Some(value) = config.min_indicative_snps {
                self.min_indicative_snps = value;
            }
        }
        if self.max_mutual_snps == defaults.max_mutual_snps {
            if let Some(value) = config.max_mutual_snps {
                self.max_mutual_snps = value;
            }
        }
        if self.max_alternating_artefacts == defaults.max_alternating_artefacts {
            if let Some(value) = config.max_alternating_artefacts {
                self.max_alternating_artefacts = value;
            }
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }
        if !self.quiet && config.quiet.unwrap_or(false) {
            self.quiet = true;
        }
        if !self.verbose && config.verbose.unwrap_or(false) {
            self.verbose = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    #[test]
    fn test_cli_values_win_over_config() {
        let args = Args::from_args(&["hybrid_reads"], &["--min-quality", "25", "cli.txt"]).unwrap();
        let config = Config {
            input: Some("config.txt".to_string()),
            min_quality: Some(30),
            max_n_count: Some(3),
            output_dir: Some("out".to_string()),
            verbose: Some(true),
            ..Config::new()
        };
        let merged = args.merge_with_config(config);
        assert_eq!(merged.input.as_deref(), Some("cli.txt"));
        assert_eq!(merged.min_quality, 25);
        assert_eq!(merged.max_n_count, 3);
        assert_eq!(merged.output_dir, "out");
        assert!(merged.verbose);
    }

    #[test]
    fn test_config_fills_missing_input() {
        let args = Args::from_args(&["hybrid_reads"], &[]).unwrap();
        let config = Config {
            input: Some("config.txt".to_string()),
            ..Config::new()
        };
        let merged = args.merge_with_config(config);
        assert_eq!(merged.input.as_deref(), Some("config.txt"));
        assert_eq!(merged.pipeline_config(), PipelineConfig::default());
    }
}

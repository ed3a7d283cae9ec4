// args.rs - Command line arguments definition

use argh::FromArgs;

use crate::core::PipelineConfig;

#[derive(FromArgs)]
/// hybrid_reads - Classify aligned HLA read pairs into non-hybrid, ambiguous and hybrid reads
pub struct Args {
    /// alignment dump with read pairs aligned against the sample's alleles
    #[argh(positional)]
    pub input: Option<String>,

    /// directory for the result files (default: .)
    #[argh(option, default = "String::from(\".\")")]
    pub output_dir: String,

    /// tag used in result file names (default: derived from the input file name)
    #[argh(option)]
    pub tag: Option<String>,

    /// minimum raw length of each mate (default: 80)
    #[argh(option, default = "80")]
    pub min_read_length: usize,

    /// maximum number of N bases in each aligned mate (default: 5)
    #[argh(option, default = "5")]
    pub max_n_count: usize,

    /// bases with a quality score below this value are masked (0-40, default: 18)
    #[argh(option, default = "18")]
    pub min_quality: u8,

    /// minimum number of indicative mismatches per allele of a combination (default: 2)
    #[argh(option, default = "2")]
    pub min_indicative_snps: usize,

    /// maximum number of mutual mismatches per combination (default: 2)
    #[argh(option, default = "2")]
    pub max_mutual_snps: usize,

    /// maximum number of alternating mismatch artefacts per combination (default: 2)
    #[argh(option, default = "2")]
    pub max_alternating_artefacts: usize,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// write a JSON summary of the run to this file
    #[argh(option)]
    pub summary_json: Option<String>,

    /// validate inputs without classification (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// hide the progress bar
    #[argh(switch)]
    pub quiet: bool,

    /// print per read pair diagnostics
    #[argh(switch)]
    pub verbose: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}

impl Args {
    /// Thresholds selected on the command line
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            min_read_length: self.min_read_length,
            max_n_count: self.max_n_count,
            min_quality: self.min_quality,
            min_indicative_snps: self.min_indicative_snps,
            max_mutual_snps: self.max_mutual_snps,
            max_alternating_artefacts: self.max_alternating_artefacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, argh::EarlyExit> {
        Args::from_args(&["hybrid_reads"], args)
    }

    #[test]
    fn test_defaults_match_pipeline_defaults() {
        let args = parse(&["input.txt"]).unwrap();
        assert_eq!(args.input.as_deref(), Some("input.txt"));
        assert_eq!(args.output_dir, ".");
        assert_eq!(args.pipeline_config(), PipelineConfig::default());
    }

    #[test]
    fn test_threshold_options() {
        let args = parse(&["--min-read-length", "50", "--min-quality", "20", "in.txt"]).unwrap();
        let config = args.pipeline_config();
        assert_eq!(config.min_read_length, 50);
        assert_eq!(config.min_quality, 20);
        assert_eq!(config.max_n_count, 5);
    }
}

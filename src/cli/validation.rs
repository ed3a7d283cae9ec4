// validation.rs - Input validation utilities

use std::path::{Path, PathBuf};

use crate::cli::args::Args;
use crate::core::settings::MAX_QUALITY_SCORE;
use crate::core::PipelineConfig;
use crate::output::derive_tag;

pub struct ValidationResult {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub tag: String,
    pub config: PipelineConfig,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    let input = args
        .input
        .as_deref()
        .ok_or_else(|| "No input file given (positional argument or `input` in --config)".to_string())?;
    let input = PathBuf::from(input);
    if !input.is_file() {
        return Err(format!("Input file does not exist: {}", input.display()));
    }

    // Validate thresholds
    if args.min_quality > MAX_QUALITY_SCORE {
        return Err(format!(
            "--min-quality must be between 0 and {}, got {}",
            MAX_QUALITY_SCORE, args.min_quality
        ));
    }
    if args.min_indicative_snps == 0 {
        return Err("--min-indicative-snps must be at least 1".to_string());
    }

    // Validate threads
    if let Some(threads) = args.threads {
        if threads == 0 {
            return Err("--threads must be at least 1".to_string());
        }
    }

    let tag = match &args.tag {
        Some(tag) if tag.trim().is_empty() => {
            return Err("--tag must not be empty".to_string());
        }
        Some(tag) => tag.clone(),
        None => derive_tag(&input),
    };

    let output_dir = PathBuf::from(&args.output_dir);
    if output_dir.is_file() {
        return Err(format!("Output directory is a file: {}", output_dir.display()));
    }

    if let Some(summary) = &args.summary_json {
        check_parent_exists(Path::new(summary))?;
    }

    Ok(ValidationResult {
        input,
        output_dir,
        tag,
        config: args.pipeline_config(),
    })
}

fn check_parent_exists(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(format!("Path does not exist: {}", parent.display()));
        }
    }
    Ok(())
}

// pipeline.rs - Run driver: parse, classify in parallel, write results

use std::path::PathBuf;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;

use crate::core::{Classifier, HybridResult, PipelineConfig, ReadOutcome};
use crate::data::{parse_file, RawBlock};
use crate::output::{OutputPaths, OutputWriter, RunCounters};

/// Everything one run needs, already validated
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub tag: String,
    pub config: PipelineConfig,
    pub dry_run: bool,
    pub show_progress: bool,
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub read_pairs: usize,
    pub allele_names: Vec<String>,
    pub combinations: usize,
    pub outputs: Option<OutputPaths>,
    pub counters: RunCounters,
    pub elapsed_secs: f64,
}

/// Classify every block in parallel; results come back in input order
pub fn classify_blocks(
    classifier: &Classifier,
    blocks: &[RawBlock],
    show_progress: bool,
) -> Result<Vec<ReadOutcome>, String> {
    let pb = if show_progress {
        ProgressBar::new(blocks.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .map_err(|e| format!("Invalid progress bar template: {}", e))?
        .progress_chars("#>-"),
    );

    let outcomes = blocks
        .par_iter()
        .map(|block| {
            let outcome = classifier.classify_block(block);
            pb.inc(1);
            outcome
        })
        .collect::<HybridResult<Vec<_>>>()
        .map_err(|e| {
            pb.abandon();
            format!("Classification aborted: {}", e)
        })?;

    pb.finish_with_message("classified");
    Ok(outcomes)
}

/// Run the whole pipeline for one input file
pub fn run(settings: &RunSettings) -> Result<RunReport, String> {
    let start = Instant::now();

    let parsed = parse_file(&settings.input)?;
    println!(
        "📊 Parsed {} read pairs aligned against {} alleles: {}",
        parsed.blocks.len(),
        parsed.allele_names.len(),
        parsed.allele_names.join(", ")
    );

    let classifier = Classifier::new(parsed.allele_names.clone(), settings.config.clone())
        .map_err(|e| format!("Invalid allele set: {}", e))?;
    println!("🧬 Allele combinations: {}", classifier.combinations().len());

    let mut report = RunReport {
        read_pairs: parsed.blocks.len(),
        allele_names: parsed.allele_names.clone(),
        combinations: classifier.combinations().len(),
        outputs: None,
        counters: RunCounters::default(),
        elapsed_secs: 0.0,
    };

    if settings.dry_run {
        report.elapsed_secs = start.elapsed().as_secs_f64();
        return Ok(report);
    }

    let outcomes = classify_blocks(&classifier, &parsed.blocks, settings.show_progress)?;
    info!(
        "Classified {} read pairs in {:.2}s",
        outcomes.len(),
        start.elapsed().as_secs_f64()
    );

    let mut writer = OutputWriter::create(&settings.output_dir, &settings.tag)?;
    for outcome in &outcomes {
        writer.write_outcome(outcome)?;
    }
    let (paths, counters) = writer.finish()?;

    report.outputs = Some(paths);
    report.counters = counters;
    report.elapsed_secs = start.elapsed().as_secs_f64();
    Ok(report)
}

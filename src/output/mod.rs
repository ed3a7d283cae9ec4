// mod.rs - Result files and run counters

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Writer, WriterBuilder};
use serde::Serialize;

use crate::core::{Classification, PipelineConfig, ReadOutcome};

/// Written when a turnover region holds no nucleotides
const EMPTY_TURNOVER: &str = "-";

const NON_HYBRID_HEADER: &[&str] = &["Read name", "Allele match", "Note"];
const ZERO_HEADER: &[&str] = &["Read name", "Note"];
const MORE_SWITCHES_HEADER: &[&str] = &["Read name"];
const ONE_SWITCH_HEADER: &[&str] = &[
    "Read name",
    "Allele match",
    "Read1 pos",
    "Read2 pos",
    "Read1 mis",
    "Read2 mis",
    "Read con mis",
    "Artefacts",
    "Turnover region pos",
    "Turnover sequence",
];

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &Path) -> Result<(), String> {
    if let Some(parent) = file_path.parent() {
        create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
    }
    Ok(())
}

/// Output tag from the input file name: the five characters in front of a
/// four-character extension, or the file stem for shorter names.
pub fn derive_tag(input: &Path) -> String {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let chars: Vec<char> = name.chars().collect();
    if chars.len() >= 9 {
        return chars[chars.len() - 9..chars.len() - 4].iter().collect();
    }
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("run")
        .to_string()
}

/// Per-category counts for the whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub incorrectly_aligned: usize,
    pub rejected: usize,
    pub malformed: usize,
    pub non_hybrid: usize,
    pub hybrid_more_switches: usize,
    pub hybrid_one_switch: usize,
    pub zero: usize,
    pub total: usize,
}

impl RunCounters {
    pub fn record(&mut self, classification: &Classification) {
        self.total += 1;
        match classification {
            Classification::NonHybrid { .. } => self.non_hybrid += 1,
            Classification::Zero { .. } => self.zero += 1,
            Classification::OneSwitch(_) => self.hybrid_one_switch += 1,
            Classification::MoreSwitches => self.hybrid_more_switches += 1,
            Classification::Rejected => self.rejected += 1,
            Classification::IncorrectlyAligned => self.incorrectly_aligned += 1,
            Classification::Malformed(_) => self.malformed += 1,
        }
    }

    /// Metadata rows in file order
    pub fn rows(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("Incorrectly aligned reads", self.incorrectly_aligned),
            ("Rejected reads", self.rejected),
            ("Malformed read pairs", self.malformed),
            ("Non-hybrid reads", self.non_hybrid),
            ("Hybrid reads more switches", self.hybrid_more_switches),
            ("Hybrid reads 1 switch", self.hybrid_one_switch),
            ("Zero reads", self.zero),
            ("Total reads", self.total),
        ]
    }
}

/// Paths of the five result files for one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub non_hybrid: PathBuf,
    pub zero: PathBuf,
    pub more_switches: PathBuf,
    pub one_switch: PathBuf,
    pub metadata: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: &Path, tag: &str) -> Self {
        Self {
            non_hybrid: dir.join(format!("non_hybrid_reads_{}.txt", tag)),
            zero: dir.join(format!("zero_reads_{}.txt", tag)),
            more_switches: dir.join(format!("hybrid_reads_more_switches_{}.txt", tag)),
            one_switch: dir.join(format!("hybrid_reads_1_switch_{}.txt", tag)),
            metadata: dir.join(format!("metadata_{}.txt", tag)),
        }
    }

    pub fn all(&self) -> [&PathBuf; 5] {
        [
            &self.non_hybrid,
            &self.zero,
            &self.more_switches,
            &self.one_switch,
            &self.metadata,
        ]
    }
}

type TsvWriter = Writer<BufWriter<File>>;

fn tsv_writer(path: &Path, header: &[&str]) -> Result<TsvWriter, String> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| format!("Failed to create output file '{}': {}", path.display(), e))?;
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .from_writer(BufWriter::new(file));
    writer
        .write_record(header)
        .map_err(|e| format!("Write error in '{}': {}", path.display(), e))?;
    Ok(writer)
}

/// Streams read outcomes into the category files, in the order they are given
pub struct OutputWriter {
    paths: OutputPaths,
    non_hybrid: TsvWriter,
    zero: TsvWriter,
    more_switches: TsvWriter,
    one_switch: TsvWriter,
    counters: RunCounters,
}

impl OutputWriter {
    pub fn create(dir: &Path, tag: &str) -> Result<Self, String> {
        let paths = OutputPaths::new(dir, tag);
        Ok(Self {
            non_hybrid: tsv_writer(&paths.non_hybrid, NON_HYBRID_HEADER)?,
            zero: tsv_writer(&paths.zero, ZERO_HEADER)?,
            more_switches: tsv_writer(&paths.more_switches, MORE_SWITCHES_HEADER)?,
            one_switch: tsv_writer(&paths.one_switch, ONE_SWITCH_HEADER)?,
            paths,
            counters: RunCounters::default(),
        })
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    pub fn write_outcome(&mut self, outcome: &ReadOutcome) -> Result<(), String> {
        self.counters.record(&outcome.classification);
        let name = outcome.name.as_str();

        let result = match &outcome.classification {
            Classification::NonHybrid { allele, note } => match note {
                Some(note) => self.non_hybrid.write_record([name, allele.as_str(), note.as_str()]),
                None => self.non_hybrid.write_record([name, allele.as_str()]),
            },
            Classification::Zero { note } => self.zero.write_record([name, note.as_str()]),
            Classification::MoreSwitches => self.more_switches.write_record([name]),
            Classification::OneSwitch(report) => report.rows.iter().try_for_each(|row| {
                let sequence = if row.turnover_sequence.is_empty() {
                    EMPTY_TURNOVER
                } else {
                    row.turnover_sequence.as_str()
                };
                let record = [
                    name.to_string(),
                    row.allele.clone(),
                    row.read1_position.clone(),
                    row.read2_position.clone(),
                    row.read1_mismatches.to_string(),
                    row.read2_mismatches.to_string(),
                    row.consensus_mismatches.to_string(),
                    row.artefacts.to_string(),
                    row.turnover_position.clone(),
                    sequence.to_string(),
                ];
                self.one_switch.write_record(&record)
            }),
            Classification::Rejected
            | Classification::IncorrectlyAligned
            | Classification::Malformed(_) => Ok(()),
        };
        result.map_err(|e| format!("Write error for read '{}': {}", name, e))
    }

    /// Flush every category file and write the metadata file
    pub fn finish(mut self) -> Result<(OutputPaths, RunCounters), String> {
        for writer in [
            &mut self.non_hybrid,
            &mut self.zero,
            &mut self.more_switches,
            &mut self.one_switch,
        ] {
            writer.flush().map_err(|e| format!("Flush error: {}", e))?;
        }

        let mut metadata = tsv_writer(&self.paths.metadata, &["Category", "Count"])?;
        for (category, count) in self.counters.rows() {
            metadata
                .write_record([category.to_string(), count.to_string()])
                .map_err(|e| format!("Write error in metadata: {}", e))?;
        }
        metadata.flush().map_err(|e| format!("Flush error: {}", e))?;

        Ok((self.paths, self.counters))
    }
}

/// Machine-readable summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub version: String,
    pub generated: DateTime<Utc>,
    pub input: String,
    pub tag: String,
    pub config: PipelineConfig,
    pub counters: RunCounters,
    pub outputs: Vec<String>,
}

impl RunSummary {
    pub fn new(input: &Path, tag: &str, config: &PipelineConfig, paths: &OutputPaths, counters: &RunCounters) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated: Utc::now(),
            input: input.display().to_string(),
            tag: tag.to_string(),
            config: config.clone(),
            counters: counters.clone(),
            outputs: paths.all().iter().map(|p| p.display().to_string()).collect(),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), String> {
        ensure_parent_dir(path)?;
        let file = File::create(path)
            .map_err(|e| format!("Failed to create summary file '{}': {}", path.display(), e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| format!("Failed to serialize summary: {}", e))?;
        writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
        writer.flush().map_err(|e| format!("Flush error: {}", e))?;
        Ok(())
    }
}

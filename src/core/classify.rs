// classify.rs - Per read pair classification driver

use log::{debug, trace};

use crate::core::combination::{AlleleCombination, CombinationVerdict, TurnoverRegion};
use crate::core::error::{HybridError, HybridResult};
use crate::core::one_switch::{OneSwitchData, OneSwitchReport, PairMismatches};
use crate::core::read::{MismatchReport, Read};
use crate::core::read_pair::ReadPair;
use crate::core::settings::PipelineConfig;
use crate::data::parser::{allele_combinations, Allele, RawBlock, RawRead, ReadPairRecord};
use crate::data::sequence::AlignedSeq;

/// Terminal category of one read pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Exactly one allele explains the consensus without mismatches
    NonHybrid { allele: String, note: Option<String> },
    /// Several alleles explain the consensus without mismatches
    Zero { note: String },
    /// Best-fitting combination with a single switch
    OneSwitch(OneSwitchReport),
    /// No combination with exactly one switch
    MoreSwitches,
    /// Failed the length or N-count filter
    Rejected,
    /// A mate does not match its own alignment
    IncorrectlyAligned,
    /// Structurally broken block
    Malformed(String),
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::NonHybrid { .. } => "non-hybrid",
            Classification::Zero { .. } => "zero",
            Classification::OneSwitch(_) => "hybrid 1 switch",
            Classification::MoreSwitches => "hybrid more switches",
            Classification::Rejected => "rejected",
            Classification::IncorrectlyAligned => "incorrectly aligned",
            Classification::Malformed(_) => "malformed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    pub name: String,
    pub classification: Classification,
}

/// A mate after quality masking and artefact masking, with its mismatches
struct CheckedMate {
    read: Read,
    mismatches: MismatchReport,
}

/// Winning single-switch combination
struct SwitchCandidate {
    first: usize,
    second: usize,
    region: TurnoverRegion,
    artefacts: usize,
}

/// Classifies read pairs of one sample against its allele set
#[derive(Debug, Clone)]
pub struct Classifier {
    allele_names: Vec<String>,
    combinations: Vec<(usize, usize)>,
    config: PipelineConfig,
}

impl Classifier {
    pub fn new(allele_names: Vec<String>, config: PipelineConfig) -> HybridResult<Self> {
        let combinations = allele_combinations(&allele_names)?;
        Ok(Self {
            allele_names,
            combinations,
            config,
        })
    }

    pub fn allele_names(&self) -> &[String] {
        &self.allele_names
    }

    pub fn combinations(&self) -> &[(usize, usize)] {
        &self.combinations
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Classify one raw block. Only fatal errors are returned as `Err`.
    pub fn classify_block(&self, block: &RawBlock) -> HybridResult<ReadOutcome> {
        let classification = match block.to_record(&self.allele_names) {
            Ok(record) => self.classify_record(&record)?,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!("{}: {}", block.name(), e);
                Classification::Malformed(e.to_string())
            }
        };
        Ok(ReadOutcome {
            name: block.name(),
            classification,
        })
    }

    /// Classify one typed record, turning recoverable errors into categories
    pub fn classify_record(&self, record: &ReadPairRecord) -> HybridResult<Classification> {
        let classification = match self.run(record) {
            Ok(classification) => classification,
            Err(e) if e.is_fatal() => return Err(e),
            Err(HybridError::AlignmentMismatch { read }) => {
                debug!("{}: mate '{}' is incorrectly aligned", record.name, read);
                Classification::IncorrectlyAligned
            }
            Err(HybridError::QualityRejection { .. }) => Classification::Rejected,
            Err(e) => {
                debug!("{}: {}", record.name, e);
                Classification::Malformed(e.to_string())
            }
        };
        debug!("{}: {}", record.name, classification.label());
        Ok(classification)
    }

    fn check_mate(
        &self,
        raw: &RawRead,
        aligned: &AlignedSeq,
        alleles: &[Allele],
    ) -> HybridResult<CheckedMate> {
        let read = Read::new(raw.name.clone(), raw.sequence.clone(), aligned.clone());
        if !read.check_alignment()? {
            return Err(HybridError::AlignmentMismatch {
                read: raw.name.clone(),
            });
        }
        let read = read
            .apply_qv(&raw.quality, self.config.min_quality)?
            .check_read_artefacts(alleles)?;
        let mismatches = read.get_mismatches(alleles)?;
        trace!("{}: mismatches {:?}", raw.name, mismatches.totals());
        Ok(CheckedMate { read, mismatches })
    }

    /// Both alleles of every combination must differ
    fn check_distinct_alleles(&self, alleles: &[Allele]) -> HybridResult<()> {
        for &(i, j) in &self.combinations {
            if let (Some(a), Some(b)) = (alleles.get(i), alleles.get(j)) {
                if a.aligned == b.aligned {
                    return Err(HybridError::IdenticalAlleleCombination {
                        allele1: a.name.clone(),
                        allele2: b.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn run(&self, record: &ReadPairRecord) -> HybridResult<Classification> {
        let alleles = &record.alleles;
        self.check_distinct_alleles(alleles)?;
        let mate1 = self.check_mate(&record.read1, &record.aligned1, alleles)?;
        let mate2 = self.check_mate(&record.read2, &record.aligned2, alleles)?;

        let pair = ReadPair::new(mate1.read, mate2.read);
        if !pair.check_read_pair(self.config.min_read_length, self.config.max_n_count) {
            return Err(HybridError::QualityRejection {
                read: record.name.clone(),
            });
        }

        let consensus = pair.create_read_consensus()?;
        let consensus_mismatches = consensus.get_mismatches(alleles)?;
        trace!("{}: consensus {}", record.name, consensus.aligned);

        let perfect = consensus_mismatches.perfect_matches();
        match perfect.len() {
            0 => {}
            1 => {
                let ambiguous_mate = mate1.mismatches.perfect_matches().len() > 1
                    || mate2.mismatches.perfect_matches().len() > 1;
                return Ok(Classification::NonHybrid {
                    allele: perfect[0].to_string(),
                    note: ambiguous_mate.then(|| {
                        perfect_match_note(&mate1.mismatches, &mate2.mismatches, None)
                    }),
                });
            }
            _ => {
                return Ok(Classification::Zero {
                    note: perfect_match_note(
                        &mate1.mismatches,
                        &mate2.mismatches,
                        Some(&consensus_mismatches),
                    ),
                });
            }
        }

        let Some(winner) = self.best_single_switch(&consensus, alleles)? else {
            return Ok(Classification::MoreSwitches);
        };

        let (first, second) = (&alleles[winner.first], &alleles[winner.second]);
        debug!(
            "{}: single switch between {} and {} at {}-{} ({} artefacts)",
            record.name, first.name, second.name, winner.region.start, winner.region.end, winner.artefacts
        );

        let read1_positions = pair.read1.get_relative_position(alleles)?;
        let read2_positions = pair.read2.get_relative_position(alleles)?;
        let mismatches = PairMismatches {
            read1: &mate1.mismatches,
            read2: &mate2.mismatches,
            consensus: &consensus_mismatches,
        };
        let report = OneSwitchData::new(first, second, winner.region).report(
            &read1_positions,
            &read2_positions,
            &mismatches,
            winner.artefacts,
        )?;
        Ok(Classification::OneSwitch(report))
    }

    /// Single-switch combination with the fewest artefacts; ties go to the earlier combination
    fn best_single_switch(
        &self,
        consensus: &Read,
        alleles: &[Allele],
    ) -> HybridResult<Option<SwitchCandidate>> {
        let mut best: Option<SwitchCandidate> = None;
        for &(i, j) in &self.combinations {
            let mut combination = AlleleCombination::new(&consensus.aligned, &alleles[i], &alleles[j]);
            let verdict = combination.evaluate(&self.config)?;
            trace!(
                "{}: {}/{} -> {:?} ({})",
                consensus.name,
                alleles[i].name,
                alleles[j].name,
                verdict,
                combination.indicator()
            );

            if let CombinationVerdict::Switches(summary) = verdict {
                let Some(region) = summary.region else {
                    continue;
                };
                let artefacts = combination.artefacts();
                if best.as_ref().map_or(true, |b| artefacts < b.artefacts) {
                    best = Some(SwitchCandidate {
                        first: i,
                        second: j,
                        region,
                        artefacts,
                    });
                }
            }
        }
        Ok(best)
    }
}

fn perfect_match_note(
    read1: &MismatchReport,
    read2: &MismatchReport,
    consensus: Option<&MismatchReport>,
) -> String {
    let list = |report: &MismatchReport| {
        let perfect = report.perfect_matches();
        if perfect.is_empty() {
            "none".to_string()
        } else {
            perfect.join(", ")
        }
    };
    let mut note = format!("Read1: {} | Read2: {}", list(read1), list(read2));
    if let Some(consensus) = consensus {
        note.push_str(&format!(" | Consensus: {}", list(consensus)));
    }
    note
}

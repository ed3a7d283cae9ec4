// one_switch.rs - Turnover region data for a single-switch combination

use crate::core::combination::TurnoverRegion;
use crate::core::error::HybridResult;
use crate::core::read::{MismatchReport, Read, RelativePositions};
use crate::data::parser::Allele;
use crate::data::sequence::{AlignedSeq, Symbol};

/// Placeholder for a mate that does not overlap the allele
pub const NO_POSITION: &str = "NA";

/// One output row of a single-switch read pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchAlleleRow {
    pub allele: String,
    pub read1_position: String,
    pub read2_position: String,
    pub read1_mismatches: usize,
    pub read2_mismatches: usize,
    pub consensus_mismatches: usize,
    pub artefacts: usize,
    pub turnover_position: String,
    pub turnover_sequence: String,
}

/// Both rows of the winning combination, first allele first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneSwitchReport {
    pub rows: [SwitchAlleleRow; 2],
}

/// Mismatch reports of both mates and their consensus
pub struct PairMismatches<'a> {
    pub read1: &'a MismatchReport,
    pub read2: &'a MismatchReport,
    pub consensus: &'a MismatchReport,
}

/// Turnover data extraction for one allele pair and its switch region
#[derive(Debug)]
pub struct OneSwitchData<'a> {
    first: &'a Allele,
    second: &'a Allele,
    region: TurnoverRegion,
}

impl<'a> OneSwitchData<'a> {
    pub fn new(first: &'a Allele, second: &'a Allele, region: TurnoverRegion) -> Self {
        Self {
            first,
            second,
            region,
        }
    }

    /// `first-last` coverage of (read 1, read 2) for the first and second allele
    pub fn get_read_position(
        &self,
        read1: &RelativePositions,
        read2: &RelativePositions,
    ) -> [(String, String); 2] {
        let span = |positions: &RelativePositions, allele: &Allele| {
            positions
                .range(&allele.name)
                .unwrap_or_else(|| NO_POSITION.to_string())
        };
        [
            (span(read1, self.first), span(read2, self.first)),
            (span(read1, self.second), span(read2, self.second)),
        ]
    }

    /// Allele sequence masked with gaps everywhere outside the turnover region
    pub fn prep_for_turnover_position(&self, allele: &AlignedSeq) -> AlignedSeq {
        let TurnoverRegion { start, end } = self.region;
        let mut masked = AlignedSeq::gaps(allele.len());
        if start >= allele.len() {
            return masked;
        }
        let symbols = masked.symbols_mut();

        match self.region.len() {
            0 => symbols[start] = Symbol::ZeroLengthMarker,
            1 => {
                symbols[start] = match allele.symbols()[start] {
                    Symbol::Gap => Symbol::SingleGapMarker,
                    other => other,
                }
            }
            _ => {
                let end = end.min(allele.len() - 1);
                symbols[start..=end].copy_from_slice(&allele.symbols()[start..=end]);
                if symbols[start..=end].iter().all(|s| s.is_gap()) {
                    symbols[start] = Symbol::SingleGapMarker;
                }
            }
        }
        masked
    }

    /// Allele-relative `first-last` of a masked turnover string and its bare sequence
    pub fn get_to_position(
        &self,
        masked: &AlignedSeq,
        allele: &Allele,
    ) -> HybridResult<(String, String)> {
        let region = Read::for_non_read("turnover", masked.clone());
        let positions = region.get_relative_position(std::slice::from_ref(allele))?;
        let position = positions
            .range(&allele.name)
            .unwrap_or_else(|| "0-0".to_string());
        let sequence = masked
            .iter()
            .filter(|s| !s.is_gap() && !s.is_sentinel())
            .map(|s| s.to_char())
            .collect();
        Ok((position, sequence))
    }

    /// Assemble both output rows
    pub fn report(
        &self,
        read1: &RelativePositions,
        read2: &RelativePositions,
        mismatches: &PairMismatches<'_>,
        artefacts: usize,
    ) -> HybridResult<OneSwitchReport> {
        let [first_span, second_span] = self.get_read_position(read1, read2);
        let first = self.row(self.first, first_span, mismatches, artefacts)?;
        let second = self.row(self.second, second_span, mismatches, artefacts)?;
        Ok(OneSwitchReport {
            rows: [first, second],
        })
    }

    fn row(
        &self,
        allele: &Allele,
        (read1_position, read2_position): (String, String),
        mismatches: &PairMismatches<'_>,
        artefacts: usize,
    ) -> HybridResult<SwitchAlleleRow> {
        let masked = self.prep_for_turnover_position(&allele.aligned);
        let (turnover_position, turnover_sequence) = self.get_to_position(&masked, allele)?;
        let total = |report: &MismatchReport| report.get(&allele.name).map_or(0, |p| p.total);

        Ok(SwitchAlleleRow {
            allele: allele.name.clone(),
            read1_position,
            read2_position,
            read1_mismatches: total(mismatches.read1),
            read2_mismatches: total(mismatches.read2),
            consensus_mismatches: total(mismatches.consensus),
            artefacts,
            turnover_position,
            turnover_sequence,
        })
    }
}

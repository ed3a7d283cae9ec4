// read.rs - Single-sequence analysis against the allele set

use log::trace;

use crate::core::error::{HybridError, HybridResult};
use crate::core::settings::MAX_QUALITY_SCORE;
use crate::data::parser::{Allele, MAX_ALLELES, MIN_ALLELES};
use crate::data::sequence::{AlignedSeq, Symbol};

/// Offset of the quality alphabet ('!' = 0)
const QUALITY_OFFSET: u8 = b'!';

/// Convert one quality symbol into its score ('!' = 0 ... 'I' = 40)
pub fn quality_score(symbol: char) -> HybridResult<u8> {
    match symbol {
        '!'..='I' => Ok(symbol as u8 - QUALITY_OFFSET),
        other => Err(HybridError::malformed(format!(
            "quality symbol '{}' outside the range '!'..'I' (0..{})",
            other, MAX_QUALITY_SCORE
        ))),
    }
}

/// Mismatch counts of one sequence against one allele
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MismatchProfile {
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub total: usize,
}

impl MismatchProfile {
    pub fn new(substitutions: usize, insertions: usize, deletions: usize) -> Self {
        Self {
            substitutions,
            insertions,
            deletions,
            total: substitutions + insertions + deletions,
        }
    }

    pub fn as_array(&self) -> [usize; 4] {
        [self.substitutions, self.insertions, self.deletions, self.total]
    }
}

/// Per-allele mismatch profiles in allele declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MismatchReport {
    entries: Vec<(String, MismatchProfile)>,
}

impl MismatchReport {
    pub fn entries(&self) -> &[(String, MismatchProfile)] {
        &self.entries
    }

    pub fn get(&self, allele: &str) -> Option<&MismatchProfile> {
        self.entries
            .iter()
            .find(|(name, _)| name == allele)
            .map(|(_, profile)| profile)
    }

    /// Total mismatch count per allele
    pub fn totals(&self) -> Vec<(&str, usize)> {
        self.entries
            .iter()
            .map(|(name, profile)| (name.as_str(), profile.total))
            .collect()
    }

    /// Alleles ordered by total mismatches; ties keep declaration order
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut totals = self.totals();
        totals.sort_by_key(|&(_, total)| total);
        totals
    }

    /// Alleles without a single mismatch, in declaration order
    pub fn perfect_matches(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, profile)| profile.total == 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Allele-relative coordinates covered by a sequence, per allele
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelativePositions {
    entries: Vec<(String, Vec<usize>)>,
}

impl RelativePositions {
    pub fn get(&self, allele: &str) -> Option<&[usize]> {
        self.entries
            .iter()
            .find(|(name, _)| name == allele)
            .map(|(_, positions)| positions.as_slice())
    }

    /// `first-last` for the allele, or None when nothing overlaps
    pub fn range(&self, allele: &str) -> Option<String> {
        let positions = self.get(allele)?;
        match (positions.first(), positions.last()) {
            (Some(first), Some(last)) => Some(format!("{}-{}", first, last)),
            _ => None,
        }
    }
}

/// One sequence in alignment coordinates: a mate, a consensus or a turnover region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    pub name: String,
    pub raw: String,
    pub aligned: AlignedSeq,
}

impl Read {
    pub fn new<S: Into<String>>(name: S, raw: S, aligned: AlignedSeq) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
            aligned,
        }
    }

    /// Build from an already aligned sequence; the raw form is the aligned
    /// form without its leading and trailing gaps.
    pub fn for_non_read<S: Into<String>>(name: S, aligned: AlignedSeq) -> Self {
        Self {
            name: name.into(),
            raw: aligned.trimmed(),
            aligned,
        }
    }

    fn with_aligned(&self, aligned: AlignedSeq) -> Self {
        Self {
            name: self.name.clone(),
            raw: self.raw.clone(),
            aligned,
        }
    }

    fn check_allele_lengths(&self, alleles: &[Allele]) -> HybridResult<()> {
        match alleles.iter().find(|a| a.aligned.len() != self.aligned.len()) {
            Some(allele) => Err(HybridError::malformed(format!(
                "allele '{}' has length {} but '{}' has length {}",
                allele.name,
                allele.aligned.len(),
                self.name,
                self.aligned.len()
            ))),
            None => Ok(()),
        }
    }

    /// Whether the aligned sequence without gaps reproduces the raw sequence
    pub fn check_alignment(&self) -> HybridResult<bool> {
        if self.raw.is_empty() {
            return Err(HybridError::malformed(format!(
                "read '{}' has an empty sequence",
                self.name
            )));
        }
        Ok(self.aligned.ungapped() == self.raw)
    }

    /// Mask every base scoring below `min_quality` with N, in alignment coordinates
    pub fn apply_qv(&self, quality: &str, min_quality: u8) -> HybridResult<Read> {
        let scores = quality
            .chars()
            .map(quality_score)
            .collect::<HybridResult<Vec<_>>>()?;
        if scores.len() != self.raw.len() {
            return Err(HybridError::malformed(format!(
                "read '{}' has {} bases but {} quality values",
                self.name,
                self.raw.len(),
                scores.len()
            )));
        }

        let mut masked = self.aligned.clone();
        let residues = masked.symbols_mut().iter_mut().filter(|s| !s.is_gap());
        for (symbol, &score) in residues.zip(scores.iter()) {
            if score < min_quality {
                *symbol = Symbol::Masked;
            }
        }
        Ok(self.with_aligned(masked))
    }

    /// Mask read positions where every allele disagrees with the read
    pub fn check_read_artefacts(&self, alleles: &[Allele]) -> HybridResult<Read> {
        if !(MIN_ALLELES..=MAX_ALLELES).contains(&alleles.len()) {
            return Err(HybridError::InvalidAlleleCount(alleles.len()));
        }
        self.check_allele_lengths(alleles)?;

        let mut checked = self.aligned.clone();
        let Some((first, last)) = self.aligned.footprint() else {
            return Ok(self.with_aligned(checked));
        };

        for i in first..=last {
            let read_symbol = self.aligned.symbols()[i];
            if read_symbol.is_gap() || read_symbol == Symbol::Masked {
                continue;
            }
            let disagreeing = alleles
                .iter()
                .map(|a| a.aligned.symbols()[i])
                .filter(|&s| !s.is_gap() && s != Symbol::Masked && s != read_symbol)
                .count();
            if disagreeing == alleles.len() {
                trace!("{}: column {} disagrees with every allele", self.name, i);
                checked.symbols_mut()[i] = Symbol::Masked;
            }
        }
        Ok(self.with_aligned(checked))
    }

    /// Substitutions, insertions and deletions against every allele over the read footprint
    pub fn get_mismatches(&self, alleles: &[Allele]) -> HybridResult<MismatchReport> {
        self.check_allele_lengths(alleles)?;
        let entries = alleles
            .iter()
            .map(|allele| (allele.name.clone(), self.mismatches_against(&allele.aligned)))
            .collect();
        Ok(MismatchReport { entries })
    }

    fn mismatches_against(&self, allele: &AlignedSeq) -> MismatchProfile {
        let read = self.aligned.symbols();
        let Some((first, last)) = self.aligned.footprint() else {
            return MismatchProfile::default();
        };

        // read overhang in front of the allele start is not a deletion
        let allele_start = allele.first_residue().unwrap_or(first);

        let (mut subs, mut ins, mut dels) = (0usize, 0usize, 0usize);
        for i in first..=last {
            let (r, a) = (read[i], allele.symbols()[i]);
            if r == a {
                continue;
            }
            match (r, a) {
                (Symbol::Gap, _) => ins += 1,
                (Symbol::InterMateGap, _) => {}
                (_, Symbol::Gap) if i < allele_start => {}
                (_, Symbol::Gap) => dels += 1,
                (Symbol::Masked, _) => {}
                _ => subs += 1,
            }
        }

        MismatchProfile::new(subs, ins, dels)
    }

    /// Allele coordinates covered by this sequence, for every allele
    pub fn get_relative_position(&self, alleles: &[Allele]) -> HybridResult<RelativePositions> {
        self.check_allele_lengths(alleles)?;
        let entries = alleles
            .iter()
            .map(|allele| (allele.name.clone(), self.positions_against(&allele.aligned)))
            .collect();
        Ok(RelativePositions { entries })
    }

    fn positions_against(&self, allele: &AlignedSeq) -> Vec<usize> {
        let read = self.aligned.symbols();
        let Some(last) = self.aligned.last_residue() else {
            return Vec::new();
        };

        let mut positions = Vec::new();
        let mut coord = 0;
        let mut started = false;
        for i in 0..=last {
            if allele.symbols()[i].is_gap() {
                continue;
            }
            if !read[i].is_gap() {
                started = true;
                positions.push(coord);
            } else if started {
                positions.push(coord);
            }
            coord += 1;
        }

        if positions.is_empty() {
            if let Some(marker) = read.iter().position(|s| s.is_sentinel()) {
                let coord = allele.symbols()[..marker]
                    .iter()
                    .filter(|s| !s.is_gap())
                    .count();
                positions.push(coord);
            }
        }
        positions
    }
}

// combination.rs - Indicator strings and switch detection for one allele pair

use std::fmt;
use std::str::FromStr;

use log::trace;

use crate::core::error::{HybridError, HybridResult};
use crate::core::settings::PipelineConfig;
use crate::data::parser::Allele;
use crate::data::sequence::{AlignedSeq, Symbol};

/// One column of an indicator string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Mismatch against the first allele only
    X,
    /// Mismatch against the second allele only
    Y,
    /// Mismatch against both alleles
    Mutual,
    /// Match, or nothing to compare
    Blank,
}

impl Mark {
    pub fn to_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::Y => 'Y',
            Mark::Mutual => 'M',
            Mark::Blank => '-',
        }
    }

    /// X or Y
    pub fn is_allelic(self) -> bool {
        matches!(self, Mark::X | Mark::Y)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorString(Vec<Mark>);

impl IndicatorString {
    pub fn marks(&self) -> &[Mark] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.0.iter().filter(|&&m| m == mark).count()
    }

    /// (column, mark) of every X and Y, in column order
    fn allelic_marks(&self) -> Vec<(usize, Mark)> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_allelic())
            .map(|(i, &m)| (i, m))
            .collect()
    }
}

impl FromStr for IndicatorString {
    type Err = HybridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                'X' => Ok(Mark::X),
                'Y' => Ok(Mark::Y),
                'M' => Ok(Mark::Mutual),
                '-' => Ok(Mark::Blank),
                other => Err(HybridError::malformed(format!(
                    "unexpected indicator symbol '{}'",
                    other
                ))),
            })
            .collect::<HybridResult<Vec<_>>>()
            .map(IndicatorString)
    }
}

impl fmt::Display for IndicatorString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mark in &self.0 {
            write!(f, "{}", mark.to_char())?;
        }
        Ok(())
    }
}

/// Columns between the two mark runs around a switch, both ends inclusive.
/// `end + 1 == start` describes a breakpoint with no column in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnoverRegion {
    pub start: usize,
    pub end: usize,
}

impl TurnoverRegion {
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchSummary {
    pub switches: usize,
    /// Only set when there is exactly one switch
    pub region: Option<TurnoverRegion>,
}

/// Why a combination stopped, or how many switches it has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinationVerdict {
    TooFewIndicative,
    TooManyMutual,
    TooManyAlternating,
    TooFewAfterCleanup,
    Switches(SwitchSummary),
}

/// Run-length list of the X/Y marks: each mark gets a counter that
/// restarts at 1 whenever the mark differs from the previous one.
pub fn mark_run_lengths(indicator: &IndicatorString) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut previous = None;
    let mut length = 0;
    for (_, mark) in indicator.allelic_marks() {
        length = if previous == Some(mark) { length + 1 } else { 1 };
        runs.push(length);
        previous = Some(mark);
    }
    runs
}

/// Whether mark `index` is an isolated mark followed by another isolated mark.
/// The first mark is never counted.
fn is_alternating(runs: &[usize], index: usize) -> bool {
    index >= 1 && runs.get(index) == Some(&1) && runs.get(index + 1) == Some(&1)
}

/// Consensus checked against one ordered pair of alleles
#[derive(Debug)]
pub struct AlleleCombination<'a> {
    consensus: &'a AlignedSeq,
    first: &'a Allele,
    second: &'a Allele,
    indicator: IndicatorString,
    artefacts: usize,
}

impl<'a> AlleleCombination<'a> {
    pub fn new(consensus: &'a AlignedSeq, first: &'a Allele, second: &'a Allele) -> Self {
        Self {
            consensus,
            first,
            second,
            indicator: IndicatorString::default(),
            artefacts: 0,
        }
    }

    pub fn first(&self) -> &'a Allele {
        self.first
    }

    pub fn second(&self) -> &'a Allele {
        self.second
    }

    pub fn indicator(&self) -> &IndicatorString {
        &self.indicator
    }

    pub fn artefacts(&self) -> usize {
        self.artefacts
    }

    #[cfg(test)]
    fn with_indicator(mut self, indicator: &str) -> Self {
        self.indicator = indicator.parse().unwrap();
        self
    }

    /// Mark the columns where a single allele disagrees with the consensus
    fn single_allele_marks(&self, allele: &AlignedSeq, mark: Mark) -> Vec<Mark> {
        let consensus = self.consensus.symbols();
        let span = self.consensus.footprint();
        let within_reads = |i: usize| matches!(span, Some((first, last)) if i >= first && i <= last);

        consensus
            .iter()
            .zip(allele.iter())
            .enumerate()
            .map(|(i, (&c, &a))| {
                if c == a {
                    return Mark::Blank;
                }
                match (c, a) {
                    (Symbol::InterMateGap | Symbol::Masked, _) => Mark::Blank,
                    (Symbol::Gap, _) if within_reads(i) => mark,
                    (Symbol::Gap, _) => Mark::Blank,
                    _ => mark,
                }
            })
            .collect()
    }

    /// Build the combined X/Y/M indicator string
    pub fn create_indicator_string(&mut self) -> HybridResult<&IndicatorString> {
        if self.first.aligned == self.second.aligned {
            return Err(HybridError::IdenticalAlleleCombination {
                allele1: self.first.name.clone(),
                allele2: self.second.name.clone(),
            });
        }
        if self.first.aligned.len() != self.consensus.len()
            || self.second.aligned.len() != self.consensus.len()
        {
            return Err(HybridError::malformed(format!(
                "alleles '{}'/'{}' and consensus differ in length",
                self.first.name, self.second.name
            )));
        }

        let first = self.single_allele_marks(&self.first.aligned, Mark::X);
        let second = self.single_allele_marks(&self.second.aligned, Mark::Y);
        let merged = first
            .into_iter()
            .zip(second)
            .map(|(a, b)| match (a, b) {
                (Mark::Blank, other) | (other, Mark::Blank) => other,
                _ => Mark::Mutual,
            })
            .collect();

        self.indicator = IndicatorString(merged);
        Ok(&self.indicator)
    }

    /// At least `min_marks` X and `min_marks` Y in the current indicator string
    pub fn check_indicative_snps(&self, min_marks: usize) -> bool {
        self.indicator.count(Mark::X) >= min_marks && self.indicator.count(Mark::Y) >= min_marks
    }

    /// Count mutual mismatches as artefacts; too many rejects the combination
    pub fn check_mutual_snps(&mut self, max_mutual: usize) -> bool {
        let mutual = self.indicator.count(Mark::Mutual);
        self.artefacts += mutual;
        mutual <= max_mutual
    }

    /// Count isolated alternating marks (XYX / YXY). Returns the run-length
    /// list, or None when there are more than `max_alternating`, together
    /// with the cumulative artefact count.
    pub fn check_alternately_snps(&mut self, max_alternating: usize) -> (Option<Vec<usize>>, usize) {
        let runs = mark_run_lengths(&self.indicator);
        let alternating = (0..runs.len()).filter(|&i| is_alternating(&runs, i)).count();
        self.artefacts += alternating;

        if alternating > max_alternating {
            trace!(
                "{}/{}: {} alternating marks in {}",
                self.first.name,
                self.second.name,
                alternating,
                self.indicator
            );
            return (None, self.artefacts);
        }
        (Some(runs), self.artefacts)
    }

    /// Blank out mutual marks and isolated alternating marks; the cleaned
    /// string replaces the current indicator string.
    pub fn update_indicator_string(&mut self, runs: &[usize]) -> &IndicatorString {
        let allelic: Vec<usize> = self
            .indicator
            .allelic_marks()
            .into_iter()
            .map(|(column, _)| column)
            .collect();

        let mut cleaned: Vec<Mark> = self
            .indicator
            .marks()
            .iter()
            .map(|&m| if m == Mark::Mutual { Mark::Blank } else { m })
            .collect();

        let last = allelic.len().saturating_sub(1);
        for (k, &column) in allelic.iter().enumerate() {
            if k < last && is_alternating(runs, k) {
                cleaned[column] = Mark::Blank;
            }
        }

        self.indicator = IndicatorString(cleaned);
        &self.indicator
    }

    /// Number of X/Y transitions; with exactly one, the region between both runs
    pub fn get_switches(&self) -> SwitchSummary {
        let marks = self.indicator.allelic_marks();
        let switches = marks.windows(2).filter(|w| w[0].1 != w[1].1).count();

        let region = match (switches, marks.first()) {
            (1, Some(&(_, opening))) => {
                let last_opening = marks.iter().rev().find(|(_, m)| *m == opening);
                let first_closing = marks.iter().find(|(_, m)| *m != opening);
                match (last_opening, first_closing) {
                    (Some(&(a, _)), Some(&(b, _))) => Some(TurnoverRegion {
                        start: a + 1,
                        end: b - 1,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        SwitchSummary { switches, region }
    }

    /// Run every check in order and report how the combination ended
    pub fn evaluate(&mut self, config: &PipelineConfig) -> HybridResult<CombinationVerdict> {
        self.create_indicator_string()?;
        trace!(
            "{}/{} indicator: {}",
            self.first.name,
            self.second.name,
            self.indicator
        );

        if !self.check_indicative_snps(config.min_indicative_snps) {
            return Ok(CombinationVerdict::TooFewIndicative);
        }
        if !self.check_mutual_snps(config.max_mutual_snps) {
            return Ok(CombinationVerdict::TooManyMutual);
        }
        let runs = match self.check_alternately_snps(config.max_alternating_artefacts) {
            (Some(runs), _) => runs,
            (None, _) => return Ok(CombinationVerdict::TooManyAlternating),
        };
        self.update_indicator_string(&runs);
        if !self.check_indicative_snps(config.min_indicative_snps) {
            return Ok(CombinationVerdict::TooFewAfterCleanup);
        }
        Ok(CombinationVerdict::Switches(self.get_switches()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allele(name: &str, s: &str) -> Allele {
        Allele::new(name, s.parse().unwrap())
    }

    fn seq(s: &str) -> AlignedSeq {
        s.parse().unwrap()
    }

    fn indicator_for(consensus: &str, a: &Allele, b: &Allele) -> HybridResult<String> {
        let consensus = seq(consensus);
        let mut combo = AlleleCombination::new(&consensus, a, b);
        let indicator = combo.create_indicator_string().map(|s| s.to_string());
        indicator
    }

    fn with_indicator<T>(indicator: &str, f: impl FnOnce(&mut AlleleCombination) -> T) -> T {
        let consensus = seq("-");
        let (a, b) = (allele("a", "A"), allele("b", "C"));
        let mut combo = AlleleCombination::new(&consensus, &a, &b).with_indicator(indicator);
        f(&mut combo)
    }

    #[test]
    fn test_create_indicator_string() {
        let consensus = "---CC**CCC---";
        let a1 = allele("A1", "---CC--CCC---");
        let a2 = allele("A2", "---CC--TCC---");
        let b1 = allele("B1", "---CC--CCC---");
        let b2 = allele("B2", "---CC--CTT---");
        let c1 = allele("C1", "---CC--CGC---");

        assert_eq!(indicator_for(consensus, &a1, &a2).unwrap(), "-------Y-----");
        assert_eq!(indicator_for(consensus, &a2, &b1).unwrap(), "-------X-----");
        assert_eq!(indicator_for(consensus, &a2, &b2).unwrap(), "-------XYY---");
        assert_eq!(indicator_for(consensus, &b2, &c1).unwrap(), "--------MX---");
    }

    #[test]
    fn test_identical_alleles_are_fatal() {
        let a1 = allele("A1", "---CC--CCC---");
        let b1 = allele("B1", "---CC--CCC---");
        let err = indicator_for("---CC**CCC---", &a1, &b1).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err,
            HybridError::IdenticalAlleleCombination {
                allele1: "A1".to_string(),
                allele2: "B1".to_string()
            }
        );
    }

    #[test]
    fn test_allele_extension_outside_reads_is_ignored() {
        let a = allele("A", "CCCCCCCCCCCCC");
        let b = allele("B", "---CC--CCC---");
        // allele A extends beyond the reads on both sides; the internal gap is an insertion
        assert_eq!(
            indicator_for("---CC--CCC---", &a, &b).unwrap(),
            "-----XX------"
        );
    }

    #[test]
    fn test_allele_deletion_is_marked() {
        let a = allele("A", "---C---CCC---");
        let b = allele("B", "---CCNNCCC---");
        assert_eq!(
            indicator_for("---CCNNCCC---", &a, &b).unwrap(),
            "----X--------"
        );
    }

    #[test]
    fn test_check_indicative_snps() {
        assert!(with_indicator("------XXX-----XYYYY---", |c| c.check_indicative_snps(2)));
        assert!(!with_indicator("------XXX-----XY----", |c| c.check_indicative_snps(2)));
    }

    #[test]
    fn test_check_mutual_snps() {
        let cases = [
            ("------XXX-----XYYYY---", 0, true),
            ("------XXM-----XYYYY---", 1, true),
            ("------XMM-----XYYYY---", 2, true),
            ("------MMM-----XYYYY---", 3, false),
        ];
        for (indicator, artefacts, accepted) in cases {
            with_indicator(indicator, |c| {
                assert_eq!(c.check_mutual_snps(2), accepted, "{}", indicator);
                assert_eq!(c.artefacts(), artefacts, "{}", indicator);
            });
        }
    }

    #[test]
    fn test_check_alternately_snps() {
        let cases: Vec<(&str, Option<Vec<usize>>, usize)> = vec![
            ("------XXX-----XYYYY---", Some(vec![1, 2, 3, 4, 1, 2, 3, 4]), 0),
            ("-----X-XYX-----XX---", Some(vec![1, 2, 1, 1, 2, 3]), 1),
            ("------XXX-----XX---", Some(vec![1, 2, 3, 4, 5]), 0),
            ("-----X-XYX--XX---YXXYYYYXYYYY---", None, 3),
            ("-----X-XYYX-----XX---", Some(vec![1, 2, 1, 2, 1, 2, 3]), 0),
            ("------XYX-----XXYYYY-", Some(vec![1, 1, 1, 2, 3, 1, 2, 3, 4]), 1),
            (
                "--XXXYXXXX-YYYXYYY-",
                Some(vec![1, 2, 3, 1, 1, 2, 3, 4, 1, 2, 3, 1, 1, 2, 3]),
                2,
            ),
            ("----XXXYX-Y-XX-", None, 3),
            ("----XXXYX-YY-XX-", Some(vec![1, 2, 3, 1, 1, 1, 2, 1, 2]), 2),
        ];
        for (indicator, runs, artefacts) in cases {
            let result = with_indicator(indicator, |c| c.check_alternately_snps(2));
            assert_eq!(result, (runs, artefacts), "{}", indicator);
        }
    }

    #[test]
    fn test_mutual_marks_are_ignored_for_alternation() {
        let result = with_indicator("--XXMXX--YYY", |c| c.check_alternately_snps(2));
        assert_eq!(result, (Some(vec![1, 2, 3, 4, 1, 2, 3]), 0));
    }

    #[test]
    fn test_update_indicator_string() {
        let cleaned = with_indicator("-----X-XYX-----XX---", |c| {
            c.update_indicator_string(&[1, 2, 1, 1, 2, 3]).to_string()
        });
        assert_eq!(cleaned, "-----X-X-X-----XX---");

        let cleaned = with_indicator("--XXXYXXXX-YYYXYYY-", |c| {
            c.update_indicator_string(&[1, 2, 3, 1, 1, 2, 3, 4, 1, 2, 3, 1, 1, 2, 3])
                .to_string()
        });
        assert_eq!(cleaned, "--XXX-XXXX-YYY-YYY-");

        let cleaned = with_indicator("--XXXYMXXX-YYYYYY-", |c| {
            c.update_indicator_string(&[1, 2, 3, 1, 1, 2, 3, 4, 1, 2, 3, 1, 2, 3])
                .to_string()
        });
        assert_eq!(cleaned, "--XXX--XXX-YYYYYY-");
    }

    #[test]
    fn test_update_after_alternation_check() {
        let cleaned = with_indicator("--XXXYMXXX-YYYXYMYY-", |c| {
            let (runs, _) = c.check_alternately_snps(2);
            c.update_indicator_string(&runs.unwrap()).to_string()
        });
        assert_eq!(cleaned, "--XXX--XXX-YYY-Y-YY-");
    }

    #[test]
    fn test_leading_isolated_mark_is_kept() {
        let cleaned = with_indicator("-YXXX--YYY-", |c| {
            let (runs, artefacts) = c.check_alternately_snps(2);
            assert_eq!(artefacts, 0);
            c.update_indicator_string(&runs.unwrap()).to_string()
        });
        assert_eq!(cleaned, "-YXXX--YYY-");
    }

    #[test]
    fn test_get_switches() {
        let switches = |s: &str| with_indicator(s, |c| c.get_switches());

        let one = switches("--XXX--XXX-YYY-Y-YY-");
        assert_eq!(one.switches, 1);
        assert_eq!(one.region, Some(TurnoverRegion { start: 10, end: 10 }));

        let wide = switches("--XXX--XXX------YYY-Y-YY-");
        assert_eq!(wide.region, Some(TurnoverRegion { start: 10, end: 15 }));
        assert_eq!(wide.region.unwrap().len(), 6);

        let adjacent = switches("--XXX--XXXYYY-Y-YY-");
        assert_eq!(adjacent.switches, 1);
        assert_eq!(adjacent.region, Some(TurnoverRegion { start: 10, end: 9 }));
        assert!(adjacent.region.unwrap().is_empty());

        let three = switches("--XXX--YYY-XXX-YY-");
        assert_eq!((three.switches, three.region), (3, None));

        let five = switches("--XX-YY-XX-YY-XX-YY-");
        assert_eq!((five.switches, five.region), (5, None));
    }

    #[test]
    fn test_cleaned_single_switch_round_trip() {
        let summary = with_indicator("--XXXYXXXX-YYYXYYY-", |c| {
            let (runs, _) = c.check_alternately_snps(2);
            c.update_indicator_string(&runs.unwrap());
            c.get_switches()
        });
        assert_eq!(summary.switches, 1);
    }

    #[test]
    fn test_evaluate_single_switch() {
        let consensus = seq("ACATATGTACGTACGTGCGTCCGT");
        let a1 = allele("A1", "ACATATGTACGTACGTACGTACGT");
        let b1 = allele("B1", "ACGTACGTACGTACGTGCGTCCGT");
        let mut combo = AlleleCombination::new(&consensus, &a1, &b1);
        let verdict = combo.evaluate(&PipelineConfig::default()).unwrap();
        assert_eq!(combo.indicator().to_string(), "--Y--Y----------X---X---");
        assert_eq!(
            verdict,
            CombinationVerdict::Switches(SwitchSummary {
                switches: 1,
                region: Some(TurnoverRegion { start: 6, end: 15 }),
            })
        );
        assert_eq!(combo.artefacts(), 0);
    }

    #[test]
    fn test_evaluate_rejects_uninformative() {
        let consensus = seq("---CC**CCC---");
        let a2 = allele("A2", "---CC--TCC---");
        let b2 = allele("B2", "---CC--CTT---");
        let mut combo = AlleleCombination::new(&consensus, &a2, &b2);
        assert_eq!(
            combo.evaluate(&PipelineConfig::default()).unwrap(),
            CombinationVerdict::TooFewIndicative
        );
    }
}

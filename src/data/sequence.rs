// sequence.rs - Per-position symbols and aligned sequences

use std::fmt;
use std::str::FromStr;

use crate::core::error::{HybridError, HybridResult};

/// One column of an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A nucleotide (A, C, G, T or any other IUPAC letter except N), case kept
    Base(u8),
    /// Alignment gap: no nucleotide in this column
    Gap,
    /// Column between two non-overlapping mates of a consensus
    InterMateGap,
    /// Low quality or unresolved base
    Masked,
    /// Turnover region with zero nucleotides
    ZeroLengthMarker,
    /// Turnover region of length one that falls on an allele gap
    SingleGapMarker,
}

impl Symbol {
    /// Parse one column of input data. Turnover markers are never parsed:
    /// `K` and `Z` in a read or allele are bases.
    pub fn from_char(c: char) -> HybridResult<Self> {
        match c {
            '-' => Ok(Symbol::Gap),
            '*' => Ok(Symbol::InterMateGap),
            'N' => Ok(Symbol::Masked),
            c if c.is_ascii_alphabetic() => Ok(Symbol::Base(c as u8)),
            other => Err(HybridError::malformed(format!(
                "unexpected symbol '{}' in aligned sequence",
                other
            ))),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Symbol::Base(b) => b as char,
            Symbol::Gap => '-',
            Symbol::InterMateGap => '*',
            Symbol::Masked => 'N',
            Symbol::ZeroLengthMarker => 'K',
            Symbol::SingleGapMarker => 'Z',
        }
    }

    pub fn is_gap(self) -> bool {
        self == Symbol::Gap
    }

    pub fn is_base(self) -> bool {
        matches!(self, Symbol::Base(_))
    }

    pub fn is_sentinel(self) -> bool {
        matches!(self, Symbol::ZeroLengthMarker | Symbol::SingleGapMarker)
    }
}

/// Fixed-length sequence in alignment coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AlignedSeq(Vec<Symbol>);

impl AlignedSeq {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    /// All-gap sequence of the given length
    pub fn gaps(len: usize) -> Self {
        Self(vec![Symbol::Gap; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn symbols_mut(&mut self) -> &mut [Symbol] {
        &mut self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.0.get(index).copied()
    }

    /// Index of the first non-gap column
    pub fn first_residue(&self) -> Option<usize> {
        self.0.iter().position(|s| !s.is_gap())
    }

    /// Index of the last non-gap column
    pub fn last_residue(&self) -> Option<usize> {
        self.0.iter().rposition(|s| !s.is_gap())
    }

    /// Inclusive range of columns between the first and last non-gap symbol
    pub fn footprint(&self) -> Option<(usize, usize)> {
        Some((self.first_residue()?, self.last_residue()?))
    }

    pub fn count(&self, symbol: Symbol) -> usize {
        self.0.iter().filter(|&&s| s == symbol).count()
    }

    /// Sequence content with every gap column removed
    pub fn ungapped(&self) -> String {
        self.0
            .iter()
            .filter(|s| !s.is_gap())
            .map(|s| s.to_char())
            .collect()
    }

    /// Sequence content with leading and trailing gap runs removed
    pub fn trimmed(&self) -> String {
        match self.footprint() {
            Some((first, last)) => self.0[first..=last].iter().map(|s| s.to_char()).collect(),
            None => String::new(),
        }
    }
}

impl FromStr for AlignedSeq {
    type Err = HybridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(Symbol::from_char)
            .collect::<HybridResult<Vec<_>>>()
            .map(AlignedSeq)
    }
}

impl fmt::Display for AlignedSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{}", symbol.to_char())?;
        }
        Ok(())
    }
}

impl From<Vec<Symbol>> for AlignedSeq {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> AlignedSeq {
        s.parse().unwrap()
    }

    #[test]
    fn test_symbol_round_trip() {
        let text = "AC-*NKZgt";
        let parsed = seq(text);
        assert_eq!(parsed.to_string(), text);
        assert_eq!(parsed.get(3), Some(Symbol::InterMateGap));
        assert_eq!(parsed.get(4), Some(Symbol::Masked));
        assert_eq!(parsed.get(7), Some(Symbol::Base(b'g')));
    }

    #[test]
    fn test_k_and_z_are_bases() {
        let parsed = seq("-KZ-");
        assert_eq!(parsed.get(1), Some(Symbol::Base(b'K')));
        assert_eq!(parsed.get(2), Some(Symbol::Base(b'Z')));
        assert!(!parsed.iter().any(|s| s.is_sentinel()));
    }

    #[test]
    fn test_rejects_unknown_symbol() {
        assert!("ACG.T".parse::<AlignedSeq>().is_err());
        assert!("AC GT".parse::<AlignedSeq>().is_err());
    }

    #[test]
    fn test_footprint_and_trim() {
        let s = seq("---TT-TTT---");
        assert_eq!(s.footprint(), Some((3, 8)));
        assert_eq!(s.trimmed(), "TT-TTT");
        assert_eq!(s.ungapped(), "TTTTT");
        assert_eq!(seq("-----").footprint(), None);
        assert_eq!(seq("-----").trimmed(), "");
    }

    #[test]
    fn test_count() {
        let s = seq("---CN--NCC---");
        assert_eq!(s.count(Symbol::Masked), 2);
        assert_eq!(s.count(Symbol::Gap), 8);
    }
}

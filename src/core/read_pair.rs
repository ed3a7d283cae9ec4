// read_pair.rs - Mate acceptance filter and paired-end consensus

use crate::core::error::{HybridError, HybridResult};
use crate::core::read::Read;
use crate::data::sequence::{AlignedSeq, Symbol};

/// Two quality-checked mates of one fragment. Order matters: mate 1 first.
#[derive(Debug, Clone)]
pub struct ReadPair {
    pub read1: Read,
    pub read2: Read,
}

impl ReadPair {
    pub fn new(read1: Read, read2: Read) -> Self {
        Self { read1, read2 }
    }

    /// Both raw mates are long enough and neither aligned mate carries too many N
    pub fn check_read_pair(&self, min_length: usize, max_n: usize) -> bool {
        [&self.read1, &self.read2].iter().all(|read| {
            read.raw.len() >= min_length && read.aligned.count(Symbol::Masked) <= max_n
        })
    }

    /// Merge both mates into one aligned sequence; columns between
    /// non-overlapping mates become inter-mate gaps.
    pub fn create_read_consensus(&self) -> HybridResult<Read> {
        let (first, second) = (&self.read1.aligned, &self.read2.aligned);
        if first.len() != second.len() {
            return Err(HybridError::malformed(format!(
                "mates of '{}' have aligned lengths {} and {}",
                self.read1.name,
                first.len(),
                second.len()
            )));
        }

        let first = flank_as_inter_mate(first);
        let second = flank_as_inter_mate(second);
        let merged: Vec<Symbol> = first
            .iter()
            .zip(second.iter())
            .map(|(&a, &b)| merge_column(a, b))
            .collect();

        let mut consensus = AlignedSeq::new(merged);
        restore_flanks(&mut consensus);
        Ok(Read::for_non_read(self.read1.name.clone(), consensus))
    }
}

fn merge_column(a: Symbol, b: Symbol) -> Symbol {
    match (a, b) {
        (Symbol::InterMateGap, other) | (other, Symbol::InterMateGap) => other,
        (a, b) if a == b => a,
        (Symbol::Masked, other) | (other, Symbol::Masked) => other,
        _ => Symbol::Masked,
    }
}

/// Leading and trailing gap runs become inter-mate gaps
fn flank_as_inter_mate(seq: &AlignedSeq) -> Vec<Symbol> {
    let mut symbols = seq.symbols().to_vec();
    let (first, last) = seq
        .footprint()
        .unwrap_or((symbols.len(), symbols.len()));
    for (i, symbol) in symbols.iter_mut().enumerate() {
        if i < first || i > last {
            *symbol = Symbol::InterMateGap;
        }
    }
    symbols
}

/// Leading and trailing inter-mate gap runs go back to plain gaps
fn restore_flanks(seq: &mut AlignedSeq) {
    let symbols = seq.symbols_mut();
    for symbol in symbols.iter_mut() {
        if *symbol != Symbol::InterMateGap {
            break;
        }
        *symbol = Symbol::Gap;
    }
    for symbol in symbols.iter_mut().rev() {
        if *symbol != Symbol::InterMateGap {
            break;
        }
        *symbol = Symbol::Gap;
    }
}

// parser.rs - Alignment dump parsing into read pair records

use std::fs;
use std::path::Path;

use crate::core::error::{HybridError, HybridResult};
use crate::data::sequence::AlignedSeq;

/// Literal separator between read pair blocks
pub const BLOCK_DELIMITER: &str = "$$$";

/// Allowed number of alleles per sample
pub const MIN_ALLELES: usize = 4;
pub const MAX_ALLELES: usize = 6;

/// One sequencing mate as it came off the sequencer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRead {
    pub name: String,
    pub sequence: String,
    pub quality: String,
}

/// Candidate reference allele in alignment coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allele {
    pub name: String,
    pub aligned: AlignedSeq,
}

impl Allele {
    pub fn new<S: Into<String>>(name: S, aligned: AlignedSeq) -> Self {
        Self {
            name: name.into(),
            aligned,
        }
    }
}

/// Fully typed alignment block for one read pair
#[derive(Debug, Clone)]
pub struct ReadPairRecord {
    pub name: String,
    pub read1: RawRead,
    pub read2: RawRead,
    pub aligned1: AlignedSeq,
    pub aligned2: AlignedSeq,
    pub alleles: Vec<Allele>,
}

impl ReadPairRecord {
    /// Shared alignment length of every sequence in the block
    pub fn alignment_length(&self) -> usize {
        self.aligned1.len()
    }
}

/// Tab-split lines of one block, kept untyped until the block is processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub index: usize,
    pub lines: Vec<Vec<String>>,
}

impl RawBlock {
    /// Name of the read pair (first field of the first line)
    pub fn name(&self) -> String {
        self.lines
            .first()
            .and_then(|line| line.first())
            .cloned()
            .unwrap_or_else(|| format!("block_{}", self.index))
    }

    /// Convert into a typed record, checking the block against the run's allele names
    pub fn to_record(&self, allele_names: &[String]) -> HybridResult<ReadPairRecord> {
        if self.lines.len() < 4 {
            return Err(HybridError::malformed(format!(
                "block {} has {} lines, expected at least 4",
                self.index,
                self.lines.len()
            )));
        }

        let read1 = raw_read(&self.lines[0], self.index)?;
        let read2 = raw_read(&self.lines[1], self.index)?;
        let aligned1: AlignedSeq = self.lines[2][1].trim().parse()?;
        let aligned2: AlignedSeq = self.lines[3][1].trim().parse()?;

        let alleles = self.lines[4..]
            .iter()
            .map(|line| Ok(Allele::new(line[0].trim(), line[1].trim().parse()?)))
            .collect::<HybridResult<Vec<_>>>()?;

        let names: Vec<&str> = alleles.iter().map(|a| a.name.as_str()).collect();
        if names != allele_names.iter().map(String::as_str).collect::<Vec<_>>() {
            return Err(HybridError::malformed(format!(
                "block {} lists alleles [{}], expected [{}]",
                self.index,
                names.join(", "),
                allele_names.join(", ")
            )));
        }

        let length = aligned1.len();
        if aligned2.len() != length || alleles.iter().any(|a| a.aligned.len() != length) {
            return Err(HybridError::malformed(format!(
                "block {} has aligned sequences of different lengths",
                self.index
            )));
        }

        Ok(ReadPairRecord {
            name: read1.name.clone(),
            read1,
            read2,
            aligned1,
            aligned2,
            alleles,
        })
    }
}

fn raw_read(fields: &[String], index: usize) -> HybridResult<RawRead> {
    if fields.len() < 3 {
        return Err(HybridError::malformed(format!(
            "block {}: read line needs name, sequence and quality",
            index
        )));
    }
    Ok(RawRead {
        name: fields[0].trim().to_string(),
        sequence: fields[1].trim().to_string(),
        quality: fields[2].trim().to_string(),
    })
}

/// Parsed alignment dump
#[derive(Debug, Clone)]
pub struct ParsedInput {
    pub blocks: Vec<RawBlock>,
    pub allele_names: Vec<String>,
}

/// Split the dump into blocks and read the allele names from the first block.
///
/// The chunk before the first delimiter is a free-text preamble and is skipped,
/// as are chunks without any tab-separated line.
pub fn parse_input(text: &str) -> HybridResult<ParsedInput> {
    let blocks: Vec<RawBlock> = text
        .split(BLOCK_DELIMITER)
        .skip(1)
        .map(|chunk| {
            chunk
                .lines()
                .map(|line| line.trim_end_matches('\r'))
                .map(|line| line.split('\t').map(str::to_string).collect::<Vec<_>>())
                .filter(|fields| fields.len() > 1)
                .collect::<Vec<_>>()
        })
        .filter(|lines| !lines.is_empty())
        .enumerate()
        .map(|(index, lines)| RawBlock { index, lines })
        .collect();

    let first = blocks
        .first()
        .ok_or_else(|| HybridError::malformed("no read blocks found in input"))?;

    let allele_names = first
        .lines
        .iter()
        .skip(4)
        .map(|line| line[0].trim().to_string())
        .collect();

    Ok(ParsedInput {
        blocks,
        allele_names,
    })
}

/// Read and parse an alignment dump from disk
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedInput, String> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read input file '{}': {}", path.display(), e))?;
    parse_input(&text).map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))
}

/// Every unordered pair of allele indices, in declaration order
pub fn allele_combinations(allele_names: &[String]) -> HybridResult<Vec<(usize, usize)>> {
    let n = allele_names.len();
    if !(MIN_ALLELES..=MAX_ALLELES).contains(&n) {
        return Err(HybridError::InvalidAlleleCount(n));
    }
    Ok((0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect())
}

// mod.rs - Data structures module

pub mod parser;
pub mod sequence;

// Re-export main types for convenience
pub use parser::{allele_combinations, parse_file, parse_input, Allele, ParsedInput, RawBlock, RawRead, ReadPairRecord};
pub use sequence::{AlignedSeq, Symbol};

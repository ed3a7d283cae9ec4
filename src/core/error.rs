// error.rs - Error taxonomy for read pair classification

use std::fmt;

/// Errors raised while classifying a read pair.
///
/// Only [`HybridError::is_fatal`] errors stop the run; everything else is
/// confined to the read pair that raised it and ends up in a counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HybridError {
    /// Structurally invalid input (empty read, length mismatch, bad quality symbol)
    MalformedInput(String),
    /// The allele set does not hold 4, 5 or 6 alleles
    InvalidAlleleCount(usize),
    /// Two alleles of one combination share the same aligned sequence
    IdenticalAlleleCombination { allele1: String, allele2: String },
    /// The raw read cannot be reconstructed from its alignment
    AlignmentMismatch { read: String },
    /// The read pair fails the length or N-count filter
    QualityRejection { read: String },
}

impl HybridError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HybridError::InvalidAlleleCount(_) | HybridError::IdenticalAlleleCombination { .. }
        )
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        HybridError::MalformedInput(msg.into())
    }
}

impl fmt::Display for HybridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HybridError::MalformedInput(msg) => write!(f, "Malformed input: {}", msg),
            HybridError::InvalidAlleleCount(n) => write!(
                f,
                "Expected 4, 5 or 6 alleles but found {} (at least two loci with two alleles each are needed)",
                n
            ),
            HybridError::IdenticalAlleleCombination { allele1, allele2 } => write!(
                f,
                "Alleles '{}' and '{}' have identical aligned sequences",
                allele1, allele2
            ),
            HybridError::AlignmentMismatch { read } => {
                write!(f, "Read '{}' does not match its aligned sequence", read)
            }
            HybridError::QualityRejection { read } => {
                write!(f, "Read pair '{}' failed the length/N filter", read)
            }
        }
    }
}

impl std::error::Error for HybridError {}

pub type HybridResult<T> = Result<T, HybridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(HybridError::InvalidAlleleCount(3).is_fatal());
        assert!(HybridError::IdenticalAlleleCombination {
            allele1: "A*01".to_string(),
            allele2: "A*02".to_string(),
        }
        .is_fatal());
        assert!(!HybridError::malformed("empty read").is_fatal());
        assert!(!HybridError::AlignmentMismatch { read: "r1".to_string() }.is_fatal());
        assert!(!HybridError::QualityRejection { read: "r1".to_string() }.is_fatal());
    }

    #[test]
    fn test_display_mentions_alleles() {
        let err = HybridError::IdenticalAlleleCombination {
            allele1: "B*07".to_string(),
            allele2: "B*08".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("B*07") && msg.contains("B*08"));
    }
}

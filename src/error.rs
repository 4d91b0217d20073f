use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// Every pipeline up to the bound was tried and none fits.
    #[error("exhausted all supported expressions till depth: {depth}")]
    OutOfDepth { depth: usize },

    #[error("no examples to synthesize from")]
    NoExamples,

    /// A record built field by field did not reproduce the full examples.
    #[error("assembled expression `{expression}` does not satisfy the examples")]
    Unverified { expression: String },
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid specification document: {0}")]
    Decode(String),

    #[error("specification document has no examples")]
    NoExamples,
}

use thiserror::Error;

/// Failures that abort the processing of a single locus.
/// Malformed reads never show up here; they are counted and skipped while loading.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("node {0} does not exist")]
    MissingNode(usize),
    #[error("read {0} is not registered")]
    MissingRead(usize),
    #[error("node {from} has an edge to {to}, which is missing or dead")]
    DanglingEdge { from: usize, to: usize },
    #[error("edge {from}->{to} has no mirror edge")]
    AsymmetricEdge { from: usize, to: usize },
    #[error("reference window of length {len} is shorter than k={k}")]
    ReferenceTooShort { len: usize, k: usize },
    #[error("no source or sink is designated")]
    NoSourceOrSink,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Align(#[from] AlignError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignError {
    #[error("cannot align an empty sequence")]
    EmptySequence,
    #[error("reference window is inverted ({start} > {end})")]
    InvertedWindow { start: usize, end: usize },
    #[error("the path does not cover the reference window")]
    PathShorterThanWindow,
    #[error("coverage has {cov} entries for a sequence of length {len}")]
    CoverageLength { cov: usize, len: usize },
}

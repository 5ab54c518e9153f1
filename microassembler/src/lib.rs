//! Microassembler: local de novo assembly of short reads around a reference window.
//!
//! Reads and the reference are threaded into a bi-directed de Bruijn graph ([graph::Graph]),
//! the graph is simplified component by component, the walks between the reference anchors
//! are enumerated ([path::Path]) and each walk is aligned back to the reference
//! ([align], [transcript]). [locus::LocusAssembler] drives the whole thing for one locus.
pub mod align;
pub mod config;
pub mod coverage;
pub mod edge;
pub mod error;
pub mod find_union;
pub mod graph;
pub mod locus;
pub mod mer;
pub mod node;
pub mod path;
pub mod read_info;
pub mod tandem;
pub mod transcript;
#[macro_use]
extern crate log;

pub use config::AssemblyConfig;
pub use error::{AlignError, AssemblyError};
pub use graph::Graph;
pub use locus::LocusAssembler;

//! Compiled contract artifacts: lookup by name, library linking and
//! constructor encoding for Hardhat's `hh-sol-artifact-1` format.

use std::path::PathBuf;
use thiserror::Error;

mod factory;
mod link;
mod store;

pub use factory::ContractFactory;
pub use link::{link, Libraries};
pub use store::{Artifact, ArtifactStore, LinkReference};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("No artifact found for {0}")]
    NotFound(String),
    #[error("Invalid contract name {0}")]
    InvalidName(String),
    #[error("Multiple artifacts match {name}: {}", candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed artifact {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0} has no creation bytecode")]
    NotDeployable(String),
    #[error("{contract} needs library {library} but no address was given for it")]
    MissingLibrary { contract: String, library: String },
    #[error("{contract} does not link against library {library}")]
    UnneededLibrary { contract: String, library: String },
    #[error("Library name {library} is ambiguous for {contract}: {}", candidates.join(", "))]
    AmbiguousLibrary {
        contract: String,
        library: String,
        candidates: Vec<String>,
    },
    #[error("Library {library} is bound more than once for {contract}")]
    DuplicateLibrary { contract: String, library: String },
    #[error("{contract} has an invalid link reference for {library} at byte {start}")]
    InvalidLinkReference {
        contract: String,
        library: String,
        start: usize,
    },
    #[error("{contract} bytecode is not valid hex: {reason}")]
    InvalidBytecode { contract: String, reason: String },
    #[error("{contract} constructor takes {expected} arguments, got {got}")]
    ConstructorArity {
        contract: String,
        expected: usize,
        got: usize,
    },
    #[error("Failed to encode {contract} constructor arguments: {reason}")]
    Constructor { contract: String, reason: String },
}

pub mod artifact;
pub mod job;
pub mod loaders;
pub mod manifest;
pub mod namespace;
pub mod term_set;

pub use artifact::{ArtifactKind, ArtifactPaths, ArtifactSet};
pub use job::{Job, JobState};
pub use loaders::{discover_input_files, load_term_blob};
pub use manifest::BatchManifest;
pub use namespace::Namespace;
pub use term_set::TermSet;

pub mod batch_processor;
pub mod file_processor;

pub use batch_processor::{App, BatchOutcome};
pub use file_processor::{process_file, FileStats};

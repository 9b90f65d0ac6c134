pub mod input_loader;

pub use input_loader::{discover_input_files, load_term_blob};

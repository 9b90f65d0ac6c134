pub mod revigo_client;

pub use revigo_client::{JobService, RevigoClient};

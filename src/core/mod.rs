pub mod config;
pub mod control;

pub use config::{Config, ExportConfig, ParserConfig};
pub use control::{FormControl, FILES_CHANNEL};

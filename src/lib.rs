pub mod analysis;
pub mod config;
pub mod constants;
pub mod error;
pub mod error_ext;
pub mod extractors;
pub mod loader;
pub mod render;
pub mod types;

pub use analysis::{parse, parse_export, parse_with, LineagePipeline, ParsedConfig};
pub use config::{ConfigManager, LineageConfig};
pub use error::{LineageError, Result};
pub use render::render;

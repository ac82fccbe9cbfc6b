pub mod chain;
pub mod environments;
pub mod interpreter;
pub mod params;
pub mod pipeline;
pub mod reducer;
pub mod registry;

pub use chain::ChainBuilder;
pub use environments::{extract_environment_table, infer_environment};
pub use interpreter::VariableInterpreter;
pub use params::extract_output_params;
pub use pipeline::{parse, parse_export, parse_with, LineagePipeline, ParsedConfig};
pub use reducer::ultimate_sources;
pub use registry::VariableRegistry;

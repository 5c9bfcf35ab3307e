pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod fs;
pub mod generator;
pub mod logging;
pub mod model;
pub mod output;
pub mod parser;
pub mod style;
pub mod transform;

pub use api::{Aas2PumlError, aas2puml, generator_for};
pub use cli::Cli;
pub use commands::{cmd_batch, cmd_generate};
pub use config::Config;
pub use generator::{AasPumlGenerator, DiagramOptions, GeneratorSettings};
pub use model::Domain;
pub use parser::{Collector, PythonCollector};

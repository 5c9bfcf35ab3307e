use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "aas2puml")]
#[command(about = "Generate PlantUML class diagrams to document your Python AAS application")]
#[command(version, disable_version_flag = true)]
pub struct Cli {
    /// The filepath to the domain
    pub path: PathBuf,

    /// The module name of the domain
    pub module: String,

    /// Restrict the diagram to these submodules (comma-separated)
    #[arg(short = 's', long = "submodule", value_delimiter = ',')]
    pub submodules: Vec<String>,

    /// Only draw these classes, in this order (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub keep: Vec<String>,

    /// Copy inherited attributes into each class
    #[arg(long)]
    pub include_parent_members: bool,

    /// Sort class members alphabetically
    #[arg(long)]
    pub sort_members: bool,

    /// Output format
    #[arg(short, long, default_value = "puml")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write every configured diagram into this directory
    #[arg(long, value_name = "DIR", conflicts_with_all = ["keep", "output"])]
    pub batch: Option<PathBuf>,

    /// Configuration file (defaults to <PATH>/.aas2puml.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `aas2puml::transform=trace`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    pub version: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Puml,
    Json,
}

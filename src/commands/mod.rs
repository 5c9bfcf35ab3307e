mod batch;
mod generate;

pub use batch::cmd_batch;
pub use generate::cmd_generate;

use crate::cli::Cli;
use crate::config::Config;
use crate::generator::{AasPumlGenerator, DiagramOptions, GeneratorSettings};
use crate::parser::PythonCollector;
use crate::style;
use std::path::PathBuf;

/// Shared context for command execution, reducing boilerplate across commands.
pub struct CommandContext {
    pub path: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// Resolve the package path and load the configuration.
    /// Returns Err(exit_code) if setup fails.
    pub fn new(cli: &Cli) -> Result<Self, i32> {
        let resolved_path = match cli.path.canonicalize() {
            Ok(p) => p,
            Err(_) => {
                style::error(&format!("Could not resolve path: {}", style::path(&cli.path)));
                return Err(1);
            }
        };

        // An explicitly named config file must load; the implicit one may fall back.
        let config = match &cli.config {
            Some(config_path) => match Config::from_file(config_path) {
                Ok(config) => config,
                Err(e) => {
                    style::error(&format!(
                        "Failed to load config {}: {}",
                        style::path(config_path),
                        e
                    ));
                    return Err(1);
                }
            },
            None => Config::load(&resolved_path).unwrap_or_else(|e| {
                style::warning(&format!("Failed to load config: {}. Using defaults.", e));
                Config::default()
            }),
        };

        Ok(Self {
            path: resolved_path,
            config,
        })
    }

    /// Generator settings, command-line values taking precedence.
    pub fn settings(&self, cli: &Cli) -> GeneratorSettings {
        let submodules = if cli.submodules.is_empty() {
            self.config.submodules.clone()
        } else {
            cli.submodules.clone()
        };
        GeneratorSettings::new(&self.path, &cli.module)
            .with_submodules(submodules)
            .with_references(self.config.references.clone())
    }

    pub fn diagram_options(&self, cli: &Cli) -> DiagramOptions {
        DiagramOptions::default()
            .with_parent_members(cli.include_parent_members || self.config.include_parent_members)
            .with_sorted_members(cli.sort_members || self.config.sort_members)
    }

    /// Collect the package. Returns Err(exit_code) on failure.
    pub fn generator(&self, cli: &Cli) -> Result<AasPumlGenerator, i32> {
        AasPumlGenerator::new(self.settings(cli), &PythonCollector).map_err(|e| {
            style::error(&e.to_string());
            1
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_diagram_options_merge_cli_and_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(crate::config::CONFIG_FILE),
            "include_parent_members = true\n",
        )
        .unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["aas2puml", path.as_str(), "pkg", "--sort-members"]).unwrap();

        let ctx = CommandContext::new(&cli).unwrap();
        let options = ctx.diagram_options(&cli);

        assert!(options.include_parent_members);
        assert!(options.sort_members);
        assert!(options.keep.is_none());
    }
}

use crate::api::Aas2PumlError;
use crate::cli::{Cli, OutputFormat};
use crate::fs::{FileSystem, default_fs};
use crate::generator::{AasPumlGenerator, DiagramOptions};
use crate::output::{JsonOutput, OutputFormatter};
use crate::style;
use std::io::{self, Write};
use std::path::Path;

use super::CommandContext;

pub fn cmd_generate(cli: &Cli) -> i32 {
    let ctx = match CommandContext::new(cli) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let generator = match ctx.generator(cli) {
        Ok(generator) => generator,
        Err(code) => return code,
    };

    let mut options = ctx.diagram_options(cli);
    if !cli.keep.is_empty() {
        options.keep = Some(generator.resolve_names(&cli.keep));
    }

    run_generate_with_fs(
        &generator,
        &options,
        cli.format,
        cli.output.as_deref(),
        default_fs(),
    )
}

fn run_generate_with_fs(
    generator: &AasPumlGenerator,
    options: &DiagramOptions,
    format: OutputFormat,
    output: Option<&Path>,
    fs: &dyn FileSystem,
) -> i32 {
    let text = match render(generator, options, format) {
        Ok(text) => text,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    match output {
        Some(output_path) => {
            if let Err(e) = fs.write(output_path, &text) {
                style::error(&format!("Failed to write output file: {}", e));
                return 1;
            }
            style::success(&format!("Diagram written to: {}", style::path(output_path)));
        }
        None => {
            if let Err(e) = io::stdout().write_all(text.as_bytes()) {
                style::error(&format!("Failed to write output: {}", e));
                return 1;
            }
        }
    }

    0
}

/// Diagram text in the requested format, newline-terminated.
fn render(
    generator: &AasPumlGenerator,
    options: &DiagramOptions,
    format: OutputFormat,
) -> Result<String, Aas2PumlError> {
    match format {
        OutputFormat::Puml => {
            let mut text = generator.generate_puml(options)?;
            text.push('\n');
            Ok(text)
        }
        OutputFormat::Json => {
            let domain = generator.diagram_domain(options)?;
            let mut buffer = Vec::new();
            JsonOutput::new().format(&domain, &mut buffer)?;
            Ok(String::from_utf8_lossy(&buffer).into_owned())
        }
    }
}

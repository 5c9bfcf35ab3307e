use crate::api::Aas2PumlError;
use crate::cli::Cli;
use crate::config::Config;
use crate::fs::{FileSystem, default_fs};
use crate::generator::{AasPumlGenerator, DiagramOptions};
use crate::parser::last_segment;
use crate::style;
use std::path::{Path, PathBuf};
use tracing::info;

use super::CommandContext;

pub fn cmd_batch(cli: &Cli) -> i32 {
    let Some(dir) = cli.batch.as_deref() else {
        style::error("Batch mode needs an output directory");
        return 2;
    };

    let ctx = match CommandContext::new(cli) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let generator = match ctx.generator(cli) {
        Ok(generator) => generator,
        Err(code) => return code,
    };

    let options = ctx.diagram_options(cli);
    match run_batch_with_fs(&generator, &ctx.config, &options, dir, default_fs()) {
        Ok(written) => {
            style::success(&format!(
                "Wrote {} diagrams to {}",
                written.len(),
                style::path(dir)
            ));
            0
        }
        Err(e) => {
            style::error(&e.to_string());
            1
        }
    }
}

/// Write the numbered diagrams, the whole-package diagram and one diagram
/// per item. Every diagram is cut from the same collected domain.
fn run_batch_with_fs(
    generator: &AasPumlGenerator,
    config: &Config,
    base: &DiagramOptions,
    dir: &Path,
    fs: &dyn FileSystem,
) -> Result<Vec<PathBuf>, Aas2PumlError> {
    fs.create_dir_all(dir)?;
    let mut written = Vec::new();

    for (offset, classes) in config.diagrams.iter().enumerate() {
        let keep = generator.resolve_names(classes);
        let first = keep.first().map(|fqn| last_segment(fqn)).unwrap_or("diagram");
        let path = dir.join(format!("{}_{}.puml", config.batch.first_index + offset, first));

        let options = DiagramOptions {
            keep: Some(keep.clone()),
            ..base.clone()
        };
        write_diagram(generator, &options, &path, fs)?;
        written.push(path);
    }

    let classes_dir = dir.join("classes");
    if config.batch.all_classes || config.batch.per_class {
        fs.create_dir_all(&classes_dir)?;
    }

    if config.batch.all_classes {
        let module = &generator.settings().domain_module;
        let path = classes_dir.join(format!("{}_all.puml", module));
        write_diagram(generator, base, &path, fs)?;
        written.push(path);
    }

    if config.batch.per_class {
        for fqn in generator.domain().items.keys() {
            let path = classes_dir.join(format!("{}.puml", last_segment(fqn)));
            let options = DiagramOptions {
                keep: Some(vec![fqn.clone()]),
                include_parent_members: true,
                sort_members: base.sort_members,
            };
            write_diagram(generator, &options, &path, fs)?;
            written.push(path);
        }
    }

    Ok(written)
}

fn write_diagram(
    generator: &AasPumlGenerator,
    options: &DiagramOptions,
    path: &Path,
    fs: &dyn FileSystem,
) -> Result<(), Aas2PumlError> {
    info!(path = %path.display(), "writing diagram");
    let text = generator.generate_puml(options)?;
    fs.write(path, &text)?;
    Ok(())
}

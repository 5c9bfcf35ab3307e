use aas2puml::cli::Cli;
use aas2puml::logging::init_logging;
use aas2puml::{cmd_batch, cmd_generate, style};
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level.as_deref()) {
        style::warning(&format!("Logging disabled: {}", e));
    }

    let exit_code = if cli.batch.is_some() {
        cmd_batch(&cli)
    } else {
        cmd_generate(&cli)
    };

    std::process::exit(exit_code);
}

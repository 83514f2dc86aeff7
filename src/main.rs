// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use clap::Parser;

use fallwatch::cli::args::{Cli, Commands};
use fallwatch::cli::logging::{init_tracing, set_verbose};
use fallwatch::cli::replay::{run_frames, run_text};
use fallwatch::error;

fn main() {
    let cli = Cli::parse();

    let verbose = cli.command.verbose();
    set_verbose(verbose);
    init_tracing(verbose);

    let result = match &cli.command {
        Commands::Frames(args) => run_frames(args).map(|_| ()),
        Commands::Text(args) => run_text(args),
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

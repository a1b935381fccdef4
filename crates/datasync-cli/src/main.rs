use clap::Parser;

use datasync_cli::{Cli, execute};

fn main() {
    let cli = Cli::parse();
    // Every guard is dropped inside `execute`, so exiting here cannot leak the lock file.
    std::process::exit(execute(&cli));
}

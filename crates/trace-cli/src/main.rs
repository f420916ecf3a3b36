//! CLI for replaying recorded XSLT traces

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use xslt_trace_cli::{init_tracing, run, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, &mut out)?;
    out.flush()?;
    Ok(())
}

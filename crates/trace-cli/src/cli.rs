//! CLI argument parsing using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Replay recorded XSLT trace events
#[derive(Parser, Debug)]
#[command(name = "xslt-trace")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the complete trace of a recorded run
    xslt-trace render events.json

    # Emit the checkpoint report as JSON lines, built-in rules included
    xslt-trace report events.json --xml input.xml --xsl main.xsl --include-built-in
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Detail level 0-3 (none, low, normal, high)
    #[arg(long = "detail", global = true)]
    pub detail: Option<u8>,

    /// Report nodes produced by built-in template rules
    #[arg(long = "include-built-in", global = true)]
    pub include_built_in: bool,

    /// JSON configuration file
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log builder activity to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the complete rendered trace
    Render {
        /// JSON array of canonical events
        events: PathBuf,

        /// Leave out the banner between top-level traces
        #[arg(long = "no-separator")]
        no_separator: bool,
    },

    /// Emit the full checkpoint report as JSON lines
    Report {
        /// JSON array of canonical events
        events: PathBuf,

        /// Source document of the transformation
        #[arg(long = "xml")]
        xml: PathBuf,

        /// Main stylesheet
        #[arg(long = "xsl")]
        xsl: PathBuf,

        /// Imported stylesheet, may be repeated
        #[arg(long = "import")]
        imports: Vec<PathBuf>,

        /// Serialized transformation result
        #[arg(long = "output")]
        output: Option<PathBuf>,

        /// Correlation id scoping every checkpoint
        #[arg(long = "correlation-id", default_value = "xslt-trace")]
        correlation_id: String,
    },
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Frames Options:
    --input, -i <INPUT>    JSON Lines file of frames, or - for stdin
    --config, -c <CONFIG>  YAML engine configuration
    --debounce <N>         Consecutive positive frames needed to confirm a fall
    --threshold <T>        Single-frame fall score threshold
    --verbose              Show progress and debug tracing on stderr

Text Options:
    --sentiment <S>        Sentiment score of the text in [-1, 1] [default: 0]
    --config, -c <CONFIG>  YAML engine configuration

Examples:
    fallwatch frames --input frames.jsonl
    fallwatch frames -i - --debounce 3 < frames.jsonl
    fallwatch frames -i frames.jsonl --config fallwatch.yaml --verbose
    fallwatch text "今天很开心" --sentiment 0.4
    fallwatch text "有点担心" --sentiment -0.2"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a stream of pose frames and print fall events
    Frames(FramesArgs),
    /// Classify the emotion of a piece of text
    Text(TextArgs),
}

/// Arguments for the frames command.
#[derive(Args, Debug)]
pub struct FramesArgs {
    /// JSON Lines file of frames, or - for stdin
    #[arg(short, long)]
    pub input: String,

    /// YAML engine configuration
    #[arg(short, long)]
    pub config: Option<String>,

    /// Consecutive positive frames needed to confirm a fall
    #[arg(long)]
    pub debounce: Option<u32>,

    /// Single-frame fall score threshold
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Show verbose output
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

/// Arguments for the text command.
#[derive(Args, Debug)]
pub struct TextArgs {
    /// Text to classify
    pub text: String,

    /// Sentiment score of the text in [-1, 1]
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub sentiment: f64,

    /// YAML engine configuration
    #[arg(short, long)]
    pub config: Option<String>,

    /// Show verbose output
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl Commands {
    /// Whether the selected command asked for verbose output.
    pub const fn verbose(&self) -> bool {
        match self {
            Self::Frames(args) => args.verbose,
            Self::Text(args) => args.verbose,
        }
    }
}

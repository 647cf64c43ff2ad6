//! Command-line front end for the pagegrab pipeline. All logic lives in
//! the engine; this binary parses flags, wires the plan, and prints the
//! event stream.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use grab_logging::LogDestination;
use pagegrab_engine::{
    extract_to_file, BatchEvent, BatchHandle, BatchPlan, CaptureConfig, RunMode, StreamEvent,
};

/// Extract links from a page, then batch-download or screenshot them.
#[derive(Parser)]
#[command(name = "pagegrab", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a seed page and save its links as a reviewable list.
    Extract(ExtractArgs),
    /// Process a link file: download pages, take screenshots, or both.
    Run(RunArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Seed page URL.
    #[arg(long)]
    url: String,

    /// Keep only anchors whose href matches this case-insensitive pattern.
    #[arg(long)]
    filter: Option<String>,

    /// Output format for the link file.
    #[arg(long, value_enum, default_value = "txt")]
    format: FileFormat,

    /// Directory for the link file.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    /// Link file produced by `extract` (and possibly hand-edited).
    #[arg(long)]
    links_file: PathBuf,

    /// Base URL for resolving root-relative links.
    #[arg(long)]
    base_url: String,

    /// Process only lines matching this case-insensitive keyword.
    #[arg(long)]
    keyword: Option<String>,

    /// What to do with each link.
    #[arg(long, value_enum, default_value = "both")]
    mode: Mode,

    /// Extension for downloaded pages and the summary file.
    #[arg(long, value_enum, default_value = "txt")]
    format: FileFormat,

    /// Automation driver executable (required for screenshots).
    #[arg(long, default_value = "")]
    driver_path: PathBuf,

    /// Browser executable (required for screenshots).
    #[arg(long, default_value = "")]
    browser_path: PathBuf,

    /// Root directory for output artifacts.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum FileFormat {
    Txt,
    Html,
}

impl FileFormat {
    fn extension(self) -> &'static str {
        match self {
            FileFormat::Txt => "txt",
            FileFormat::Html => "html",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Pages,
    Screenshots,
    Both,
}

impl From<Mode> for RunMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Pages => RunMode::Pages,
            Mode::Screenshots => RunMode::Screenshots,
            Mode::Both => RunMode::Both,
        }
    }
}

fn main() -> ExitCode {
    grab_logging::initialize(LogDestination::Terminal);
    let cli = Cli::parse();
    match cli.command {
        Command::Extract(args) => run_extract(args),
        Command::Run(args) => run_batch(args),
    }
}

fn run_extract(args: ExtractArgs) -> ExitCode {
    match extract_to_file(
        &args.url,
        args.filter.as_deref(),
        args.format.extension(),
        &args.out,
    ) {
        Ok(path) => {
            println!("links saved to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("extraction failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_batch(args: RunArgs) -> ExitCode {
    let handle = BatchHandle::spawn(BatchPlan {
        links_file: args.links_file,
        base_url: args.base_url,
        keyword: args.keyword,
        mode: args.mode.into(),
        extension: args.format.extension().to_string(),
        output_root: args.out,
        capture: CaptureConfig::new(args.driver_path, args.browser_path),
    });

    let mut finished = 0;
    let mut failures = 0;
    while finished < handle.stream_count() {
        let Some(StreamEvent { stream, event }) = handle.recv() else {
            break;
        };
        match event {
            BatchEvent::Progress { percent } => println!("[{stream}] {percent}%"),
            BatchEvent::Log { message } => println!("[{stream}] {message}"),
            BatchEvent::Finished { results } => {
                let failed = results.iter().filter(|r| r.outcome.is_err()).count();
                failures += failed;
                println!(
                    "[{stream}] done: {} ok, {} failed",
                    results.len() - failed,
                    failed
                );
                finished += 1;
            }
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

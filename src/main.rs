//! magbind - build a magazine issue's EPUB

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use magbind::{BuildOptions, BuildReport, build_issue};

#[derive(Parser)]
#[command(name = "magbind")]
#[command(version, about = "Build a magazine issue EPUB from its content directory", long_about = None)]
#[command(after_help = "EXAMPLES:
    magbind                         Build the issue in the current directory
    magbind --root issue-12         Build the issue in issue-12/
    magbind --output-dir dist       Write the EPUB to dist/")]
struct Cli {
    /// Issue directory (containing content/, images/ and stylesheet.css)
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Directory for the EPUB (defaults to the issue directory)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Print the build report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    issue_number: u32,
    output_path: &'a std::path::Path,
    section_count: usize,
    asset_count: usize,
    warnings: Vec<String>,
}

impl<'a> From<&'a BuildReport> for JsonReport<'a> {
    fn from(report: &'a BuildReport) -> Self {
        Self {
            issue_number: report.issue_number,
            output_path: &report.output_path,
            section_count: report.section_count,
            asset_count: report.asset_count,
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut options = BuildOptions::new(&cli.root);
    if let Some(dir) = cli.output_dir {
        options = options.with_output_dir(dir);
    }

    match build_issue(&options) {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string_pretty(&JsonReport::from(&report)) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else if !cli.quiet {
                println!(
                    "Issue {}: {} sections, {} assets -> {}",
                    report.issue_number,
                    report.section_count,
                    report.asset_count,
                    report.output_path.display()
                );
                for warning in &report.warnings {
                    println!("warning: {warning}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

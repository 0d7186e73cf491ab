use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use avrc_data::app::App;
use avrc_data::catalog::Catalog;
use avrc_data::config::{ConfigLoader, Settings};
use avrc_data::disk::SystemDiskSpace;
use avrc_data::error::AvrcError;
use avrc_data::http::HttpTransport;
use avrc_data::output::{ConsoleProgress, HumanOutput, JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "avrc")]
#[command(about = "AVrC toolkit for downloading viral sequence subsets")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true, help = "Path to an avrc.json settings file")]
    config: Option<String>,

    #[arg(long, global = true, help = "Print machine-readable JSON results")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Download AVrC data subsets")]
    Download(DownloadArgs),
}

#[derive(Args)]
struct DownloadArgs {
    #[arg(value_parser = clap::builder::PossibleValuesParser::new(Catalog::builtin().all_names()))]
    subset: Option<String>,

    #[arg(short, long, default_value = ".", help = "Output directory")]
    output: PathBuf,

    #[arg(long, help = "List available subsets")]
    list: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(avrc) = report.downcast_ref::<AvrcError>() {
            return ExitCode::from(map_exit_code(avrc));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &AvrcError) -> u8 {
    match error {
        AvrcError::UnknownSubset(_) | AvrcError::ConfigRead(_) | AvrcError::ConfigParse(_) => 2,
        AvrcError::RemoteMetadata { .. }
        | AvrcError::MissingFileInfo(_)
        | AvrcError::Transfer { .. }
        | AvrcError::ChecksumMismatch { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let settings = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Download(args) => run_download(args, &settings, output_mode),
    }
}

fn run_download(
    args: DownloadArgs,
    settings: &Settings,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let transport = HttpTransport::new(settings)?;
    let app = App::new(
        Catalog::builtin(),
        transport,
        SystemDiskSpace,
        settings.record_url.clone(),
    );

    if args.list {
        let result = app.list_subsets()?;
        match output_mode {
            OutputMode::Json => JsonOutput::print_list(&result).into_diagnostic()?,
            OutputMode::Human => HumanOutput::print_list(&result),
        }
        return Ok(());
    }

    let Some(subset) = args.subset else {
        return Err(miette::Report::msg(format!(
            "please specify a subset to download ({}) or use --list to see available subsets",
            app.catalog().all_names().join(", ")
        )));
    };

    match output_mode {
        OutputMode::Json => {
            let result = app.download_subset(&subset, &args.output, &JsonOutput)?;
            JsonOutput::print_download(&result).into_diagnostic()?;
        }
        OutputMode::Human => {
            let progress = ConsoleProgress::new();
            let result = app.download_subset(&subset, &args.output, &progress)?;
            HumanOutput::print_download(&result);
        }
    }
    Ok(())
}

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use mdciao_examples::app::{App, DEFAULT_NOTEBOOKS_FOLDER, FetchOptions, Unzip};
use mdciao_examples::clt::{Clt, ExampleClts};
use mdciao_examples::config::{ConfigLoader, ResolvedConfig};
use mdciao_examples::datasets::{DATASETS, DEFAULT_ALIAS};
use mdciao_examples::download::{
    ConsoleProgress, DatasetClient, HttpDatasetClient, ProgressSink, SilentProgress,
};
use mdciao_examples::error::ExamplesError;
use mdciao_examples::output::{CltListing, JsonOutput, OutputMode};
use mdciao_examples::resolver::{AcceptDecider, ConsoleDecider, RenameDecider};

#[derive(Parser)]
#[command(name = "mdc-examples")]
#[command(about = "Show or run mdciao example calls and fetch example datasets")]
#[command(version, author)]
struct Cli {
    /// Never prompt; accept generated names and print JSON.
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List the example command-line tools")]
    List,
    #[command(about = "Print the example call of a tool")]
    Show(CltArgs),
    #[command(about = "Execute the example call of a tool")]
    Run(CltArgs),
    #[command(about = "List the downloadable example datasets")]
    Datasets,
    #[command(about = "Download (and unzip) an example dataset")]
    Fetch(FetchArgs),
    #[command(about = "Copy the example notebooks into a new folder")]
    Notebooks(NotebooksArgs),
}

#[derive(Args)]
struct CltArgs {
    /// e.g. mdc_neighborhoods or mdc_neighborhoods.py
    clt: String,

    /// Use short flag names.
    #[arg(long)]
    short: bool,

    /// Refer to inputs by basename and append -ni.
    #[arg(long)]
    test: bool,
}

#[derive(Args)]
struct FetchArgs {
    #[arg(default_value = DEFAULT_ALIAS)]
    alias_or_url: String,

    #[arg(long, conflicts_with = "unzip_to")]
    no_unzip: bool,

    /// Save as NAME.zip and extract into NAME/.
    #[arg(long, value_name = "NAME")]
    unzip_to: Option<String>,

    #[arg(long)]
    skip_on_existing: bool,
}

#[derive(Args)]
struct NotebooksArgs {
    #[arg(default_value = DEFAULT_NOTEBOOKS_FOLDER)]
    folder: String,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<ExamplesError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ExamplesError) -> u8 {
    match error {
        ExamplesError::UnknownDataset { .. } | ExamplesError::UnknownClt { .. } => 2,
        ExamplesError::Http(_) | ExamplesError::HttpStatus { .. } => 3,
        ExamplesError::PathsExhausted { .. } => 4,
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
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };
    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let cwd = std::env::current_dir().into_diagnostic()?;

    match cli.command {
        Commands::List => run_list(output_mode),
        Commands::Show(args) => {
            let clt: Clt = args.clt.parse()?;
            let clts = ExampleClts::new(&config.sample_files(), &cwd, args.test, args.short);
            print!("{}", clts.show(clt));
            Ok(())
        }
        Commands::Run(args) => {
            let clt: Clt = args.clt.parse()?;
            let clts = ExampleClts::new(&config.sample_files(), &cwd, args.test, args.short);
            if matches!(output_mode, OutputMode::Interactive) {
                print!("{}", clts.show(clt));
            }
            let outputs = clts.run(clt, &cwd)?;
            for output in outputs.iter().filter(|output| !output.status.success()) {
                tracing::warn!("{clt} exited with {}", output.status);
            }
            Ok(())
        }
        Commands::Datasets => run_datasets(output_mode),
        Commands::Fetch(args) => run_fetch(args, &config, cwd, output_mode),
        Commands::Notebooks(args) => run_notebooks(args, &config, cwd, output_mode),
    }
}

struct NopClient;

impl DatasetClient for NopClient {
    fn download(
        &self,
        _url: &str,
        _destination: &std::path::Path,
        _label: &str,
        _sink: &dyn ProgressSink,
    ) -> Result<u64, ExamplesError> {
        Err(ExamplesError::Http("download client not configured".to_string()))
    }
}

fn decider_for(output_mode: OutputMode) -> Box<dyn RenameDecider> {
    match output_mode {
        OutputMode::Interactive => Box::new(ConsoleDecider::stdio()),
        OutputMode::NonInteractive => Box::new(AcceptDecider),
    }
}

fn run_list(output_mode: OutputMode) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => {
            JsonOutput::print_clts(&CltListing::from_clts(&Clt::ALL)).into_diagnostic()
        }
        OutputMode::Interactive => {
            for clt in Clt::ALL {
                println!("{clt}");
            }
            Ok(())
        }
    }
}

fn run_datasets(output_mode: OutputMode) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_datasets(DATASETS).into_diagnostic(),
        OutputMode::Interactive => {
            for dataset in DATASETS {
                println!("{:<14}{}", dataset.alias, dataset.url);
                println!("{:<14}{}", "", dataset.description);
            }
            Ok(())
        }
    }
}

fn run_fetch(
    args: FetchArgs,
    config: &ResolvedConfig,
    cwd: std::path::PathBuf,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let FetchArgs {
        alias_or_url,
        no_unzip,
        unzip_to,
        skip_on_existing,
    } = args;
    let unzip = match (no_unzip, unzip_to) {
        (true, _) => Unzip::No,
        (false, Some(name)) => Unzip::Into(name),
        (false, None) => Unzip::Yes,
    };
    let options = FetchOptions {
        unzip,
        skip_on_existing,
    };

    let client = HttpDatasetClient::new(config.timeout)?;
    let app = App::new(config.sample_files(), cwd, client);
    let mut decider = decider_for(output_mode);

    match output_mode {
        OutputMode::NonInteractive => {
            let result =
                app.fetch_example_data(&alias_or_url, &options, decider.as_mut(), &SilentProgress)?;
            JsonOutput::print_fetch(&result).into_diagnostic()
        }
        OutputMode::Interactive => {
            let result = app.fetch_example_data(
                &alias_or_url,
                &options,
                decider.as_mut(),
                &ConsoleProgress::new(),
            )?;
            for name in &result.skipped {
                println!("No unzipping of '{name}': file already exists.");
            }
            println!("{}", result.output_path());
            Ok(())
        }
    }
}

fn run_notebooks(
    args: NotebooksArgs,
    config: &ResolvedConfig,
    cwd: std::path::PathBuf,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let app = App::new(config.sample_files(), cwd, NopClient);
    let mut decider = decider_for(output_mode);
    let result = app.notebooks(&args.folder, decider.as_mut())?;

    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_notebooks(&result).into_diagnostic(),
        OutputMode::Interactive => {
            println!("Here:");
            for path in &result.copied {
                println!(" {path}");
            }
            Ok(())
        }
    }
}

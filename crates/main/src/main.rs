use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use person_report::config::{executable_dir, DEFAULT_MAX_RECORDS};
use person_report::loader::DEFAULT_INPUT_FILE;
use person_report::{load_people, Locale, ReportBuilder, ReportConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Renders the person report from a JSON file.
///
/// Fonts are looked up in `PERSON_REPORT_FONTS_DIR`, then in `assets/fonts`
/// next to the executable, then in the crate's own `assets/fonts` directory.
#[derive(Parser)]
#[command(author, version, about = "Render people from JSON as a paginated PDF report")]
struct Cli {
    /// JSON file with the person records.
    #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
    input: PathBuf,

    /// Maximum number of people included in the report.
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RECORDS)]
    max_records: usize,

    /// Directory holding the `img/` assets. Defaults to the executable's directory.
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Directory the report is written to.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Currency format of the salary column (en-US or pt-BR).
    #[arg(long, default_value_t = Locale::EnUs)]
    locale: Locale,

    /// Do not open the report in the default viewer.
    #[arg(long)]
    no_open: bool,

    /// Log debug output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let people = load_people(&cli.input)?;
    info!("Loaded {} people from {}", people.len(), cli.input.display());

    let config = ReportConfig::default()
        .with_assets_dir(cli.assets_dir.unwrap_or_else(executable_dir))
        .with_output_dir(cli.output_dir)
        .with_locale(cli.locale)
        .with_max_records(cli.max_records)
        .with_open_viewer(!cli.no_open);

    match ReportBuilder::new(config).generate(&people)? {
        Some(path) => println!("{}", path.display()),
        None => info!("Nothing to report"),
    }
    Ok(())
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("person_report=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("person_report=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

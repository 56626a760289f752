use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use runner_analytics::{
    load_config, upload, AggregateMetrics, Config, CsvPipeline, OutputFormat, Report, Session,
};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Validate running-log CSV files and report mileage statistics
#[derive(Parser, Debug)]
#[command(name = "runner-analytics", version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(short, long, global = true, value_enum)]
    format: Option<FormatArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a CSV file against the required columns and row rules
    Validate {
        /// CSV file with `date`, `person` and `miles run` columns
        file: PathBuf,
    },
    /// Validate a CSV file and print overall and per-person statistics
    Report {
        file: PathBuf,

        /// Also show one runner's stats and timeline
        #[arg(short, long)]
        person: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let workdir = std::env::current_dir().context("Failed to read working directory")?;
    let config = load_config(&workdir, cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);
    debug!(?config, "configuration loaded");

    let format = cli.format.map(OutputFormat::from).unwrap_or(config.format);
    let pipeline = CsvPipeline::new().with_grammar(config.date_grammar());

    let success = match cli.command {
        Commands::Validate { file } => run_validate(&pipeline, &file, format).await?,
        Commands::Report { file, person } => {
            run_report(&pipeline, &file, person.as_deref(), format).await?
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_session(pipeline: &CsvPipeline, file: &Path) -> Result<Session> {
    info!(file = %file.display(), "processing upload");
    let handle = tokio::fs::File::open(file)
        .await
        .with_context(|| format!("Failed to open file: {}", file.display()))?;

    let session = Mutex::new(Session::new());
    upload(&session, pipeline, handle).await;
    Ok(session.into_inner())
}

async fn run_validate(pipeline: &CsvPipeline, file: &Path, format: OutputFormat) -> Result<bool> {
    let session = load_session(pipeline, file).await?;
    let success = session.errors().is_empty();

    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "success": success,
                "runs": session.records().len(),
                "errors": session.messages(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            if success {
                println!("✓ {}: {} runs accepted", file.display(), session.records().len());
            } else {
                print_errors(&session.messages());
            }
        }
    }

    Ok(success)
}

async fn run_report(
    pipeline: &CsvPipeline,
    file: &Path,
    person: Option<&str>,
    format: OutputFormat,
) -> Result<bool> {
    let mut session = load_session(pipeline, file).await?;
    if let Some(person) = person {
        if session.has_data() {
            session.select_person(person)?;
        }
    }

    let report = Report::from_session(&session);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    Ok(report.success)
}

// ============================================================================
// TEXT OUTPUT
// ============================================================================

fn print_errors(messages: &[String]) {
    println!("✗ Upload rejected ({} errors)", messages.len());
    for message in messages {
        println!("  - {}", message);
    }
}

fn print_cards(title: &str, metrics: &AggregateMetrics) {
    println!("\n{}", title);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Average Miles  {:>10.2}   per run", metrics.average);
    println!("  Minimum Miles  {:>10.2}   shortest run", metrics.min);
    println!("  Maximum Miles  {:>10.2}   longest run", metrics.max);
}

fn print_report(report: &Report) {
    if !report.success {
        print_errors(&report.errors);
        return;
    }

    println!("✓ {} runs accepted", report.runs);
    print_cards("Overall Performance", &report.overall);

    println!("\nIndividual Breakdown");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  {:<20} {:>8} {:>8} {:>8}", "Person", "Avg", "Min", "Max");
    for pm in &report.by_person {
        println!(
            "  {:<20} {:>8.2} {:>8.2} {:>8.2}",
            pm.person, pm.metrics.average, pm.metrics.min, pm.metrics.max
        );
    }

    println!("\nMiles Distribution by Person");
    for total in &report.distribution {
        println!("  {:<20} {:>8.2}", total.person, total.miles);
    }

    println!("\nWeekly Running Trends");
    for week in &report.weekly_trend {
        println!("  {:<20} {:>8.2} miles  {:>3} runs", week.label(), week.miles, week.runs);
    }

    println!("\nDaily Totals");
    for day in &report.daily_totals {
        println!("  {:<20} {:>8.2}", day.date, day.miles);
    }

    if let Some(selected) = &report.selected {
        print_cards(&format!("{}'s Stats", selected.metrics.person), &selected.metrics.metrics);
        for point in &selected.timeline {
            println!("  {:<20} {:>8.2}", point.date, point.miles);
        }
    }
}

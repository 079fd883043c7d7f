use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use skyscribe_core::{AppError, Config, ConfigError, Credentials, UnitSystem, ValidationResult};
use skyscribe_ui::{AppServices, ReportModel};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Current weather for a city, with a short AI-written summary.
#[derive(Debug, Parser)]
#[command(name = "skyscribe", version, about)]
struct Cli {
    /// City to look up. Without it, skyscribe prompts for cities until EOF.
    location: Option<String>,

    /// Unit system for the reading (metric, imperial, standard)
    #[arg(long, env = "SKYSCRIBE_UNITS")]
    units: Option<UnitSystem>,

    /// Skip narrative generation even when GEMINI_API_KEY is set
    #[arg(long)]
    no_narrative: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    skyscribe_core::init()?;
    let cli = Cli::parse();

    let mut config = match Config::load_validated() {
        Ok((config, _)) => config,
        Err(e) => return Ok(fatal(AppError::from_anyhow(e))),
    };
    if let Some(units) = cli.units {
        config.weather.units = units;
    }
    if cli.no_narrative {
        config.narrative.enabled = false;
    }

    let credentials = Credentials::from_env();
    let mut validation = ValidationResult::default();
    config.validate_credentials(&credentials, &mut validation);
    for warning in &validation.warnings {
        tracing::warn!("{}", warning);
    }
    if !validation.is_valid() {
        return Ok(fatal(ConfigError::MissingSetting(validation.error_summary()).into()));
    }

    let services = AppServices::new()?;
    services.init_pipeline(&config, &credentials)?;
    tracing::info!("Skyscribe started");

    let mut model = ReportModel::new(services.clone());
    let status = match cli.location {
        Some(location) => run_once(&mut model, &location, cli.json),
        None => run_interactive(&mut model, cli.json),
    };

    services.shutdown();
    status
}

/// Report a startup failure and pick the exit code
fn fatal(error: AppError) -> ExitCode {
    tracing::error!("{}", error);
    eprintln!("error: {}", error.user_message());
    ExitCode::from(2)
}

fn run_once(model: &mut ReportModel, location: &str, json: bool) -> Result<ExitCode> {
    query(model, location);
    render(model, json)?;

    Ok(if model.has_data() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_interactive(model: &mut ReportModel, json: bool) -> Result<ExitCode> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("Enter City Name: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }

        query(model, &line);
        render(model, json)?;
        println!();
    }

    Ok(ExitCode::SUCCESS)
}

/// Start a request and pump the model until it settles.
fn query(model: &mut ReportModel, location: &str) {
    if !model.request(location) {
        return;
    }
    eprintln!("{}", model.status_message());

    while model.loading() {
        if !model.poll_channel() {
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

fn render(model: &ReportModel, json: bool) -> Result<()> {
    if !model.error_message().is_empty() {
        eprintln!("error: {}", model.error_message());
        return Ok(());
    }

    if json {
        if let Some(report) = model.report() {
            println!("{}", serde_json::to_string_pretty(&report.summary())?);
        }
        return Ok(());
    }

    if !model.has_data() {
        return Ok(());
    }

    println!("{}", model.location_label());
    println!(
        "  Temperature: {} (feels like {})",
        model.temperature_label(),
        model.feels_like_label()
    );
    println!("  Humidity:    {}", model.humidity_label());
    println!("  Wind:        {}", model.wind_label());
    println!("  Conditions:  {}", model.condition_label());

    if !model.narrative_label().is_empty() {
        println!();
        println!("{}", model.narrative_label());
    }
    if !model.warning_message().is_empty() {
        eprintln!("warning: {}", model.warning_message());
    }

    Ok(())
}

use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;
use serde::Serialize;

use timepicker_core::{
    allowed::AllowedMap,
    clock::{format_display, ClockMode},
    config::{TimeInput, TimepickerConfig},
    errors,
    field::TimeField,
    reconcile::RangeViolation,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FieldArgs {
    /// JSON config file (mode, minDate, maxDate, value, enableInvalidInputDialog)
    #[arg(long)]
    config: Option<PathBuf>,
    /// "12h" or "24h"
    #[arg(long)]
    mode: Option<ClockMode>,
    /// Minimum time, "HH:MM" or "YYYY-MM-DDTHH:MM"
    #[arg(long)]
    min: Option<TimeInput>,
    /// Maximum time, "HH:MM" or "YYYY-MM-DDTHH:MM"
    #[arg(long)]
    max: Option<TimeInput>,
    /// Date that bare times are placed on (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl FieldArgs {
    fn load(&self) -> errors::Result<(TimepickerConfig, NaiveDate)> {
        let mut config = match &self.config {
            Some(path) => {
                log::info!("Loading config: {}", path.to_string_lossy());
                TimepickerConfig::load(path)?
            }
            None => TimepickerConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if self.min.is_some() {
            config.min_date = self.min;
        }
        if self.max.is_some() {
            config.max_date = self.max;
        }

        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        Ok((config, date))
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Commit typed text the way a time field would
    Parse {
        text: String,
        #[command(flatten)]
        field: FieldArgs,
        /// Report whether the out-of-range notification would fire
        #[arg(long)]
        notify: bool,
    },
    /// Print the selectable minutes of every hour
    Grid {
        #[command(flatten)]
        field: FieldArgs,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseReport {
    input: String,
    value: Option<String>,
    display: Option<String>,
    out_of_range: Option<RangeViolation>,
    notify: bool,
}

fn iso_minutes(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M").to_string()
}

fn run() -> errors::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();

    match &cli.command {
        Commands::Parse {
            text,
            field,
            notify,
        } => {
            let (mut config, date) = field.load()?;
            if *notify {
                config.enable_invalid_input_dialog = true;
            }

            let now = Local::now().naive_local();
            let mut time_field = TimeField::new(&config, date, now);
            let outcome = time_field.input_changed(text);

            if outcome.notify {
                log::warn!("{:?} is outside the allowed range", text);
            }

            let report = ParseReport {
                input: text.clone(),
                value: outcome.value.as_ref().map(iso_minutes),
                display: outcome.value.map(|v| format_display(&v, config.mode)),
                out_of_range: outcome.violation,
                notify: outcome.notify,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Grid { field } => {
            let (config, date) = field.load()?;
            let map = AllowedMap::build(config.mode, &config.bounds(date));
            println!("{}", serde_json::to_string_pretty(&map.selectable_minutes())?);
            Ok(())
        }
    }
}

fn main() {
    if let Err(e) = run() {
        log::error!("{}", e);
        ::std::process::exit(1);
    }
}

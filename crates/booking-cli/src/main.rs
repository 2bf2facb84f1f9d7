//! `booking` CLI: convert booking times, check form configs and call the
//! public booking API from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Local slot start (and end) to backend UTC strings
//! booking utc --date 2024-07-01 --time 09:00 --timezone America/New_York --duration 30
//!
//! # Backend UTC string back to wall-clock time
//! booking local --utc "2024-07-01 13:00:00" --timezone America/New_York
//!
//! # Summarize a form config (roots, steps)
//! booking schema -i form.json
//!
//! # Validate answers against a form (exit code 1 when invalid)
//! booking validate -i form.json --data answers.json --step details
//!
//! # Build the create-booking request from captured input
//! booking payload -i booking.json --event-id 17 --org-id 4
//!
//! # Query availability (uses --config / BOOKING_API_URL)
//! booking slots --org acme --event demo --date 2024-05-01 --duration 30
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` to see outgoing requests.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use booking_engine::{
    add_duration_utc_with_policy, to_local, to_utc_with_policy, AvailabilityClient, BookingInput,
    BookingPayloadBuilder, ClientConfig, DstPolicy, HttpTransport, PublicBookingApi, SlotQuery,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use form_engine::{validate_form, validate_step, visible_form_fields, FormData, FormSchema};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "booking", version, about = "Public booking toolkit CLI")]
struct Cli {
    /// TOML client config (base_url, token, timeout_secs, default_timezone, buffer_hours)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a local date and time to backend UTC strings
    Utc {
        /// Calendar date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Time of day (HH:MM)
        #[arg(long)]
        time: String,
        /// IANA timezone; the time is taken as UTC if omitted
        #[arg(long)]
        timezone: Option<String>,
        /// Slot length in minutes; also prints the end time
        #[arg(long)]
        duration: Option<i64>,
        /// Reject times that fall in a DST gap or overlap
        #[arg(long)]
        strict: bool,
    },
    /// Convert a backend UTC string to wall-clock time in a timezone
    Local {
        #[arg(long)]
        utc: String,
        #[arg(long)]
        timezone: String,
    },
    /// Summarize a form config: root fields and steps
    Schema {
        /// Field list JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Validate answers against a form config
    Validate {
        /// Field list JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Answers JSON object
        #[arg(long)]
        data: String,
        /// Only validate the fields of this step
        #[arg(long)]
        step: Option<String>,
    },
    /// Build a create-booking request from captured booking input
    Payload {
        /// Booking input JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        event_id: String,
        #[arg(long)]
        org_id: String,
        /// Timezone recorded when the input has none
        #[arg(long)]
        fallback_timezone: Option<String>,
    },
    /// Fetch bookable slots for an event
    Slots {
        #[arg(long)]
        org: String,
        #[arg(long)]
        event: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        duration: u32,
        #[arg(long)]
        timezone: Option<String>,
        /// Defaults to the configured buffer_hours
        #[arg(long)]
        buffer_hours: Option<u32>,
    },
    /// Show the booking behind a manage link token
    Booking { token: String },
    /// Cancel the booking behind a manage link token
    Cancel {
        token: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Utc {
            date,
            time,
            timezone,
            duration,
            strict,
        } => {
            let policy = if strict {
                DstPolicy::Reject
            } else {
                DstPolicy::Compatible
            };
            let timezone = timezone.as_deref();
            let start = to_utc_with_policy(date, &time, timezone, policy)
                .context("Failed to convert start time")?;
            let mut out = json!({ "start_time": start });
            if let Some(minutes) = duration {
                let end = add_duration_utc_with_policy(date, &time, minutes, timezone, policy)
                    .context("Failed to compute end time")?;
                out["end_time"] = json!(end);
            }
            print_json(&out)?;
        }
        Commands::Local { utc, timezone } => {
            let local = to_local(&utc, &timezone).context("Failed to convert UTC time")?;
            println!("{}", local.format("%Y-%m-%d %H:%M:%S"));
        }
        Commands::Schema { input } => {
            let schema = read_schema(input.as_deref())?;
            let ids = |fields: Vec<&form_engine::FieldDefinition>| -> Vec<String> {
                fields.into_iter().map(|f| f.id.clone()).collect()
            };
            let steps: Vec<Value> = schema
                .steps()
                .into_iter()
                .map(|step| {
                    json!({
                        "id": step.id,
                        "label": step.label,
                        "fields": ids(schema.step_fields(step)),
                    })
                })
                .collect();
            print_json(&json!({
                "fields": schema.fields().len(),
                "root_fields": ids(schema.root_fields()),
                "has_steps": schema.has_steps(),
                "steps": steps,
            }))?;
        }
        Commands::Validate { input, data, step } => {
            let schema = read_schema(input.as_deref())?;
            let answers: FormData = serde_json::from_str(&read_input(Some(data.as_str()))?)
                .context("Answers must be a JSON object")?;

            let report = match step {
                Some(step) => validate_step(
                    schema
                        .step_fields_by_id(&step)
                        .context("Failed to resolve step")?,
                    &answers,
                ),
                None => validate_form(visible_form_fields(&schema, &answers), &answers),
            };
            print_json(&serde_json::to_value(&report)?)?;
            if report.has_errors {
                process::exit(1);
            }
        }
        Commands::Payload {
            input,
            event_id,
            org_id,
            fallback_timezone,
        } => {
            let booking: BookingInput = serde_json::from_str(&read_input(input.as_deref())?)
                .context("Failed to parse booking input")?;
            let fallback = match fallback_timezone {
                Some(tz) => tz,
                None => load_config(cli.config.as_ref())?.timezone(),
            };
            let submission = BookingPayloadBuilder::new(fallback)
                .build(&booking, event_id, org_id)
                .context("Failed to build booking payload")?;
            print_json(&json!({
                "path": submission.path(),
                "payload": submission.payload,
            }))?;
        }
        Commands::Slots {
            org,
            event,
            date,
            duration,
            timezone,
            buffer_hours,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let client = AvailabilityClient::new(Arc::new(transport(&config)?));
            let mut query = SlotQuery::new(event, org, date, duration)
                .with_buffer_hours(buffer_hours.unwrap_or(config.buffer_hours));
            if let Some(tz) = timezone {
                query = query.with_timezone(tz);
            }
            let slots = client
                .get_slots(&query)
                .await
                .context("Failed to fetch available slots")?;
            print_json(&serde_json::to_value(slots)?)?;
        }
        Commands::Booking { token } => {
            let api = public_api(cli.config.as_ref())?;
            let booking = api
                .booking_by_token(&token)
                .await
                .context("Failed to fetch booking")?;
            print_json(&booking)?;
        }
        Commands::Cancel { token, reason } => {
            let api = public_api(cli.config.as_ref())?;
            let result = api
                .cancel_booking(&token, reason.as_deref())
                .await
                .context("Failed to cancel booking")?;
            print_json(&result)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ClientConfig> {
    ClientConfig::load(path.map(PathBuf::as_path)).context("Failed to load client config")
}

fn transport(config: &ClientConfig) -> Result<HttpTransport> {
    HttpTransport::new(config).context("Failed to create HTTP transport")
}

fn public_api(config_path: Option<&PathBuf>) -> Result<PublicBookingApi> {
    let config = load_config(config_path)?;
    Ok(PublicBookingApi::new(Arc::new(transport(&config)?)))
}

fn read_schema(path: Option<&str>) -> Result<FormSchema> {
    let json = read_input(path)?;
    FormSchema::from_json(&json).context("Failed to parse form config")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

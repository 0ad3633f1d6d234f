//! `planner` CLI — compute weekly free time and place tasks into it.
//!
//! ## Usage
//!
//! ```sh
//! # Free intervals for the current week-number
//! planner free --profile profile.toml --events timetable.json
//!
//! # Place tasks (already in priority order) into that free time
//! planner schedule --profile profile.toml --events timetable.json --tasks tasks.json
//!
//! # Sort tasks by deadline and importance first, pin the clock, write to a file
//! planner schedule -p profile.toml -t tasks.json --prioritize \
//!     --now 2026-09-14T09:10 -o plan.json
//! ```
//!
//! Set `RUST_LOG=debug` (or pass `-v`) to trace each placed chunk on stderr.

mod profile;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use planner_engine::{
    compute_free_times, parse_deadline, prioritize, schedule_tasks, week_number, Importance,
    PlannerError, RecurringEvent, Schedule, Task,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::profile::Profile;

#[derive(Parser)]
#[command(
    name = "planner",
    version,
    about = "Weekly free-time calculator and task scheduler"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log scheduling decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the free intervals of every weekday as JSON
    Free {
        #[command(flatten)]
        week: WeekArgs,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Place tasks into free time and print the resulting schedule as JSON
    Schedule {
        #[command(flatten)]
        week: WeekArgs,
        /// Task list (JSON array)
        #[arg(short, long)]
        tasks: PathBuf,
        /// Sort tasks by deadline, then importance, before scheduling
        #[arg(long)]
        prioritize: bool,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct WeekArgs {
    /// Settings profile (TOML) with the week anchor and block-out rules
    #[arg(short, long)]
    profile: PathBuf,
    /// Recurring timetable events (JSON array)
    #[arg(short, long)]
    events: Option<PathBuf>,
    /// Reference time, e.g. 2026-09-14T09:10 (defaults to the current time)
    #[arg(long)]
    now: Option<String>,
}

/// A task as stored: the deadline is still a raw string.
#[derive(Debug, Deserialize)]
struct TaskRecord {
    id: String,
    #[serde(default)]
    name: String,
    remaining_hours: f64,
    min_chunk_hours: f64,
    deadline: String,
    #[serde(default)]
    importance: Importance,
    #[serde(default)]
    group: String,
}

impl TaskRecord {
    fn into_task(self) -> Result<Task, PlannerError> {
        let deadline = parse_deadline(&self.id, &self.deadline)?;
        Ok(Task {
            id: self.id,
            name: self.name,
            remaining_hours: self.remaining_hours,
            min_chunk_hours: self.min_chunk_hours,
            deadline,
            importance: self.importance,
            group: self.group,
        })
    }
}

#[derive(Serialize)]
struct ScheduleReport<'a> {
    now: NaiveDateTime,
    week_number: u32,
    #[serde(flatten)]
    schedule: &'a Schedule,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Free { week, output } => {
            let (profile, events, now) = load_week(&week)?;
            let free = compute_free_times(profile.week_anchor, &profile.block_outs, &events, now)
                .context("Failed to compute free time")?;
            info!(
                week_number = week_number(profile.week_anchor, now),
                free_minutes = free.total_free_minutes(),
                "computed free time"
            );
            let json = serde_json::to_string_pretty(&free)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Schedule {
            week,
            tasks,
            prioritize: sort,
            output,
        } => {
            let (profile, events, now) = load_week(&week)?;
            let (mut tasks, mut rejected) = read_tasks(&tasks)?;
            if sort {
                prioritize(&mut tasks);
            }

            let free = compute_free_times(profile.week_anchor, &profile.block_outs, &events, now)
                .context("Failed to compute free time")?;
            let mut schedule = schedule_tasks(&free, &tasks, now);
            rejected.append(&mut schedule.rejected);
            schedule.rejected = rejected;

            info!(
                chunks = schedule.chunks.len(),
                unscheduled = schedule.unscheduled().count(),
                rejected = schedule.rejected.len(),
                "scheduled tasks"
            );
            let report = ScheduleReport {
                now,
                week_number: week_number(profile.week_anchor, now),
                schedule: &schedule,
            };
            let json = serde_json::to_string_pretty(&report)?;
            write_output(output.as_deref(), &json)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_week(args: &WeekArgs) -> Result<(Profile, Vec<RecurringEvent>, NaiveDateTime)> {
    let profile = Profile::load(&args.profile)?;
    let events = match &args.events {
        Some(path) => read_json::<Vec<RecurringEvent>>(path)?,
        None => Vec::new(),
    };
    let now = match &args.now {
        Some(raw) => parse_now(raw)?,
        None => profile.current_time()?,
    };
    debug!(%now, events = events.len(), rules = profile.block_outs.len(), "loaded inputs");
    Ok((profile, events, now))
}

fn parse_now(raw: &str) -> Result<NaiveDateTime> {
    parse_deadline("--now", raw).map_err(|_| {
        anyhow::anyhow!(
            "Invalid --now value '{}'. Expected YYYY-MM-DDTHH:MM[:SS]",
            raw
        )
    })
}

/// Read task records. A record with an unparseable deadline is rejected on
/// its own; a file that is not a JSON array of records fails outright.
fn read_tasks(path: &Path) -> Result<(Vec<Task>, Vec<PlannerError>)> {
    let records: Vec<TaskRecord> = read_json(path)?;
    let mut tasks = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for record in records {
        match record.into_task() {
            Ok(task) => tasks.push(task),
            Err(err) => {
                tracing::warn!(error = %err, "rejecting task record");
                rejected.push(err);
            }
        }
    }
    Ok((tasks, rejected))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

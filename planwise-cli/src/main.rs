use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use planwise_core::time::{now_in, parse_local_datetime, parse_tz};
use planwise_core::{
    PlacementPolicy, ScheduleRequest, ScheduleResponse, ScheduledEntry, Task, TaskParser, WorkHours,
    entries_to_ics, plan, reschedule, suggest_next,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "planwise", version, about = "Turn task text into a time-blocked week")]
struct Cli {
    /// IANA timezone for "now" and calendar export (overrides config)
    #[arg(long, global = true)]
    tz: Option<String>,

    /// Log scheduling decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a structured task from free text
    Parse {
        /// Task description, e.g. "Study for exam tomorrow, urgent, 2 hours"
        #[arg(required = true)]
        text: Vec<String>,

        /// Reference time for "today"/"tomorrow" (default: now)
        #[arg(long)]
        now: Option<String>,

        /// Emit a full task record with this id
        #[arg(long)]
        id: Option<String>,
    },

    /// Build a schedule from a JSON task list
    Schedule {
        /// JSON array of tasks (`-` for stdin)
        #[arg(long)]
        tasks: PathBuf,

        /// Range start (default: now)
        #[arg(long)]
        start: Option<String>,

        /// Range end, inclusive by date (default: start + 7 days)
        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        work_start: Option<String>,

        #[arg(long)]
        work_end: Option<String>,

        /// Also schedule completed tasks
        #[arg(long)]
        include_completed: bool,

        /// Place each task at most once across the range
        #[arg(long)]
        once: bool,

        /// Also write the schedule as an .ics file
        #[arg(long)]
        ics: Option<PathBuf>,
    },

    /// Move one task in an existing schedule
    Reschedule {
        /// Schedule JSON: an entry array or a `schedule` command result (`-` for stdin)
        #[arg(long)]
        schedule: PathBuf,

        #[arg(long)]
        task_id: String,

        /// New start time
        #[arg(long)]
        start: String,
    },

    /// Suggest the next task to work on
    Suggest {
        /// JSON array of tasks (`-` for stdin)
        #[arg(long)]
        tasks: PathBuf,
    },

    /// Manage ~/.planwise/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

/// Either a bare entry list or a `schedule` command result.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScheduleInput {
    Entries(Vec<ScheduledEntry>),
    Response(ScheduleResponse),
}

impl ScheduleInput {
    fn into_entries(self) -> Vec<ScheduledEntry> {
        match self {
            ScheduleInput::Entries(entries) => entries,
            ScheduleInput::Response(resp) => resp.schedule,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("planwise_core=debug,planwise=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config()?;
    let tz = parse_tz(cli.tz.as_deref().unwrap_or(&cfg.general.timezone))?;

    match cli.command {
        Command::Parse { text, now, id } => {
            let text = text.join(" ");
            let now = resolve_now(now.as_deref(), tz)?;
            let parser = TaskParser::new()?;
            let parsed = parser.parse(&text, now);
            match id {
                Some(id) => print_json(&parsed.into_task(id))?,
                None => print_json(&parsed)?,
            }
        }

        Command::Schedule {
            tasks,
            start,
            end,
            work_start,
            work_end,
            include_completed,
            once,
            ics,
        } => {
            let tasks = read_tasks(&tasks)?;
            let mut base = cfg.scheduler.clone();
            if once {
                base.placement = PlacementPolicy::OncePerRange;
            }

            let work_hours = if work_start.is_some() || work_end.is_some() {
                Some(WorkHours {
                    start: work_start,
                    end: work_end,
                })
            } else {
                None
            };
            let request = ScheduleRequest {
                start_date: start.as_deref().map(parse_local_datetime).transpose()?,
                end_date: end.as_deref().map(parse_local_datetime).transpose()?,
                work_hours,
                include_completed,
            };

            let response = plan(&base, &tasks, &request, now_in(tz))?;
            if let Some(path) = ics {
                let body = entries_to_ics(&response.schedule, tz)?;
                state::write_output(&path, &body)?;
                eprintln!("Wrote {} events to {}", response.schedule.len(), path.display());
            }
            print_json(&response)?;
        }

        Command::Reschedule {
            schedule,
            task_id,
            start,
        } => {
            let raw = state::read_input(&schedule)?;
            let input: ScheduleInput = serde_json::from_str(&raw)
                .with_context(|| format!("parse schedule {}", schedule.display()))?;
            let new_start = parse_local_datetime(&start)?;
            let entries = input.into_entries();

            if !entries.iter().any(|e| e.task_id == task_id) {
                tracing::warn!(%task_id, "task not found in schedule; returning it unchanged");
            }
            print_json(&reschedule(&task_id, entries, new_start))?;
        }

        Command::Suggest { tasks } => {
            let tasks = read_tasks(&tasks)?;
            match suggest_next(&tasks) {
                Some(task) => print_json(task)?,
                None => println!("null"),
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let s = toml::to_string_pretty(&cfg).context("serialize config")?;
                println!("# {}\n{}", config::config_path()?.display(), s);
            }
        },
    }

    Ok(())
}

fn resolve_now(now: Option<&str>, tz: Tz) -> Result<NaiveDateTime> {
    match now {
        Some(s) => parse_local_datetime(s),
        None => Ok(now_in(tz)),
    }
}

fn read_tasks(path: &Path) -> Result<Vec<Task>> {
    let raw = state::read_input(path)?;
    let tasks: Vec<Task> =
        serde_json::from_str(&raw).with_context(|| format!("parse tasks {}", path.display()))?;
    if let Some(bad) = tasks.iter().find(|t| !(1..=5).contains(&t.energy_level)) {
        bail!("task {} has energy_level {} (expected 1-5)", bad.id, bad.energy_level);
    }
    Ok(tasks)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_schedule_flags() {
        let cli = Cli::try_parse_from([
            "planwise",
            "schedule",
            "--tasks",
            "tasks.json",
            "--work-start",
            "08:00",
            "--once",
        ])
        .unwrap();
        match cli.command {
            Command::Schedule { work_start, once, .. } => {
                assert_eq!(work_start.as_deref(), Some("08:00"));
                assert!(once);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_schedule_input_accepts_both_shapes() {
        let bare = r#"[{"task_id":"a","title":"A","start_time":"2026-03-09T09:00:00","end_time":"2026-03-09T09:30:00","priority":2,"energy_level":3,"category":"Other"}]"#;
        let input: ScheduleInput = serde_json::from_str(bare).unwrap();
        assert_eq!(input.into_entries().len(), 1);

        let wrapped = format!(
            r#"{{"message":"ok","schedule":{bare},"start_date":"2026-03-09T08:00:00","end_date":"2026-03-16T08:00:00","tasks_scheduled":1}}"#
        );
        let input: ScheduleInput = serde_json::from_str(&wrapped).unwrap();
        assert_eq!(input.into_entries()[0].task_id, "a");
    }

    #[test]
    fn test_resolve_now_explicit() {
        let now = resolve_now(Some("2026-03-09T08:00"), Tz::UTC).unwrap();
        assert_eq!(now.to_string(), "2026-03-09 08:00:00");
    }
}

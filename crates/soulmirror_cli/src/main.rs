//! Operator command line for SoulMirror maintenance jobs.
//!
//! # Responsibility
//! - Load `CoreConfig`, open the database and run one maintenance command.
//! - Keep output line-oriented for cron logs.

use clap::{Args, Parser, Subcommand};
use log::error;
use soulmirror_core::model::now_epoch_ms;
use soulmirror_core::service::cache_service::{clear_ai_cache, CacheSelection};
use soulmirror_core::service::profile_service::ProfileService;
use soulmirror_core::service::stats_service::StatsService;
use soulmirror_core::service::task_service::TaskService;
use soulmirror_core::{init_from_config, open_db, AiAgent, CoreConfig};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "soulmirror", version, about = "SoulMirror maintenance commands")]
struct Cli {
    /// TOML config file; environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check core linkage.
    Ping,
    /// Assign one weekly task to every onboarded user who needs one.
    GenerateWeeklyTasks,
    /// Delete stored advice, tarot readings and natal charts.
    ClearAiCache(ClearArgs),
    /// Print statistics for one user.
    Stats {
        #[arg(long)]
        username: String,
    },
}

#[derive(Debug, Args)]
struct ClearArgs {
    #[arg(long)]
    all: bool,
    #[arg(long)]
    advice: bool,
    #[arg(long)]
    tarot: bool,
    #[arg(long)]
    natal: bool,
}

impl ClearArgs {
    fn selection(&self) -> CacheSelection {
        if self.all {
            return CacheSelection::all();
        }
        CacheSelection {
            advice: self.advice,
            tarot: self.tarot,
            natal: self.natal,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Command::Ping = cli.command {
        println!("soulmirror_core ping={}", soulmirror_core::ping());
        println!("soulmirror_core version={}", soulmirror_core::core_version());
        return Ok(());
    }

    let config = CoreConfig::load(cli.config.as_deref())?;
    init_from_config(&config)?;
    let conn = open_db(&config.database_path)?;

    match cli.command {
        Command::Ping => Ok(()),
        Command::GenerateWeeklyTasks => {
            let agent = AiAgent::ollama(&config.generator);
            let service = TaskService::new(&conn, &agent, config.tasks);
            let report = service.generate_weekly_tasks(&mut rand::thread_rng(), now_epoch_ms())?;
            println!(
                "users={} created={} skipped_recent={} skipped_no_profile={} discarded={} failed={}",
                report.users_seen,
                report.created,
                report.skipped_recent,
                report.skipped_no_profile,
                report.discarded,
                report.failed
            );
            Ok(())
        }
        Command::ClearAiCache(args) => {
            let selection = args.selection();
            if selection.is_empty() {
                return Err("choose --all or at least one of --advice, --tarot, --natal".into());
            }
            let counts = clear_ai_cache(&conn, selection)?;
            println!(
                "advice={} tarot={} natal={} total={}",
                counts.advice,
                counts.tarot,
                counts.natal,
                counts.total()
            );
            Ok(())
        }
        Command::Stats { username } => {
            let user = ProfileService::new(&conn)
                .find_user(&username)?
                .ok_or_else(|| format!("user `{username}` not found"))?;
            let stats = StatsService::new(&conn).user_stats(user.id)?;

            println!("user={} level={} xp={}", stats.username, stats.level, stats.total_experience);
            println!(
                "tasks total={} completed={} in_progress={} books={} movies={} series={}",
                stats.tasks.total,
                stats.tasks.completed,
                stats.tasks.in_progress,
                stats.tasks.completed_books,
                stats.tasks.completed_movies,
                stats.tasks.completed_series
            );
            println!(
                "entries={} average_emotion={:.1} tarot_readings={}",
                stats.entries, stats.average_emotion, stats.tarot_readings
            );
            if let Some(current) = stats.current_sign {
                println!(
                    "inner_sign={} level={} xp={} progress={}%",
                    current.sign.display_name(),
                    current.level,
                    current.experience,
                    current.progress_percent
                );
            }
            for stat in &stats.top_signs {
                println!(
                    "top sign={} level={} xp={}",
                    stat.sign.display_name(),
                    stat.level,
                    stat.experience
                );
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn clear_all_selects_every_kind() {
        let cli = Cli::parse_from(["soulmirror", "clear-ai-cache", "--all"]);
        let Command::ClearAiCache(args) = cli.command else {
            panic!("expected clear-ai-cache");
        };
        let selection = args.selection();
        assert!(selection.advice && selection.tarot && selection.natal);
    }

    #[test]
    fn clear_without_flags_selects_nothing() {
        let cli = Cli::parse_from(["soulmirror", "--config", "/tmp/sm.toml", "clear-ai-cache"]);
        let Command::ClearAiCache(args) = cli.command else {
            panic!("expected clear-ai-cache");
        };
        assert!(args.selection().is_empty());
    }
}

//! Command-line arguments for the `classroom` binary.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use clap::{Parser, Subcommand, ValueEnum};
use classroom_core::model::ProfessorId;

/// Classroom analytics for professors.
///
/// Examples:
///   classroom report --professor prof-1
///   classroom report --professor prof-1 --format text --overview
///   classroom seed --professor prof-1 --students 30 --rng-seed 7
#[derive(Parser, Debug, Clone)]
#[command(name = "classroom", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// `SQLite` database URL or file path
    #[arg(
        long,
        global = true,
        env = "CLASSROOM_DB_URL",
        default_value = "sqlite://classroom.sqlite3",
        value_name = "URL",
        value_parser = parse_db_url
    )]
    pub db: String,

    /// Offset from UTC, in minutes, used for local calendar days
    #[arg(
        long,
        global = true,
        env = "CLASSROOM_UTC_OFFSET_MINUTES",
        default_value_t = 0,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-14 * 60..=14 * 60)
    )]
    pub utc_offset_minutes: i32,

    /// Enable debug logging when `RUST_LOG` is unset
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the analytics report for a professor
    Report(ReportArgs),
    /// Populate a demo classroom
    Seed(SeedArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Professor whose classroom is reported; a missing id yields the zero report
    #[arg(long, env = "CLASSROOM_PROFESSOR_ID")]
    pub professor: Option<ProfessorId>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Also print per-kind submission counts and the most active students
    #[arg(long)]
    pub overview: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SeedArgs {
    #[arg(long, env = "CLASSROOM_PROFESSOR_ID")]
    pub professor: ProfessorId,

    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub groups: u32,

    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(1..))]
    pub students: u32,

    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(1..))]
    pub lessons: u32,

    #[arg(long, default_value_t = 40)]
    pub submissions: u32,

    /// Seed for the random generator; equal seeds produce equal classrooms
    #[arg(long, default_value_t = 42)]
    pub rng_seed: u64,
}

impl Cli {
    /// The configured offset as a chrono value.
    #[must_use]
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
    }
}

fn parse_db_url(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() {
        return Err("database url must not be empty".to_string());
    }
    Ok(normalize_sqlite_url(raw))
}

/// Turn a bare or relative path into an absolute `sqlite://` URL.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:")
    {
        return raw.to_string();
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

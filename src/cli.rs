use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::commands::{self, CommandReport};

#[derive(Debug, Parser)]
#[command(name = "trendlog", author, version, about)]
pub struct Cli {
    /// Print the command report as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch today's items, rotate on the first of the month, merge and write.
    Run(RunArgs),
    /// Move one month's sections into its archive now.
    Rotate(RotateArgs),
    /// Regenerate the archive index block from the archive directory.
    Index(IndexArgs),
    /// List the sections of the live document.
    Sections(SectionsArgs),
    /// Show resolved paths, configuration and recognised environment.
    Status,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Run date (YYYY-MM-DD). Defaults to today in the configured timezone.
    #[arg(long)]
    pub date: Option<String>,

    /// Read items from a JSON/JSON5 file instead of the configured source.
    #[arg(long)]
    pub items: Option<String>,

    /// Compute everything, write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct RotateArgs {
    /// Month to archive (YYYY-MM).
    #[arg(long)]
    pub month: String,

    /// Compute everything, write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Compute everything, write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct SectionsArgs {
    /// Only list sections of this month (YYYY-MM).
    #[arg(long)]
    pub month: Option<String>,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let status = if report.ok { "ok" } else { "issues" };
    println!("{}: {status}", report.command);
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
    Ok(())
}

/// Runs the parsed command and returns whether its report was clean.
pub fn run() -> Result<bool> {
    let cli = Cli::parse();

    let report = match &cli.command {
        Command::Run(args) => commands::run::run(&commands::run::RunOptions {
            date: args.date.clone(),
            items_file: args.items.clone(),
            dry_run: args.dry_run,
        })?,
        Command::Rotate(args) => commands::rotate::run(&commands::rotate::RotateOptions {
            month: args.month.clone(),
            dry_run: args.dry_run,
        })?,
        Command::Index(args) => commands::index::run(&commands::index::IndexOptions {
            dry_run: args.dry_run,
        })?,
        Command::Sections(args) => commands::sections::run(&commands::sections::SectionsOptions {
            month: args.month.clone(),
        })?,
        Command::Status => commands::status::run()?,
    };

    print_report(&report, cli.json)?;
    Ok(report.ok)
}

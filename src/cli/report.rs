use std::fmt::Display;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use futures::TryStreamExt;

use crate::{
    daemon::storage::{
        entities::ENTRY_DURATION_MINUTES,
        entry_storage::{query_range, EntryStorage, EntryStorageImpl},
    },
    report::{
        compare, daily_report, writer::ReportWriter, Comparison, DailyReport, Delta, ReportError,
    },
    utils::{dir::create_application_default_path, time::local_day_bounds},
};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[arg(
        long,
        short,
        help = "Day to report on. Examples are \"today\", \"yesterday\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, short, help = "Persist the report as a JSON snapshot")]
    save: bool,
}

/// Command to process `report`. Renders how a day split across the category set.
pub async fn process_report_command(
    ReportCommand {
        date,
        date_style,
        save,
    }: ReportCommand,
) -> Result<()> {
    let date = parse_cli_date(date, date_style)?;

    let storage = EntryStorageImpl::new(create_application_default_path()?.join("entries"))?;
    let (start, end) = local_day_bounds(date);
    let entries: Vec<_> = query_range(storage, start, end).try_collect().await?;

    match daily_report(date, &entries) {
        Ok(report) => {
            print_report(&report);
            if save {
                let writer =
                    ReportWriter::new(create_application_default_path()?.join("reports"))?;
                let path = writer.write_snapshot(&report).await?;
                println!("Snapshot saved to {}", path.display());
            }
        }
        Err(ReportError::NoData(date)) => println!("No entries for {date}"),
    }
    Ok(())
}

#[derive(Debug, Parser)]
pub struct CompareCommand {
    #[arg(long, short, help = "Day under comparison. Defaults to today")]
    date: Option<String>,
    #[arg(
        long,
        short,
        help = "Baseline day. Defaults to the day before the compared one"
    )]
    baseline: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Command to process `compare`. Renders the productive-score change between two days.
pub async fn process_compare_command(
    CompareCommand {
        date,
        baseline,
        date_style,
    }: CompareCommand,
) -> Result<()> {
    let date_a = parse_cli_date(date, date_style)?;
    let date_b = match baseline {
        Some(_) => parse_cli_date(baseline, date_style)?,
        None => date_a
            .pred_opt()
            .expect("Beginning of time should never happen"),
    };

    let storage = EntryStorageImpl::new(create_application_default_path()?.join("entries"))?;
    let day_a = storage.load_day(date_a).await?;
    let day_b = storage.load_day(date_b).await?;

    match compare((date_a, &day_a.entries), (date_b, &day_b.entries)) {
        Ok(comparison) => print_comparison(&comparison),
        Err(ReportError::NoData(date)) => {
            println!("Not enough data for comparison, nothing recorded on {date}")
        }
    }
    Ok(())
}

/// Also provides the "today" default shared by both commands.
fn parse_cli_date(value: Option<String>, date_style: DateStyle) -> Result<NaiveDate> {
    let now = Local::now();
    match value.map(|s| parse_date_string(&s, now, date_style.into())) {
        Some(Ok(v)) => Ok(v.with_timezone(&Local).date_naive()),
        Some(Err(e)) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
        None => Ok(now.date_naive()),
    }
}

fn print_report(report: &DailyReport) {
    println!("Daily report for {}", report.date);
    for share in &report.shares {
        println!(
            "{}\t{}\t{}\t{}",
            share.category,
            share.count,
            share.percentage,
            format_duration(Duration::minutes(
                share.count as i64 * ENTRY_DURATION_MINUTES as i64
            )),
        );
    }
    println!(
        "Total tracked: {}",
        format_duration(Duration::minutes(report.total_minutes as i64))
    );
}

fn print_comparison(comparison: &Comparison) {
    println!(
        "Productive entries on {}: {}",
        comparison.date_a, comparison.productive_a
    );
    println!(
        "Productive entries on {}: {}",
        comparison.date_b, comparison.productive_b
    );
    match comparison.delta {
        Delta::Percent(percent) => println!("Change: {percent:+.1}%"),
        Delta::Undefined => println!(
            "Change: undefined, no productive entries on {} to compare against",
            comparison.date_b
        ),
    }
}

fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!("{}h{}m", v.num_hours(), v.num_minutes() % 60)
    } else {
        format!("{}m", v.num_minutes())
    }
}

//! Command modules for the analytics CLI
//!
//! Each subcommand drives a [`PageController`] the way a page would: load filter
//! options, apply the requested filters, submit, then render one or more sections.

pub mod details;
pub mod init;
pub mod report;
pub mod summary;
pub mod trend;

use chrono::NaiveDate;
use clap::Args;
use std::collections::BTreeSet;
use tracing::warn;

use crate::api::AnalyticsBackend;
use crate::controller::PageController;
use crate::display::DisplayManager;

pub use details::{run_details, DetailsArgs};
pub use init::run_init;
pub use report::run_report;
pub use summary::run_summary;
pub use trend::run_trend;

/// Date window and department filter shared by every query command.
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Window start (YYYY-MM-DD); defaults to the configured trailing window
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Window end (YYYY-MM-DD); defaults to the server date, or today
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Department code or name; repeat for several
    #[arg(long = "department", value_name = "DEPARTMENT")]
    pub departments: Vec<String>,
}

/// How a command finished once its output was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Complete,
    /// Output was produced but at least one section failed.
    Degraded,
}

/// Load filter options and apply `args`.
///
/// An init failure is not fatal: the window falls back to the local date and queries
/// are still attempted. Only a window given with both bounds can be rejected as
/// inverted.
pub async fn prepare<B: AnalyticsBackend>(
    controller: &mut PageController<B>,
    args: &QueryArgs,
) -> crate::error::Result<()> {
    if let Err(e) = controller.load_init().await {
        warn!(error = %e, "Continuing without filter options");
        controller.dismiss_error();
    }

    let default_start = controller.filter().start_date;
    let default_end = controller.filter().end_date;
    let start = args.start.unwrap_or(default_start);
    let end = args.end.unwrap_or(default_end);

    // A single explicit bound that crosses the default window drags the other bound
    // along, keeping the default window length where the calendar allows.
    let (start, end) = match (args.start, args.end) {
        (Some(_), None) if start > end => (start, start),
        (None, Some(_)) if start > end => {
            let start = end
                .checked_sub_signed(default_end - default_start)
                .unwrap_or(end);
            (start, end)
        }
        _ => (start, end),
    };
    controller.set_date_range(start, end)?;

    if !args.departments.is_empty() {
        let departments: BTreeSet<String> = args.departments.iter().cloned().collect();
        controller.select_departments(departments);
    }
    Ok(())
}

/// Print the error banner (text mode only) and classify the run.
pub fn finish<B: AnalyticsBackend>(
    controller: &PageController<B>,
    display: &DisplayManager,
    json: bool,
) -> CommandStatus {
    match controller.error() {
        Some(message) => {
            if !json {
                display.display_error(message);
            }
            CommandStatus::Degraded
        }
        None => CommandStatus::Complete,
    }
}

//! `details` command: one page of the detail table, optionally exported to CSV.

use anyhow::{bail, Result};
use clap::Args;
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::{finish, prepare, CommandStatus, QueryArgs};
use crate::api::AnalyticsBackend;
use crate::config::MAX_PAGE_SIZE;
use crate::controller::{PageController, Sections};
use crate::display::{DisplayManager, PageReport};
use crate::export::export_details;
use crate::sort::{DetailSortKey, SortDirection, SortState};

#[derive(Debug, Clone, Default, Args)]
pub struct DetailsArgs {
    /// Sort column: date, department, doctor, revenue, cost, quantity, yoy, mom
    #[arg(long)]
    pub sort: Option<DetailSortKey>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page to show (1-based; clamped to the last page)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page; defaults to the configured page size
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Doctor id; repeat for several
    #[arg(long = "doctor", value_name = "DOCTOR_ID")]
    pub doctors: Vec<String>,

    /// Write every filtered and sorted row to this CSV file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

impl DetailsArgs {
    pub fn sort_state(&self) -> SortState<DetailSortKey> {
        let direction = if self.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        SortState::new(self.sort.unwrap_or_default(), direction)
    }

    /// Apply table options to `controller` before the query is submitted.
    pub fn apply<B: AnalyticsBackend>(&self, controller: &mut PageController<B>) -> Result<()> {
        if let Some(size) = self.page_size {
            if size == 0 || size > MAX_PAGE_SIZE {
                bail!("Page size must be between 1 and {MAX_PAGE_SIZE}, got {size}");
            }
            controller.set_page_size(size);
        }
        if !self.doctors.is_empty() {
            let doctors: BTreeSet<String> = self.doctors.iter().cloned().collect();
            controller.select_doctors(doctors);
        }
        controller.set_sort(self.sort_state());
        Ok(())
    }
}

pub async fn run_details<B: AnalyticsBackend>(
    controller: &mut PageController<B>,
    display: &DisplayManager,
    args: &QueryArgs,
    table: &DetailsArgs,
    json: bool,
) -> Result<CommandStatus> {
    prepare(controller, args).await?;
    table.apply(controller)?;
    controller.submit_sections(Sections::DETAILS).await?;
    controller.go_to_page(table.page);

    if let Some(path) = &table.export {
        let written = export_details(path, &controller.processed_rows())?;
        if !json {
            println!("Exported {written} rows to {}", path.display());
        }
    }

    let module = controller.backend().module();
    let view = controller.view();
    if json {
        display.display_json(&PageReport {
            module,
            filter: controller.filter(),
            summary: None,
            details: Some(&view),
            trend: None,
            error: controller.error(),
        })?;
    } else {
        display.display_table(module, &view, controller.sort());
    }

    Ok(finish(controller, display, json))
}

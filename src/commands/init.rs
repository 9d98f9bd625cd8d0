//! `init` command: show the filter options a page offers.

use anyhow::Result;
use serde_json::json;
use tracing::info;

use super::CommandStatus;
use crate::api::AnalyticsBackend;
use crate::controller::PageController;
use crate::display::DisplayManager;

pub async fn run_init<B: AnalyticsBackend>(
    controller: &mut PageController<B>,
    display: &DisplayManager,
    json: bool,
) -> Result<CommandStatus> {
    controller.load_init().await?;
    info!(
        module = %controller.backend().module(),
        departments = controller.departments().len(),
        "Init loaded"
    );

    if json {
        let output = json!({
            "module": controller.backend().module(),
            "date": controller.server_date().map(|d| d.to_string()),
            "departments": controller.departments(),
            "doctors": controller.doctors(),
            "summary": controller.summary(),
        });
        display.display_json(&output)?;
    } else {
        display.display_options(controller.departments(), controller.doctors());
        if let Some(date) = controller.server_date() {
            println!("Server date: {date}");
        }
    }

    Ok(CommandStatus::Complete)
}

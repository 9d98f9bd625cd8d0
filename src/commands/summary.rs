//! `summary` command: the summary cards for a window.

use anyhow::Result;

use super::{finish, prepare, CommandStatus, QueryArgs};
use crate::api::AnalyticsBackend;
use crate::controller::{PageController, Sections};
use crate::display::{DisplayManager, PageReport};

pub async fn run_summary<B: AnalyticsBackend>(
    controller: &mut PageController<B>,
    display: &DisplayManager,
    args: &QueryArgs,
    json: bool,
) -> Result<CommandStatus> {
    prepare(controller, args).await?;
    controller.submit_sections(Sections::SUMMARY).await?;

    let module = controller.backend().module();
    if json {
        display.display_json(&PageReport {
            module,
            filter: controller.filter(),
            summary: controller.summary(),
            details: None,
            trend: None,
            error: controller.error(),
        })?;
    } else {
        display.display_summary(module, controller.filter(), controller.summary());
    }

    Ok(finish(controller, display, json))
}

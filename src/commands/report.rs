//! `report` command: summary, one detail page and the trend from a single query.

use anyhow::Result;

use super::{finish, prepare, CommandStatus, DetailsArgs, QueryArgs};
use crate::api::AnalyticsBackend;
use crate::controller::PageController;
use crate::display::{DisplayManager, PageReport};
use crate::trend::TrendMode;

pub async fn run_report<B: AnalyticsBackend>(
    controller: &mut PageController<B>,
    display: &DisplayManager,
    args: &QueryArgs,
    table: &DetailsArgs,
    mode: TrendMode,
    json: bool,
) -> Result<CommandStatus> {
    prepare(controller, args).await?;
    table.apply(controller)?;
    controller.set_trend_mode(mode);
    controller.submit().await?;
    controller.go_to_page(table.page);

    let module = controller.backend().module();
    let view = controller.view();
    let chart = controller.chart();

    if json {
        display.display_json(&PageReport {
            module,
            filter: controller.filter(),
            summary: controller.summary(),
            details: Some(&view),
            trend: Some(&chart),
            error: controller.error(),
        })?;
    } else {
        display.display_summary(module, controller.filter(), controller.summary());
        display.display_table(module, &view, controller.sort());
        display.display_trend(module, &chart);
    }

    Ok(finish(controller, display, json))
}

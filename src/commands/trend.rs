//! `trend` command: the chart series for a window.

use anyhow::Result;

use super::{finish, prepare, CommandStatus, QueryArgs};
use crate::api::AnalyticsBackend;
use crate::controller::{PageController, Sections};
use crate::display::{DisplayManager, PageReport};
use crate::trend::TrendMode;

pub async fn run_trend<B: AnalyticsBackend>(
    controller: &mut PageController<B>,
    display: &DisplayManager,
    args: &QueryArgs,
    mode: TrendMode,
    json: bool,
) -> Result<CommandStatus> {
    prepare(controller, args).await?;
    controller.set_trend_mode(mode);
    controller.submit_sections(Sections::TIMESERIES).await?;

    let module = controller.backend().module();
    let chart = controller.chart();
    if json {
        display.display_json(&PageReport {
            module,
            filter: controller.filter(),
            summary: None,
            details: None,
            trend: Some(&chart),
            error: controller.error(),
        })?;
    } else {
        display.display_trend(module, &chart);
    }

    Ok(finish(controller, display, json))
}

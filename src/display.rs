//! Output Formatting and Display Management
//!
//! Terminal rendering for analytics pages, plus the JSON form of the same data.
//!
//! ## Report Sections
//! - **Summary cards**: current total, YoY and MoM growth, bed-day growth for inpatient pages
//! - **Detail table**: one page of processed rows with a page footer, or a "No data" line
//! - **Trend series**: the chart datasets as aligned columns, one line per date
//! - **Filter options**: departments and doctors returned by `init`
//!
//! Every `render_*` method returns a `String` so output can be tested; the `display_*`
//! wrappers print it. Missing values render through [`crate::format`] as "-".

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::api::AnalyticsModule;
use crate::config::OutputConfig;
use crate::format::{
    format_currency, format_date, format_number, format_percent, text_or_placeholder,
};
use crate::models::{Department, DetailRow, Doctor, FilterState, SummaryViewModel};
use crate::sort::{DetailSortKey, SortDirection, SortState};
use crate::table::TableView;
use crate::trend::ChartData;

const RULE_WIDTH: usize = 96;
const NO_DATA: &str = "No data";

/// Everything one page shows, as emitted by `--json`.
#[derive(Debug, Serialize)]
pub struct PageReport<'a> {
    pub module: AnalyticsModule,
    pub filter: &'a FilterState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<&'a SummaryViewModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a TableView<DetailRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<&'a ChartData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

pub struct DisplayManager {
    currency_symbol: String,
    show_bed_metrics: bool,
    json_pretty: bool,
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self {
            currency_symbol: "¥".to_string(),
            show_bed_metrics: true,
            json_pretty: true,
        }
    }
}

impl DisplayManager {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            currency_symbol: output.currency_symbol.clone(),
            show_bed_metrics: output.show_bed_metrics,
            json_pretty: output.json_pretty,
        }
    }

    fn header(&self, title: &str) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        format!(
            "\n{}\n{}\n{}\n",
            rule.bright_cyan(),
            title.bright_white().bold(),
            rule.bright_cyan()
        )
    }

    fn window(filter: &FilterState) -> String {
        let mut line = format!(
            "{} {} → {}",
            "📅".bright_blue(),
            filter.start_date.to_string().bright_white().bold(),
            filter.end_date.to_string().bright_white().bold()
        );
        if !filter.selected_departments.is_empty() {
            let departments: Vec<&str> =
                filter.selected_departments.iter().map(String::as_str).collect();
            line.push_str(&format!(" • departments: {}", departments.join(", ").bright_cyan()));
        }
        if !filter.selected_doctors.is_empty() {
            let doctors: Vec<&str> = filter.selected_doctors.iter().map(String::as_str).collect();
            line.push_str(&format!(" • doctors: {}", doctors.join(", ").bright_cyan()));
        }
        line
    }

    fn percent(value: Option<f64>) -> String {
        let text = format_percent(value);
        match value {
            Some(v) if v > 0.0 => text.bright_green().to_string(),
            Some(v) if v < 0.0 => text.bright_red().to_string(),
            _ => text.dimmed().to_string(),
        }
    }

    pub fn render_summary(
        &self,
        module: AnalyticsModule,
        filter: &FilterState,
        summary: Option<&SummaryViewModel>,
    ) -> String {
        let mut out = self.header(&format!("Summary - {}", module.label()));
        out.push_str(&format!("\n{}\n\n", Self::window(filter)));

        let Some(summary) = summary else {
            out.push_str(&format!("   {}\n", NO_DATA.dimmed()));
            return out;
        };

        out.push_str(&format!(
            "   {:<18}{}\n",
            "Current total:",
            format_currency(Some(summary.current), &self.currency_symbol)
                .bright_green()
                .bold()
        ));
        out.push_str(&format!(
            "   {:<18}{}\n",
            "YoY growth:",
            Self::percent(summary.growth_rate)
        ));
        out.push_str(&format!(
            "   {:<18}{}\n",
            "MoM growth:",
            Self::percent(summary.mom_growth_rate)
        ));

        if self.show_bed_metrics && module.has_bed_metrics() {
            out.push_str(&format!(
                "   {:<18}{}\n",
                "Bed-day YoY:",
                Self::percent(summary.bed_growth_rate)
            ));
            out.push_str(&format!(
                "   {:<18}{}\n",
                "Bed-day MoM:",
                Self::percent(summary.bed_mom_growth_rate)
            ));
        }

        out
    }

    pub fn render_table(
        &self,
        module: AnalyticsModule,
        view: &TableView<DetailRow>,
        sort: SortState<DetailSortKey>,
    ) -> String {
        let mut out = self.header(&format!("Details - {}", module.label()));

        if view.is_empty() {
            out.push_str(&format!("\n   {}\n", NO_DATA.dimmed()));
            return out;
        }

        let arrow = match sort.direction {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        };
        let heading = |key: DetailSortKey, title: &str| {
            if key == sort.key {
                format!("{title}{arrow}")
            } else {
                title.to_string()
            }
        };

        out.push_str(&format!(
            "\n{:<12}{:<18}{:<16}{:>16}{:>16}{:>10}{:>10}{:>10}\n",
            heading(DetailSortKey::Date, "Date"),
            heading(DetailSortKey::Department, "Department"),
            heading(DetailSortKey::Doctor, "Doctor"),
            heading(DetailSortKey::Revenue, "Revenue"),
            heading(DetailSortKey::Cost, "Cost"),
            heading(DetailSortKey::Quantity, "Qty"),
            heading(DetailSortKey::Yoy, "YoY"),
            heading(DetailSortKey::Mom, "MoM"),
        ));
        out.push_str(&format!("{}\n", "-".repeat(RULE_WIDTH).dimmed()));

        for row in &view.rows {
            let department = row
                .department_name
                .as_deref()
                .or(row.department_code.as_deref());
            let doctor = row.doctor_name.as_deref().or(row.doctor_id.as_deref());
            out.push_str(&format!(
                "{:<12}{:<18}{:<16}{:>16}{:>16}{:>10}{:>10}{:>10}\n",
                format_date(&row.date),
                text_or_placeholder(department),
                text_or_placeholder(doctor),
                format_currency(row.revenue, &self.currency_symbol),
                format_currency(row.cost, &self.currency_symbol),
                format_number(row.quantity),
                format_percent(row.yoy_pct),
                format_percent(row.mom_pct),
            ));
        }

        out.push_str(&format!(
            "\n{} page {} of {} • {} rows\n",
            "📄".bright_yellow(),
            view.page.page_number.to_string().bright_white().bold(),
            view.page_count().to_string().bright_white().bold(),
            view.page.total_count.to_string().bright_white().bold()
        ));
        out
    }

    pub fn render_trend(&self, module: AnalyticsModule, chart: &ChartData) -> String {
        let mut out = self.header(&format!("Trend - {}", module.label()));

        if chart.labels.is_empty() {
            out.push_str(&format!("\n   {}\n", NO_DATA.dimmed()));
            return out;
        }

        out.push_str(&format!("\n{:<12}", "Date"));
        for dataset in &chart.datasets {
            out.push_str(&format!("{:>18}", dataset.label));
        }
        out.push('\n');
        out.push_str(&format!("{}\n", "-".repeat(12 + 18 * chart.datasets.len()).dimmed()));

        for (index, label) in chart.labels.iter().enumerate() {
            out.push_str(&format!("{label:<12}"));
            for dataset in &chart.datasets {
                let value = dataset.data.get(index).copied().unwrap_or(0.0);
                out.push_str(&format!("{value:>18.2}"));
            }
            out.push('\n');
        }
        out
    }

    pub fn render_options(&self, departments: &[Department], doctors: &[Doctor]) -> String {
        let mut out = self.header("Filter options");

        out.push_str(&format!(
            "\n{} Departments ({}):\n",
            "🏥".bright_blue(),
            departments.len().to_string().bright_white().bold()
        ));
        for department in departments {
            out.push_str(&format!(
                "   {:<12}{}\n",
                department.code.bright_cyan(),
                department.name
            ));
        }

        out.push_str(&format!(
            "\n{} Doctors ({}):\n",
            "🩺".bright_blue(),
            doctors.len().to_string().bright_white().bold()
        ));
        for doctor in doctors {
            out.push_str(&format!(
                "   {:<12}{:<16}{}\n",
                doctor.id.bright_cyan(),
                doctor.name,
                text_or_placeholder(
                    doctor
                        .department_name
                        .as_deref()
                        .or(doctor.department_code.as_deref())
                )
            ));
        }
        out
    }

    pub fn render_error(&self, message: &str) -> String {
        format!("{} {}", "⚠".bright_red().bold(), message.bright_red())
    }

    pub fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        if self.json_pretty {
            serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")
        } else {
            serde_json::to_string(value).context("Failed to serialize output to JSON")
        }
    }

    pub fn display_summary(
        &self,
        module: AnalyticsModule,
        filter: &FilterState,
        summary: Option<&SummaryViewModel>,
    ) {
        println!("{}", self.render_summary(module, filter, summary));
    }

    pub fn display_table(
        &self,
        module: AnalyticsModule,
        view: &TableView<DetailRow>,
        sort: SortState<DetailSortKey>,
    ) {
        println!("{}", self.render_table(module, view, sort));
    }

    pub fn display_trend(&self, module: AnalyticsModule, chart: &ChartData) {
        println!("{}", self.render_trend(module, chart));
    }

    pub fn display_options(&self, departments: &[Department], doctors: &[Doctor]) {
        println!("{}", self.render_options(departments, doctors));
    }

    /// Error banners go to stderr so they never mix with JSON on stdout.
    pub fn display_error(&self, message: &str) {
        eprintln!("{}", self.render_error(message));
    }

    pub fn display_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", self.to_json(value)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginate::PageState;
    use chrono::NaiveDate;

    fn filter() -> FilterState {
        FilterState::defaults(NaiveDate::from_ymd_opt(2025, 11, 14).unwrap(), 0)
    }

    #[test]
    fn test_summary_placeholders() {
        colored::control::set_override(false);
        let display = DisplayManager::default();
        let summary = SummaryViewModel {
            current: 1234.5,
            growth_rate: Some(12.346),
            ..Default::default()
        };

        let out = display.render_summary(AnalyticsModule::Outpatient, &filter(), Some(&summary));
        assert!(out.contains("¥1,234.50"));
        assert!(out.contains("+12.35%"));
        assert!(out.contains("MoM growth:       -"));
        assert!(!out.contains("Bed-day"));
    }

    #[test]
    fn test_bed_metrics_only_for_inpatient() {
        colored::control::set_override(false);
        let display = DisplayManager::default();
        let summary = SummaryViewModel::default();
        let out = display.render_summary(AnalyticsModule::Inpatient, &filter(), Some(&summary));
        assert!(out.contains("Bed-day YoY"));
    }

    #[test]
    fn test_empty_table_shows_no_data() {
        colored::control::set_override(false);
        let display = DisplayManager::default();
        let view = TableView {
            rows: Vec::new(),
            page: PageState::new(20),
        };
        let sort = SortState::new(DetailSortKey::Date, SortDirection::Ascending);
        let out = display.render_table(AnalyticsModule::Workload, &view, sort);
        assert!(out.contains("No data"));
        assert!(!out.contains("page 1 of"));
    }
}

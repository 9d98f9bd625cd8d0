//! Hospital Analytics Library
//!
//! Client-side core for hospital revenue and workload analytics pages: outpatient and
//! inpatient revenue, department workload, drug cost and prescription management.
//!
//! ## Architecture Overview
//!
//! A page issues one query (date window plus optional department/doctor filters), receives
//! the full result set and processes it locally:
//!
//! - [`api`] - endpoint prefixes, the [`api::AnalyticsBackend`] seam, wire normalisation
//!   and the reqwest client
//! - [`models`] - canonical row, summary and filter types
//! - [`filter`], [`sort`], [`paginate`] - the generic building blocks
//! - [`table`] - filter → sort → paginate composed for any [`table::TableRow`]
//! - [`trend`] - timeseries rows reshaped into chart datasets
//! - [`summary`] - month-over-month backfill from the prior window
//! - [`controller`] - [`controller::PageController`], the per-page view model
//! - [`display`], [`format`], [`export`] - terminal, JSON and CSV output
//! - [`config`], [`logging`], [`session`] - ambient setup
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hospital_analytics::api::{AnalyticsModule, HttpBackend};
//! use hospital_analytics::config::Config;
//! use hospital_analytics::controller::PageController;
//! use hospital_analytics::session::AnonymousSession;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let backend =
//!     HttpBackend::from_config(&config, AnalyticsModule::Inpatient, Arc::new(AnonymousSession))?;
//! let today = chrono::Local::now().date_naive();
//! let mut page = PageController::new(backend, config.view.page_size, 0, today);
//!
//! page.load_init().await.ok();
//! page.submit().await?;
//! let view = page.view();
//! println!("{} rows on {} pages", view.page.total_count, view.page_count());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod export;
pub mod filter;
pub mod format;
pub mod logging;
pub mod models;
pub mod paginate;
pub mod session;
pub mod sort;
pub mod summary;
pub mod table;
pub mod trend;

pub use controller::PageController;
pub use error::{AnalyticsError, Result};

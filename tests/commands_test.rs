//! Command bodies driven against a scripted backend

mod common;

use common::{date, refused, FakeBackend};
use hospital_analytics::commands::{prepare, run_summary, run_trend, CommandStatus, QueryArgs};
use hospital_analytics::controller::PageController;
use hospital_analytics::display::DisplayManager;
use hospital_analytics::trend::TrendMode;

fn args(start: Option<chrono::NaiveDate>, end: Option<chrono::NaiveDate>) -> QueryArgs {
    QueryArgs {
        start,
        end,
        departments: Vec::new(),
    }
}

#[tokio::test]
async fn test_end_before_default_start_moves_start() {
    let mut page = PageController::new(FakeBackend::default(), 20, 0, date(2025, 11, 20));
    prepare(&mut page, &args(None, Some(date(2025, 11, 10))))
        .await
        .unwrap();

    assert_eq!(page.filter().start_date, date(2025, 11, 10));
    assert_eq!(page.filter().end_date, date(2025, 11, 10));
}

#[tokio::test]
async fn test_end_only_keeps_trailing_window_length() {
    // Server date 2025-11-14 with a 7 day window gives 11-08..11-14
    let mut page = PageController::new(FakeBackend::default(), 20, 7, date(2025, 11, 20));
    prepare(&mut page, &args(None, Some(date(2025, 10, 31))))
        .await
        .unwrap();

    assert_eq!(page.filter().start_date, date(2025, 10, 25));
    assert_eq!(page.filter().end_date, date(2025, 10, 31));
}

#[tokio::test]
async fn test_start_after_default_end_moves_end() {
    let mut page = PageController::new(FakeBackend::default(), 20, 0, date(2025, 11, 20));
    prepare(&mut page, &args(Some(date(2025, 12, 1)), None))
        .await
        .unwrap();

    assert_eq!(page.filter().start_date, date(2025, 12, 1));
    assert_eq!(page.filter().end_date, date(2025, 12, 1));
}

#[tokio::test]
async fn test_explicit_inverted_window_is_rejected() {
    let mut page = PageController::new(FakeBackend::default(), 20, 0, date(2025, 11, 20));
    let result = prepare(
        &mut page,
        &args(Some(date(2025, 11, 20)), Some(date(2025, 11, 10))),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_summary_ignores_other_sections_failing() {
    let mut backend = FakeBackend::default();
    backend.details = refused();
    backend.timeseries = refused();

    let mut page = PageController::new(backend, 20, 0, date(2025, 11, 20));
    let status = run_summary(&mut page, &DisplayManager::default(), &args(None, None), true)
        .await
        .unwrap();

    assert_eq!(status, CommandStatus::Complete);
    assert!(page.summary().is_some());
    assert!(page.backend().calls_to("details").is_empty());
    assert!(page.backend().calls_to("timeseries").is_empty());
}

#[tokio::test]
async fn test_trend_degrades_only_on_its_own_section() {
    let mut backend = FakeBackend::default();
    backend.summary = refused();
    let mut page = PageController::new(backend, 20, 0, date(2025, 11, 20));
    let status = run_trend(
        &mut page,
        &DisplayManager::default(),
        &args(None, None),
        TrendMode::Mom,
        true,
    )
    .await
    .unwrap();
    assert_eq!(status, CommandStatus::Complete);
    assert!(page.backend().calls_to("summary").is_empty());

    let mut backend = FakeBackend::default();
    backend.timeseries = refused();
    let mut page = PageController::new(backend, 20, 0, date(2025, 11, 20));
    let status = run_trend(
        &mut page,
        &DisplayManager::default(),
        &args(None, None),
        TrendMode::Yoy,
        true,
    )
    .await
    .unwrap();
    assert_eq!(status, CommandStatus::Degraded);
}

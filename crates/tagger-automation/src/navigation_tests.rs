use std::sync::Arc;

use tagger_config::{NameBook, SettleStrategy, TaggerConfig};

use super::*;
use crate::state::SharedState;
use crate::testing::{Action, FakeDriver, FakeItem, FakePage, fast_config};

fn gallery() -> FakePage {
    FakePage::with_items(vec![
        FakeItem::new("First", &["Dennis"]),
        FakeItem::new("Second with Laura", &["Laura", "Bekah"]),
        FakeItem::new("", &["2019 Summer", "Dennis"]),
    ])
}

fn automation_with(page: FakePage, config: &TaggerConfig) -> (PageAutomation, FakeDriver) {
    let driver = FakeDriver::new(page);
    let automation = PageAutomation::new(
        Arc::new(driver.clone()),
        config,
        NameBook::default(),
        SharedState::new(),
    );
    (automation, driver)
}

#[tokio::test]
async fn test_next_clicks_image_then_presses_arrow() {
    let (mut automation, driver) = automation_with(gallery(), &fast_config());

    automation.navigate(Direction::Forward).await.unwrap();

    let page = driver.page();
    assert_eq!(page.current, 1);
    let first_click = page.log.iter().position(|a| matches!(a, Action::Click(..)));
    let first_key = page.log.iter().position(|a| *a == Action::Key("ArrowRight".to_string()));
    assert!(first_click.unwrap() < first_key.unwrap());
    assert_eq!(page.log[first_click.unwrap()], Action::Click(400.0, 250.0));
}

#[tokio::test]
async fn test_next_samples_and_injects() {
    let (mut automation, driver) = automation_with(gallery(), &fast_config());

    let report = automation.navigate(Direction::Forward).await.unwrap();

    assert_eq!(report.text.as_deref(), Some("Second with Laura"));
    assert_eq!(report.appended, vec!["Bekah"]);
    assert_eq!(report.location.as_deref(), Some("https://photos.google.com/photo/1"));
    assert_eq!(driver.page().live_text(), "Second with Laura Bekah ");

    let state = automation.state().snapshot();
    assert_eq!(state.last_known_location, report.location);
    assert_eq!(state.last_known_text.as_deref(), Some("Second with Laura Bekah "));
    assert_eq!(automation.nav_phase(), NavPhase::Idle);
}

#[tokio::test]
async fn test_previous_goes_back() {
    let (mut automation, driver) = automation_with(gallery(), &fast_config());
    automation.navigate(Direction::Forward).await.unwrap();
    automation.navigate(Direction::Forward).await.unwrap();

    let report = automation.navigate(Direction::Backward).await.unwrap();

    assert_eq!(driver.page().current, 1);
    assert_eq!(report.direction, Direction::Backward);
    assert!(driver.page().keys().contains(&"ArrowLeft".to_string()));
}

#[tokio::test]
async fn test_year_chip_not_injected() {
    let (mut automation, driver) = automation_with(gallery(), &fast_config());
    automation.navigate(Direction::Forward).await.unwrap();
    let report = automation.navigate(Direction::Forward).await.unwrap();

    assert_eq!(report.appended, vec!["Dennis"]);
    assert_eq!(driver.page().live_text(), " Dennis ");
}

#[tokio::test]
async fn test_falls_back_to_viewport_center_click() {
    let mut page = gallery();
    page.image = None;
    let (mut automation, driver) = automation_with(page, &fast_config());

    automation.navigate(Direction::Forward).await.unwrap();

    assert!(driver.page().log.contains(&Action::Click(500.0, 400.0)));
}

#[tokio::test]
async fn test_small_images_are_ignored() {
    let mut page = gallery();
    if let Some((rect, _)) = page.image.as_mut() {
        rect.width = 150.0;
    }
    let (mut automation, driver) = automation_with(page, &fast_config());

    automation.navigate(Direction::Forward).await.unwrap();
    assert!(driver.page().log.contains(&Action::Click(500.0, 400.0)));
}

#[tokio::test]
async fn test_failure_returns_to_idle_without_retry() {
    let mut page = gallery();
    page.fail_scripts = true;
    let (mut automation, driver) = automation_with(page, &fast_config());

    let err = automation.navigate(Direction::Forward).await.unwrap_err();

    assert!(matches!(err, AutomationError::Driver(_)));
    assert_eq!(automation.nav_phase(), NavPhase::Idle);
    assert_eq!(driver.page().log.len(), 1);
}

#[tokio::test]
async fn test_image_source_settle_stops_on_change() {
    let mut config = fast_config();
    config.timing.settle = SettleStrategy::ImageSource {
        timeout_ms: 2000,
        step_ms: 5,
    };
    let (mut automation, driver) = automation_with(gallery(), &config);

    let started = std::time::Instant::now();
    automation.navigate(Direction::Forward).await.unwrap();

    assert!(started.elapsed() < std::time::Duration::from_millis(1500));
    let probes = driver
        .page()
        .scripts()
        .iter()
        .filter(|s| **s == "main_image")
        .count();
    assert_eq!(probes, 2);
}

#[tokio::test]
async fn test_image_source_settle_gives_up_at_timeout() {
    let mut config = fast_config();
    config.timing.settle = SettleStrategy::ImageSource {
        timeout_ms: 30,
        step_ms: 5,
    };
    // last item: ArrowRight does nothing, src never changes
    let page = FakePage::with_items(vec![FakeItem::new("Only", &[])]);
    let (mut automation, _driver) = automation_with(page, &config);

    let report = automation.navigate(Direction::Forward).await.unwrap();
    assert_eq!(report.text.as_deref(), Some("Only"));
}

use super::*;

#[test]
fn test_defaults_match_gallery_page() {
    let config = TaggerConfig::default();
    assert_eq!(
        config.page.description_selector,
        r#"textarea[aria-label="Description"]"#
    );
    assert_eq!(config.page.label_window, 5);
    assert_eq!(config.page.distance_tie_threshold, 50.0);
    assert_eq!(config.timing.delete_all_presses, 50);
    assert_eq!(config.timing.settle, SettleStrategy::Fixed { delay_ms: 500 });
    assert!(config.validate().is_ok());
}

#[test]
fn test_lock_path_under_profile() {
    let browser = BrowserConfig {
        profile_dir: "/tmp/tagger-profile".to_string(),
        ..Default::default()
    };
    assert_eq!(
        browser.lock_path(),
        PathBuf::from("/tmp/tagger-profile/SingletonLock")
    );
}

#[test]
fn test_profile_path_expands_tilde() {
    let browser = BrowserConfig::default();
    assert!(!browser.profile_path().to_string_lossy().starts_with('~'));
}

#[test]
fn test_settle_image_source_from_toml() {
    let content = r#"
        [timing.settle]
        mode = "image_source"
        timeout_ms = 2000
    "#;
    let config: TaggerConfig = toml::from_str(content).unwrap();
    assert_eq!(
        config.timing.settle,
        SettleStrategy::ImageSource {
            timeout_ms: 2000,
            step_ms: 100
        }
    );
}

#[test]
fn test_duration_helpers() {
    let timing = TimingConfig::default();
    assert_eq!(timing.poll_interval(), Duration::from_millis(500));
    assert_eq!(timing.ready_timeout(), Duration::from_secs(30));
    assert_eq!(timing.stop_join_timeout(), Duration::from_secs(5));
    assert_eq!(timing.focus_verify_timeout(), Duration::from_millis(2000));
}

#[test]
fn test_validate_rejects_zero_label_window() {
    let mut config = TaggerConfig::default();
    config.page.label_window = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { ref field, .. }) if field == "page.label_window"
    ));
}

#[test]
fn test_validate_rejects_nan_threshold() {
    let mut config = TaggerConfig::default();
    config.page.distance_tie_threshold = f64::NAN;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_step() {
    let mut config = TaggerConfig::default();
    config.timing.settle = SettleStrategy::ImageSource {
        timeout_ms: 1000,
        step_ms: 0,
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_serialize_roundtrip_keeps_panel_selectors() {
    let config = TaggerConfig::default();
    let text = toml::to_string(&config).unwrap();
    let back: TaggerConfig = toml::from_str(&text).unwrap();
    assert_eq!(back.page.panel_selectors, config.page.panel_selectors);
}

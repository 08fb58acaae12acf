//! End-to-end run against a real Chrome.
//!
//! Needs a local Chrome/Chromium; run with `cargo test -- --ignored`.

use std::time::Duration;

use tagger_automation::{Lifecycle, TaggerController};
use tagger_config::{NameBook, TaggerConfig};

const PAGE: &str = r#"data:text/html,<html><body style="margin:0">
<div style="height:400px;overflow:auto" class="panel">
<textarea aria-label="Description" style="width:300px;height:60px;margin-top:150px">Dennis</textarea>
<div style="height:800px"></div>
</div>
<span class="Y8X4Pc">Laura</span>
</body></html>"#;

#[test]
#[ignore]
fn test_append_backspace_and_clear_in_chrome() {
    let profile = tempfile::tempdir().unwrap();
    let mut config = TaggerConfig::default();
    config.browser.profile_dir = profile.path().display().to_string();
    config.browser.debug_port = 9333;
    config.browser.start_url = PAGE.replace('\n', "");

    let controller = TaggerController::new(config, NameBook::default());
    controller.start(false, Duration::from_secs(30)).unwrap();
    assert_eq!(controller.state().lifecycle, Lifecycle::Ready);

    let wait = Duration::from_secs(10);
    controller.append_text(" X ").unwrap();
    assert_eq!(controller.read_description(wait).unwrap().as_deref(), Some("Dennis X "));

    controller.send_backspace().unwrap();
    assert_eq!(controller.read_description(wait).unwrap().as_deref(), Some("Dennis X"));

    controller.delete_all().unwrap();
    assert_eq!(controller.read_description(wait).unwrap().as_deref(), Some(""));

    controller.stop();
    assert_eq!(controller.state().lifecycle, Lifecycle::Stopped);
}

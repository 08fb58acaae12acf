//! Scripted in-memory gallery page for unit tests.
//!
//! [`FakeDriver`] answers [`ScriptOp`]s by reading the script header and
//! applying the op to a [`FakePage`] model.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tagger_cdp::CdpError;
use tagger_config::TaggerConfig;

use crate::backend::SessionBackend;
use crate::driver::AutomationDriver;
use crate::error::AutomationError;
use crate::resolver::Rect;
use crate::scripts::ScriptOp;

pub const VIEWPORT: (f64, f64) = (1000.0, 800.0);

/// What the driver was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Script(&'static str),
    Click(f64, f64),
    Key(String),
    Type(String),
}

#[derive(Debug, Clone)]
pub struct FakeField {
    pub text: String,
    pub rect: Rect,
    pub z_index: i64,
    pub hidden: bool,
}

impl FakeField {
    /// Field centered horizontally, `dy` below the viewport center.
    pub fn at(text: &str, dy: f64) -> Self {
        Self {
            text: text.to_string(),
            rect: Rect {
                x: VIEWPORT.0 / 2.0 - 150.0,
                y: VIEWPORT.1 / 2.0 + dy - 30.0,
                width: 300.0,
                height: 60.0,
            },
            z_index: 0,
            hidden: false,
        }
    }
}

/// One gallery item reachable with the arrow keys.
#[derive(Debug, Clone)]
pub struct FakeItem {
    pub description: String,
    pub chips: Vec<String>,
    pub caption: Option<String>,
    pub src: String,
}

impl FakeItem {
    pub fn new(description: &str, chips: &[&str]) -> Self {
        Self {
            description: description.to_string(),
            chips: chips.iter().map(|s| s.to_string()).collect(),
            caption: None,
            src: String::new(),
        }
    }
}

#[derive(Debug)]
pub struct FakePage {
    pub fields: Vec<FakeField>,
    /// Field that follows the current gallery item.
    pub live_field: usize,
    pub active: Option<usize>,
    pub caret: usize,
    /// The page swallows `focus()` calls.
    pub ignore_focus: bool,
    pub panel_scrollable: bool,
    pub panel_top: f64,
    /// How far each typed string would scroll the panel.
    pub scroll_per_type: f64,
    pub guard: Option<f64>,
    pub chips: Vec<String>,
    pub caption: Option<String>,
    pub image: Option<(Rect, String)>,
    pub items: Vec<FakeItem>,
    pub current: usize,
    pub location: String,
    /// Every script evaluation fails while set.
    pub fail_scripts: bool,
    /// Script results that are valid JSON of the wrong shape.
    pub garbled: Option<&'static str>,
    /// `type_text` panics while set.
    pub panic_on_type: bool,
    pub log: Vec<Action>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self {
            fields: vec![FakeField::at("", 0.0)],
            live_field: 0,
            active: None,
            caret: 0,
            ignore_focus: false,
            panel_scrollable: true,
            panel_top: 120.0,
            scroll_per_type: 35.0,
            guard: None,
            chips: Vec::new(),
            caption: None,
            image: Some((
                Rect {
                    x: 100.0,
                    y: 50.0,
                    width: 600.0,
                    height: 400.0,
                },
                "img-0".to_string(),
            )),
            items: Vec::new(),
            current: 0,
            location: "https://photos.google.com/photo/0".to_string(),
            fail_scripts: false,
            garbled: None,
            panic_on_type: false,
            log: Vec::new(),
        }
    }
}

impl FakePage {
    pub fn with_text(text: &str) -> Self {
        Self {
            fields: vec![FakeField::at(text, 0.0)],
            ..Self::default()
        }
    }

    /// Page over a gallery, showing `items[0]`.
    pub fn with_items(items: Vec<FakeItem>) -> Self {
        let mut page = Self::default();
        page.items = items;
        page.show_current();
        page
    }

    pub fn live_text(&self) -> &str {
        &self.fields[self.live_field].text
    }

    pub fn typed(&self) -> Vec<String> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Action::Type(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Action::Key(k) => Some(k.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn scripts(&self) -> Vec<&'static str> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Action::Script(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn show_current(&mut self) {
        let Some(item) = self.items.get(self.current).cloned() else {
            return;
        };
        self.fields[self.live_field].text = item.description;
        self.chips = item.chips;
        self.caption = item.caption;
        if let Some((_, src)) = self.image.as_mut() {
            *src = if item.src.is_empty() {
                format!("img-{}", self.current)
            } else {
                item.src
            };
        }
        self.location = format!("https://photos.google.com/photo/{}", self.current);
    }

    fn apply_scroll_disturbance(&mut self) {
        if !self.panel_scrollable {
            return;
        }
        self.panel_top += self.scroll_per_type;
        if let Some(top) = self.guard {
            self.panel_top = top;
        }
    }

    fn run_script(&mut self, op: ScriptOp) -> Value {
        match op {
            ScriptOp::EnumerateCandidates { .. } => {
                let candidates: Vec<Value> = self
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(index, f)| {
                        json!({
                            "index": index,
                            "text": f.text,
                            "rect": f.rect,
                            "z_index": f.z_index,
                            "hidden": f.hidden,
                        })
                    })
                    .collect();
                json!({
                    "viewport": {"width": VIEWPORT.0, "height": VIEWPORT.1},
                    "candidates": candidates,
                })
            }
            ScriptOp::FocusCaret { index, .. } => match self.fields.get(index) {
                Some(field) => {
                    let length = field.text.chars().count();
                    if !self.ignore_focus {
                        self.active = Some(index);
                        self.caret = length;
                    }
                    json!({"ok": true, "length": length})
                }
                None => json!({"ok": false, "length": 0}),
            },
            ScriptOp::IsActive { index, .. } => json!(self.active == Some(index)),
            ScriptOp::FreezeScroll { .. } => {
                if self.panel_scrollable {
                    self.guard = Some(self.panel_top);
                    json!({"frozen": true, "top": self.panel_top})
                } else {
                    json!({"frozen": false, "top": 0})
                }
            }
            ScriptOp::UnfreezeScroll => match self.guard.take() {
                Some(top) => {
                    self.panel_top = top;
                    json!({"frozen": false, "top": top})
                }
                None => json!({"frozen": false, "top": 0}),
            },
            ScriptOp::ScrapeLabels { window, .. } => {
                let start = self.chips.len().saturating_sub(window);
                let mut labels: Vec<String> = self.chips[start..].to_vec();
                labels.extend(self.caption.clone());
                json!(labels)
            }
            ScriptOp::MainImage {
                min_width,
                min_height,
            } => match &self.image {
                Some((rect, src)) if rect.width > min_width && rect.height > min_height => {
                    let (x, y) = rect.center();
                    json!({"x": x, "y": y, "src": src})
                }
                _ => Value::Null,
            },
            ScriptOp::Viewport => json!({"width": VIEWPORT.0, "height": VIEWPORT.1}),
            ScriptOp::Location => json!(self.location),
            ScriptOp::SpoofNavigator => json!(true),
        }
    }

    fn click(&mut self, x: f64, y: f64) {
        let hit = self.fields.iter().position(|f| {
            !f.hidden
                && x >= f.rect.x
                && x <= f.rect.x + f.rect.width
                && y >= f.rect.y
                && y <= f.rect.y + f.rect.height
        });
        self.active = hit;
        self.caret = 0;
    }

    fn press(&mut self, key: &str) {
        match (key, self.active) {
            ("End", Some(i)) => self.caret = self.fields[i].text.chars().count(),
            ("Backspace", Some(i)) if self.caret > 0 => {
                let text = &mut self.fields[i].text;
                let at = text
                    .char_indices()
                    .nth(self.caret - 1)
                    .map(|(b, _)| b)
                    .unwrap_or(text.len());
                text.remove(at);
                self.caret -= 1;
                self.apply_scroll_disturbance();
            }
            ("ArrowRight", None) if self.current + 1 < self.items.len() => {
                self.current += 1;
                self.show_current();
            }
            ("ArrowLeft", None) if self.current > 0 => {
                self.current -= 1;
                self.show_current();
            }
            ("ArrowLeft", Some(_)) => self.caret = self.caret.saturating_sub(1),
            _ => {}
        }
    }

    fn type_text(&mut self, text: &str) {
        let Some(i) = self.active else {
            return;
        };
        let field = &mut self.fields[i].text;
        let at = field
            .char_indices()
            .nth(self.caret)
            .map(|(b, _)| b)
            .unwrap_or(field.len());
        field.insert_str(at, text);
        self.caret += text.chars().count();
        self.apply_scroll_disturbance();
    }
}

/// [`AutomationDriver`] over a shared [`FakePage`].
#[derive(Clone)]
pub struct FakeDriver {
    page: Arc<Mutex<FakePage>>,
}

impl FakeDriver {
    pub fn new(page: FakePage) -> Self {
        Self {
            page: Arc::new(Mutex::new(page)),
        }
    }

    pub fn page(&self) -> parking_lot::MutexGuard<'_, FakePage> {
        self.page.lock()
    }
}

#[async_trait]
impl AutomationDriver for FakeDriver {
    async fn evaluate(&self, script: &str) -> Result<Value, CdpError> {
        let op = ScriptOp::from_script(script)
            .ok_or_else(|| CdpError::JavaScript("unrecognised script".to_string()))?;
        let mut page = self.page.lock();
        page.log.push(Action::Script(op.name()));
        if page.fail_scripts {
            return Err(CdpError::JavaScript("page script failed".to_string()));
        }
        if page.garbled == Some(op.name()) {
            return Ok(json!("garbled"));
        }
        Ok(page.run_script(op))
    }

    async fn click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        let mut page = self.page.lock();
        page.log.push(Action::Click(x, y));
        page.click(x, y);
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), CdpError> {
        let mut page = self.page.lock();
        page.log.push(Action::Key(key.to_string()));
        page.press(key);
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), CdpError> {
        let mut page = self.page.lock();
        if page.panic_on_type {
            drop(page);
            panic!("fake page crashed while typing");
        }
        page.log.push(Action::Type(text.to_string()));
        page.type_text(text);
        Ok(())
    }
}

/// Timings shrunk so tests run in milliseconds.
pub fn fast_config() -> TaggerConfig {
    let mut config = TaggerConfig::default();
    let timing = &mut config.timing;
    timing.poll_interval_ms = 20;
    timing.settle = tagger_config::SettleStrategy::Fixed { delay_ms: 1 };
    timing.focus_verify_timeout_ms = 40;
    timing.focus_verify_step_ms = 5;
    timing.click_settle_ms = 0;
    timing.key_settle_ms = 0;
    timing.type_settle_ms = 0;
    timing.resample_delay_ms = 1;
    config
}

/// [`SessionBackend`] handing out a shared [`FakeDriver`].
pub struct FakeBackend {
    pub driver: FakeDriver,
    pub open_delay: Duration,
    pub fail_open: Option<String>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn new(driver: FakeDriver) -> Self {
        Self {
            driver,
            open_delay: Duration::ZERO,
            fail_open: None,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn open(&mut self, _headful: bool) -> Result<Arc<dyn AutomationDriver>, AutomationError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if !self.open_delay.is_zero() {
            tokio::time::sleep(self.open_delay).await;
        }
        if let Some(reason) = &self.fail_open {
            return Err(AutomationError::Launch(reason.clone()));
        }
        Ok(Arc::new(self.driver.clone()))
    }

    async fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

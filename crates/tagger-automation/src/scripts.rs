//! Parameterized page scripts.
//!
//! Every DOM query the worker makes is one of the [`ScriptOp`]s below.
//! A rendered script starts with a comment carrying the op as JSON, so a
//! scripted driver can recognise what it is being asked without parsing
//! JavaScript.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tagger_config::PageConfig;

use crate::driver::AutomationDriver;
use crate::error::AutomationError;

const HEADER_PREFIX: &str = "/* tagger:";
const HEADER_SUFFIX: &str = " */";

/// Shared visibility test: hidden if any node up to `<body>` is
/// `aria-hidden`, carries `hidden`, or has inline `display: none`.
const IS_HIDDEN_FN: &str = r#"const isHidden = (el) => {
    for (let n = el; n && n !== document.body; n = n.parentElement) {
      if (n.getAttribute('aria-hidden') === 'true' || n.hidden || (n.style && n.style.display === 'none')) return true;
    }
    return false;
  };"#;

/// One page query or mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    /// Geometry, text and visibility of every description field.
    EnumerateCandidates { selector: String },
    /// Focus without scrolling, caret to end, field scrolled to bottom.
    FocusCaret { selector: String, index: usize },
    /// Whether the field is `document.activeElement`.
    IsActive { selector: String, index: usize },
    /// Pin the first scrollable ancestor panel at its current offset.
    FreezeScroll {
        selector: String,
        index: usize,
        panels: Vec<String>,
    },
    /// Drop the pin and restore the recorded offset.
    UnfreezeScroll,
    /// Visible chip texts (last `window`) then the last grouping caption.
    ScrapeLabels {
        chip_selector: String,
        window: usize,
        caption_group_selector: String,
        caption_name_selector: String,
    },
    /// Center and source of the largest visible image.
    MainImage { min_width: f64, min_height: f64 },
    Viewport,
    Location,
    /// Present an iPad-like navigator.
    SpoofNavigator,
}

impl ScriptOp {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptOp::EnumerateCandidates { .. } => "enumerate_candidates",
            ScriptOp::FocusCaret { .. } => "focus_caret",
            ScriptOp::IsActive { .. } => "is_active",
            ScriptOp::FreezeScroll { .. } => "freeze_scroll",
            ScriptOp::UnfreezeScroll => "unfreeze_scroll",
            ScriptOp::ScrapeLabels { .. } => "scrape_labels",
            ScriptOp::MainImage { .. } => "main_image",
            ScriptOp::Viewport => "viewport",
            ScriptOp::Location => "location",
            ScriptOp::SpoofNavigator => "spoof_navigator",
        }
    }

    /// Recover the op from a rendered script's header comment.
    pub fn from_script(script: &str) -> Option<Self> {
        let rest = script.strip_prefix(HEADER_PREFIX)?;
        let end = rest.find(HEADER_SUFFIX)?;
        serde_json::from_str(&rest[..end]).ok()
    }

    /// Render to a self-contained expression.
    pub fn render(&self) -> String {
        let header = serde_json::to_string(self)
            .unwrap_or_default()
            .replace("*/", "*\\/");
        format!("{}{}{}\n{}", HEADER_PREFIX, header, HEADER_SUFFIX, self.body())
    }

    fn body(&self) -> String {
        match self {
            ScriptOp::EnumerateCandidates { selector } => format!(
                r#"(() => {{
  {is_hidden}
  const candidates = Array.from(document.querySelectorAll({sel})).map((el, index) => {{
    const r = el.getBoundingClientRect();
    const z = parseInt(getComputedStyle(el).zIndex, 10);
    return {{
      index,
      text: el.value || '',
      rect: {{ x: r.left, y: r.top, width: r.width, height: r.height }},
      z_index: Number.isNaN(z) ? 0 : z,
      hidden: isHidden(el),
    }};
  }});
  return {{ viewport: {{ width: window.innerWidth, height: window.innerHeight }}, candidates }};
}})()"#,
                is_hidden = IS_HIDDEN_FN,
                sel = js(selector),
            ),
            ScriptOp::FocusCaret { selector, index } => format!(
                r#"(() => {{
  const el = document.querySelectorAll({sel})[{index}];
  if (!el) return {{ ok: false, length: 0 }};
  el.focus({{ preventScroll: true }});
  const length = (el.value || '').length;
  try {{ el.setSelectionRange(length, length); }} catch (e) {{ el.selectionStart = length; el.selectionEnd = length; }}
  el.scrollTop = el.scrollHeight;
  return {{ ok: true, length }};
}})()"#,
                sel = js(selector),
            ),
            ScriptOp::IsActive { selector, index } => format!(
                r#"(() => {{
  const el = document.querySelectorAll({sel})[{index}];
  return !!el && document.activeElement === el;
}})()"#,
                sel = js(selector),
            ),
            ScriptOp::FreezeScroll {
                selector,
                index,
                panels,
            } => format!(
                r#"(() => {{
  const prev = window.__taggerScrollGuard;
  if (prev) prev.panel.removeEventListener('scroll', prev.listener, true);
  window.__taggerScrollGuard = null;
  const scrollable = (n) => !!n && n.scrollHeight > n.clientHeight;
  const el = document.querySelectorAll({sel})[{index}];
  let panel = null;
  for (let n = el ? el.parentElement : null; n && n !== document.body; n = n.parentElement) {{
    if (scrollable(n)) {{ panel = n; break; }}
  }}
  if (!panel) {{
    for (const s of {panels}) {{
      const found = Array.from(document.querySelectorAll(s)).find(scrollable);
      if (found) {{ panel = found; break; }}
    }}
  }}
  if (!panel) return {{ frozen: false, top: 0 }};
  const top = panel.scrollTop;
  const listener = () => {{ if (panel.scrollTop !== top) panel.scrollTop = top; }};
  panel.addEventListener('scroll', listener, true);
  window.__taggerScrollGuard = {{ panel, top, listener }};
  return {{ frozen: true, top }};
}})()"#,
                sel = js(selector),
                panels = js(panels),
            ),
            ScriptOp::UnfreezeScroll => r#"(() => {
  const g = window.__taggerScrollGuard;
  if (!g) return { frozen: false, top: 0 };
  g.panel.removeEventListener('scroll', g.listener, true);
  g.panel.scrollTop = g.top;
  window.__taggerScrollGuard = null;
  return { frozen: false, top: g.top };
})()"#
                .to_string(),
            ScriptOp::ScrapeLabels {
                chip_selector,
                window,
                caption_group_selector,
                caption_name_selector,
            } => format!(
                r#"(() => {{
  const visible = (el) => {{ const r = el.getBoundingClientRect(); return r.width > 0 && r.height > 0; }};
  const text = (el) => (el.textContent || '').trim();
  const chips = Array.from(document.querySelectorAll({chip})).filter(visible).slice(-{window}).map(text);
  const groups = document.querySelectorAll({group});
  const captions = [];
  if (groups.length > 0) {{
    const name = groups[groups.length - 1].querySelector({name});
    if (name) captions.push(text(name));
  }}
  return chips.concat(captions).filter((s) => s.length > 0);
}})()"#,
                chip = js(chip_selector),
                group = js(caption_group_selector),
                name = js(caption_name_selector),
            ),
            ScriptOp::MainImage {
                min_width,
                min_height,
            } => format!(
                r#"(() => {{
  let best = null;
  let bestArea = 0;
  for (const img of document.querySelectorAll('img')) {{
    const r = img.getBoundingClientRect();
    const onScreen = r.bottom > 0 && r.right > 0 && r.top < window.innerHeight && r.left < window.innerWidth;
    if (onScreen && r.width > {min_width} && r.height > {min_height} && r.width * r.height > bestArea) {{
      bestArea = r.width * r.height;
      best = {{ x: r.left + r.width / 2, y: r.top + r.height / 2, src: img.currentSrc || img.src || '' }};
    }}
  }}
  return best;
}})()"#,
            ),
            ScriptOp::Viewport => {
                "({ width: window.innerWidth, height: window.innerHeight })".to_string()
            }
            ScriptOp::Location => "window.location.href".to_string(),
            ScriptOp::SpoofNavigator => r#"(() => {
  const define = (key, value) => {
    try { Object.defineProperty(Navigator.prototype, key, { get: () => value, configurable: true }); } catch (e) {}
  };
  define('platform', 'iPad');
  define('maxTouchPoints', 5);
  define('webdriver', false);
  return true;
})()"#
                .to_string(),
        }
    }
}

fn js<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Builds [`ScriptOp`]s from the configured selectors.
#[derive(Debug, Clone)]
pub struct PageScripts {
    page: PageConfig,
}

impl PageScripts {
    pub fn new(page: PageConfig) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    pub fn enumerate_candidates(&self) -> ScriptOp {
        ScriptOp::EnumerateCandidates {
            selector: self.page.description_selector.clone(),
        }
    }

    pub fn focus_caret(&self, index: usize) -> ScriptOp {
        ScriptOp::FocusCaret {
            selector: self.page.description_selector.clone(),
            index,
        }
    }

    pub fn is_active(&self, index: usize) -> ScriptOp {
        ScriptOp::IsActive {
            selector: self.page.description_selector.clone(),
            index,
        }
    }

    pub fn freeze_scroll(&self, index: usize) -> ScriptOp {
        ScriptOp::FreezeScroll {
            selector: self.page.description_selector.clone(),
            index,
            panels: self.page.panel_selectors.clone(),
        }
    }

    pub fn unfreeze_scroll(&self) -> ScriptOp {
        ScriptOp::UnfreezeScroll
    }

    pub fn scrape_labels(&self) -> ScriptOp {
        ScriptOp::ScrapeLabels {
            chip_selector: self.page.chip_selector.clone(),
            window: self.page.label_window,
            caption_group_selector: self.page.caption_group_selector.clone(),
            caption_name_selector: self.page.caption_name_selector.clone(),
        }
    }

    pub fn main_image(&self) -> ScriptOp {
        ScriptOp::MainImage {
            min_width: self.page.image_min_width,
            min_height: self.page.image_min_height,
        }
    }

    pub fn viewport(&self) -> ScriptOp {
        ScriptOp::Viewport
    }

    pub fn location(&self) -> ScriptOp {
        ScriptOp::Location
    }
}

/// Run an op and decode its result.
pub(crate) async fn evaluate_op<T: DeserializeOwned>(
    driver: &dyn AutomationDriver,
    op: &ScriptOp,
) -> Result<T, AutomationError> {
    let value = driver.evaluate(&op.render()).await?;
    serde_json::from_value(value).map_err(|e| AutomationError::Script {
        op: op.name(),
        message: e.to_string(),
    })
}

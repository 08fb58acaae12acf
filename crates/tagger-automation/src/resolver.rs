//! Picks the live description field among stale copies.
//!
//! The gallery keeps several description textareas in the DOM (one per
//! preloaded item). Ranking, in order:
//!
//! 1. hidden or zero-sized candidates are dropped;
//! 2. if any candidate has text, only those with text stay;
//! 3. candidates farther than `nearest + tie_threshold` from the viewport
//!    center are dropped;
//! 4. highest z-index wins, then lowest DOM index.
//!
//! The winner depends only on the candidate set, never on input order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AutomationError;
use crate::page::PageAutomation;

/// Client rect in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// One description field as seen by a single resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateElement {
    /// Position in `querySelectorAll` order.
    pub handle: usize,
    pub text_value: String,
    pub bounding_rect: Rect,
    pub distance_from_viewport_center: f64,
    pub z_index: i64,
    pub has_content: bool,
    pub hidden: bool,
}

impl CandidateElement {
    pub fn new(handle: usize, text: &str, rect: Rect, z_index: i64, hidden: bool, viewport: Viewport) -> Self {
        let (cx, cy) = rect.center();
        let (vx, vy) = viewport.center();
        Self {
            handle,
            text_value: text.to_string(),
            bounding_rect: rect,
            distance_from_viewport_center: (cx - vx).hypot(cy - vy),
            z_index,
            has_content: !text.trim().is_empty(),
            hidden,
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
            && self.bounding_rect.width > 0.0
            && self.bounding_rect.height > 0.0
            && self.distance_from_viewport_center.is_finite()
    }

    /// Center scrolled above the top of the viewport.
    pub fn is_above_viewport(&self) -> bool {
        self.bounding_rect.center().1 < 0.0
    }
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    index: usize,
    #[serde(default)]
    text: String,
    rect: Rect,
    #[serde(default)]
    z_index: i64,
    #[serde(default)]
    hidden: bool,
}

/// Result of the enumerate-candidates script.
#[derive(Debug, Deserialize)]
pub(crate) struct Enumeration {
    viewport: Viewport,
    candidates: Vec<RawCandidate>,
}

impl Enumeration {
    pub(crate) fn into_candidates(self) -> Vec<CandidateElement> {
        let viewport = self.viewport;
        self.candidates
            .into_iter()
            .map(|c| CandidateElement::new(c.index, &c.text, c.rect, c.z_index, c.hidden, viewport))
            .collect()
    }
}

/// Scoring heuristic over enumerated candidates.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    tie_threshold: f64,
}

impl TargetResolver {
    pub fn new(tie_threshold: f64) -> Self {
        Self { tie_threshold }
    }

    /// Pick the live candidate, if any is visible.
    pub fn select(&self, candidates: &[CandidateElement]) -> Option<CandidateElement> {
        let visible: Vec<&CandidateElement> = candidates.iter().filter(|c| c.is_visible()).collect();
        if visible.is_empty() {
            return None;
        }

        let any_content = visible.iter().any(|c| c.has_content);
        let pool: Vec<&CandidateElement> = visible
            .into_iter()
            .filter(|c| c.has_content || !any_content)
            .collect();

        let nearest = pool
            .iter()
            .map(|c| c.distance_from_viewport_center)
            .fold(f64::INFINITY, f64::min);

        pool.into_iter()
            .filter(|c| c.distance_from_viewport_center - nearest <= self.tie_threshold)
            .min_by(|a, b| b.z_index.cmp(&a.z_index).then(a.handle.cmp(&b.handle)))
            .cloned()
    }
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl PageAutomation {
    /// Enumerate and rank the description fields.
    pub async fn resolve_target(&self) -> Result<Option<CandidateElement>, AutomationError> {
        let enumeration: Enumeration = self.eval(&self.scripts.enumerate_candidates()).await?;
        let candidates = enumeration.into_candidates();
        let chosen = self.resolver.select(&candidates);
        match &chosen {
            Some(c) => debug!(
                handle = c.handle,
                candidates = candidates.len(),
                distance = c.distance_from_viewport_center,
                "Resolved description field"
            ),
            None => debug!(candidates = candidates.len(), "No visible description field"),
        }
        Ok(chosen)
    }

    /// Resolve or fail with [`AutomationError::TargetNotFound`].
    pub(crate) async fn require_target(&self, op: &'static str) -> Result<CandidateElement, AutomationError> {
        self.resolve_target()
            .await?
            .ok_or(AutomationError::TargetNotFound(op))
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;

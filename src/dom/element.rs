use crate::dom::geometry::BoundingBox;
use serde::{Deserialize, Serialize};

/// An element that passed geometry resolution and classification
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<N> {
    /// Reference into the host page
    pub node: N,

    /// Visible, viewport-clipped fragments in source order
    pub rects: Vec<BoundingBox>,

    /// Normalized text content
    pub text: String,

    /// Lower-cased tag name
    pub element_type: String,

    /// `aria-label` attribute, empty when absent
    pub aria_label: String,
}

impl<N> Candidate<N> {
    pub fn new(node: N, rects: Vec<BoundingBox>, tag_name: &str) -> Self {
        Self {
            node,
            rects,
            text: String::new(),
            element_type: tag_name.to_lowercase(),
            aria_label: String::new(),
        }
    }

    /// Builder method: set text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder method: set aria label
    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = label.into();
        self
    }

    /// One descriptor per rectangle, sharing this candidate's metadata
    pub fn descriptors(&self) -> impl Iterator<Item = Descriptor> + '_ {
        self.rects.iter().map(|rect| Descriptor::from_rect(rect, self))
    }
}

/// Caller-facing record for one marked rectangle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Descriptor {
    /// Horizontal center of the rectangle
    pub x: f64,

    /// Vertical center of the rectangle
    pub y: f64,

    /// Lower-cased tag name (`button`, `a`, `div`)
    #[serde(rename = "type")]
    pub element_type: String,

    pub text: String,

    #[serde(rename = "ariaLabel", default)]
    pub aria_label: String,
}

impl Descriptor {
    fn from_rect<N>(rect: &BoundingBox, candidate: &Candidate<N>) -> Self {
        let (x, y) = rect.center();
        Self {
            x,
            y,
            element_type: candidate.element_type.clone(),
            text: candidate.text.clone(),
            aria_label: candidate.aria_label.clone(),
        }
    }

    /// Convert to a one-line summary, e.g. `[button] "Sign in" @ (120, 48)`
    pub fn to_simple_string(&self) -> String {
        let mut parts = vec![format!("[{}]", self.element_type)];

        if !self.text.is_empty() {
            let text: String = if self.text.chars().count() > 50 {
                format!("{}...", self.text.chars().take(47).collect::<String>())
            } else {
                self.text.clone()
            };
            parts.push(format!("{:?}", text));
        }

        if !self.aria_label.is_empty() {
            parts.push(format!("aria-label={:?}", self.aria_label));
        }

        parts.push(format!("@ ({:.0}, {:.0})", self.x, self.y));
        parts.join(" ")
    }
}

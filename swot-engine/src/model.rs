//! Domain model for layered SWOT analysis.
//!
//! The model is deliberately closed: `SwotItem` values are only built
//! through the normalizing factory, so unvalidated model output never
//! reaches the typed structures downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::scoring::PriorityReport;

// ============================================================================
// Dimensions and Layers
// ============================================================================

/// One of the four fixed SWOT categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Strengths,
    Weaknesses,
    Opportunities,
    Threats,
}

impl Dimension {
    /// Canonical iteration order.
    pub const ALL: [Dimension; 4] = [
        Dimension::Strengths,
        Dimension::Weaknesses,
        Dimension::Opportunities,
        Dimension::Threats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Strengths => "strengths",
            Dimension::Weaknesses => "weaknesses",
            Dimension::Opportunities => "opportunities",
            Dimension::Threats => "threats",
        }
    }

    /// Capitalized label for page rendering.
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Strengths => "Strengths",
            Dimension::Weaknesses => "Weaknesses",
            Dimension::Opportunities => "Opportunities",
            Dimension::Threats => "Threats",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three fixed analytical layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Canonical,
    Corpus,
    Transactional,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Canonical, Layer::Corpus, Layer::Transactional];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Canonical => "canonical",
            Layer::Corpus => "corpus",
            Layer::Transactional => "transactional",
        }
    }

    /// Short description used in prompts and page rendering.
    pub fn description(&self) -> &'static str {
        match self {
            Layer::Canonical => "internal truth from strategy docs and playbooks",
            Layer::Corpus => "external truth from market and competitor data",
            Layer::Transactional => "internal reality from sales and operations data",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SWOT Items
// ============================================================================

/// A single structured SWOT statement with its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwotItem {
    /// Statement text (non-empty, trimmed)
    pub text: String,
    /// Business impact toward the desired outcomes, 1-10
    pub impact: i64,
    /// Sentiment, -1.0 (bad) to 1.0 (good)
    pub sentiment: f64,
}

impl SwotItem {
    /// Build a validated item from one untrusted element of a model response.
    ///
    /// Coercion rules:
    /// - `text`: missing defaults to empty, then trimmed; an empty result
    ///   drops the element (`None`). A bare string element is treated as
    ///   text-only.
    /// - `impact`: missing or unparseable defaults to 5; otherwise rounded
    ///   (half away from zero, so 5.5 rounds to 6) and clamped to [1, 10].
    /// - `sentiment`: missing or unparseable defaults to 0.0; otherwise
    ///   clamped to [-1.0, 1.0].
    ///
    /// Out-of-range values never fail; clamping is the contract with the
    /// model, not an error condition.
    pub fn from_value(value: &Value) -> Option<Self> {
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            _ => value
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or("")
                .trim()
                .to_string(),
        };
        if text.is_empty() {
            return None;
        }

        let impact = number_field(value, "impact")
            .map(|raw| (raw.round() as i64).clamp(1, 10))
            .unwrap_or(5);
        let sentiment = number_field(value, "sentiment")
            .map(|raw| raw.clamp(-1.0, 1.0))
            .unwrap_or(0.0);

        Some(Self {
            text,
            impact,
            sentiment,
        })
    }
}

/// Read a numeric field leniently: JSON numbers directly, numeric strings
/// parsed, anything else treated as absent.
fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Normalize an untrusted array into validated items.
///
/// Elements whose trimmed text is empty are dropped silently; all others are
/// preserved in input order. List length is not capped here: the per-quadrant
/// item limit is a prompt instruction to the model, and an over-long response
/// degrades gracefully downstream.
pub fn normalize_items(values: &[Value]) -> Vec<SwotItem> {
    values.iter().filter_map(SwotItem::from_value).collect()
}

// ============================================================================
// Layer Output
// ============================================================================

/// Structured SWOT output for one analytical layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerOutput {
    pub layer: Layer,
    pub company: String,
    pub desired_outcomes: String,
    #[serde(default)]
    pub strengths: Vec<SwotItem>,
    #[serde(default)]
    pub weaknesses: Vec<SwotItem>,
    #[serde(default)]
    pub opportunities: Vec<SwotItem>,
    #[serde(default)]
    pub threats: Vec<SwotItem>,
}

impl LayerOutput {
    /// Create an empty output for a layer.
    pub fn new(layer: Layer, company: impl Into<String>, desired_outcomes: impl Into<String>) -> Self {
        Self {
            layer,
            company: company.into(),
            desired_outcomes: desired_outcomes.into(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            opportunities: Vec::new(),
            threats: Vec::new(),
        }
    }

    /// Items for a dimension.
    pub fn items(&self, dimension: Dimension) -> &[SwotItem] {
        match dimension {
            Dimension::Strengths => &self.strengths,
            Dimension::Weaknesses => &self.weaknesses,
            Dimension::Opportunities => &self.opportunities,
            Dimension::Threats => &self.threats,
        }
    }

    /// Mutable items for a dimension.
    pub fn items_mut(&mut self, dimension: Dimension) -> &mut Vec<SwotItem> {
        match dimension {
            Dimension::Strengths => &mut self.strengths,
            Dimension::Weaknesses => &mut self.weaknesses,
            Dimension::Opportunities => &mut self.opportunities,
            Dimension::Threats => &mut self.threats,
        }
    }
}

// ============================================================================
// Run Summary
// ============================================================================

/// A complete analysis run: the three structured layers plus the computed
/// priorities. Immutable after creation; persisted keyed by `run_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub company: String,
    pub desired_outcomes: String,
    pub canonical: LayerOutput,
    pub corpus: LayerOutput,
    pub transactional: LayerOutput,
    pub priorities: PriorityReport,
}

impl RunSummary {
    /// Layer output by layer name.
    pub fn layer(&self, layer: Layer) -> &LayerOutput {
        match layer {
            Layer::Canonical => &self.canonical,
            Layer::Corpus => &self.corpus,
            Layer::Transactional => &self.transactional,
        }
    }
}

/// Build a run id from a timestamp and company name.
///
/// Format: `<UTC timestamp, compact>_<company with whitespace replaced by
/// underscores>`. Two submissions for the same company within the same
/// second collide; known limitation of the id scheme.
pub fn make_run_id(timestamp: DateTime<Utc>, company: &str) -> String {
    let slug = company.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}_{}", timestamp.format("%Y%m%d%H%M%S"), slug)
}

//! Layer analysis via language-model structuring.
//!
//! Sends one structuring request per analytical layer, recovers a JSON
//! payload from the model response, and normalizes it into typed layer
//! output. The three layer calls are independent and run concurrently; a
//! failure in any layer aborts the run before anything is persisted.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use swot_common::config::ProviderConfig;
use swot_common::error::{Error, Result};

use crate::model::{normalize_items, Dimension, Layer, LayerOutput};
use crate::provider::{ChatRequest, Message, Provider};

// ============================================================================
// Input Types
// ============================================================================

/// Free-text notes, one blob per analytical layer.
#[derive(Debug, Clone, Default)]
pub struct LayerNotes {
    pub canonical: String,
    pub corpus: String,
    pub transactional: String,
}

impl LayerNotes {
    pub fn for_layer(&self, layer: Layer) -> &str {
        match layer {
            Layer::Canonical => &self.canonical,
            Layer::Corpus => &self.corpus,
            Layer::Transactional => &self.transactional,
        }
    }
}

/// Optional per-quadrant seed items used to nudge the canonical layer's
/// structuring prompt. Sourced from newline-delimited form fields.
#[derive(Debug, Clone, Default)]
pub struct SeedInputs {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

impl SeedInputs {
    /// Split newline-delimited form fields into trimmed, non-empty lines.
    pub fn from_form_fields(
        strengths: &str,
        weaknesses: &str,
        opportunities: &str,
        threats: &str,
    ) -> Self {
        fn lines(field: &str) -> Vec<String> {
            field
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()
        }

        Self {
            strengths: lines(strengths),
            weaknesses: lines(weaknesses),
            opportunities: lines(opportunities),
            threats: lines(threats),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty()
            && self.weaknesses.is_empty()
            && self.opportunities.is_empty()
            && self.threats.is_empty()
    }
}

// ============================================================================
// Analysis Bridge
// ============================================================================

/// Bridge that turns raw layer notes into structured SWOT output via the
/// configured language-model provider.
pub struct AnalysisBridge {
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: Option<i64>,
    temperature: f64,
}

impl AnalysisBridge {
    /// Create a new analysis bridge.
    pub fn new(provider: Arc<dyn Provider>, config: &ProviderConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Structure all three layers concurrently.
    ///
    /// Returns the layers in fixed (canonical, corpus, transactional) order,
    /// or the first layer failure.
    pub async fn analyze(
        &self,
        company: &str,
        desired_outcomes: &str,
        notes: &LayerNotes,
        seeds: &SeedInputs,
    ) -> Result<(LayerOutput, LayerOutput, LayerOutput)> {
        futures::try_join!(
            self.structure_layer(Layer::Canonical, company, desired_outcomes, &notes.canonical, seeds),
            self.structure_layer(Layer::Corpus, company, desired_outcomes, &notes.corpus, seeds),
            self.structure_layer(
                Layer::Transactional,
                company,
                desired_outcomes,
                &notes.transactional,
                seeds,
            ),
        )
    }

    /// Run one structuring call for a single layer.
    async fn structure_layer(
        &self,
        layer: Layer,
        company: &str,
        desired_outcomes: &str,
        raw_notes: &str,
        seeds: &SeedInputs,
    ) -> Result<LayerOutput> {
        let system = structuring_rules(layer);
        let user = layer_prompt(layer, company, desired_outcomes, raw_notes, seeds);

        tracing::debug!(
            layer = %layer,
            notes_chars = raw_notes.len(),
            "Requesting layer structuring"
        );

        let response = self
            .provider
            .chat(ChatRequest {
                model: self.model.clone(),
                messages: vec![Message {
                    role: "user".into(),
                    content: user,
                }],
                max_tokens: self.max_tokens,
                temperature: Some(self.temperature),
                system: Some(system),
            })
            .await
            .map_err(|e| Error::Provider(format!("layer '{}': {}", layer, e)))?;

        tracing::debug!(
            layer = %layer,
            latency_ms = response.latency_ms,
            total_tokens = response.usage.total_tokens,
            "Layer structuring response received"
        );

        parse_layer_output(layer, company, desired_outcomes, &response.content)
    }
}

// ============================================================================
// Prompts
// ============================================================================

fn structuring_rules(layer: Layer) -> String {
    format!(
        r#"You are a strategy analyst. Convert raw notes for the '{layer}' layer of a company's SWOT into structured JSON.

Rules:
- For each quadrant (strengths, weaknesses, opportunities, threats), return 1-6 items at most.
- Each item is an object with: "text" (60 words or less), "impact" (integer 1-10, business leverage toward the desired outcomes), and "sentiment" (a number between -1 and 1; positive=good, negative=bad as appropriate for the quadrant).
- Stay grounded in the provided notes; no hallucination. If a quadrant has no evidence, return an empty list.
- Respond with a single JSON object of the form {{"strengths": [...], "weaknesses": [...], "opportunities": [...], "threats": [...]}} and nothing else."#
    )
}

fn layer_prompt(
    layer: Layer,
    company: &str,
    desired_outcomes: &str,
    raw_notes: &str,
    seeds: &SeedInputs,
) -> String {
    let mut prompt = format!(
        "Company: {company}\nDesired Outcomes: {desired_outcomes}\n\nLayer: {layer} ({})\nRaw Notes:\n{raw_notes}\n",
        layer.description()
    );

    // Seed items only nudge the canonical layer.
    if layer == Layer::Canonical && !seeds.is_empty() {
        prompt.push_str(&format!(
            "\nUse these optional seed items (from the form quadrants) only if helpful, but do not exceed 6 items per quadrant:\n- strengths_seed: {:?}\n- weaknesses_seed: {:?}\n- opportunities_seed: {:?}\n- threats_seed: {:?}\n",
            seeds.strengths, seeds.weaknesses, seeds.opportunities, seeds.threats
        ));
    }

    prompt
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Untrusted payload shape: every quadrant is optional and every element is
/// left as raw JSON for the item normalizer.
#[derive(Debug, Default, Deserialize)]
struct RawLayerPayload {
    #[serde(default)]
    strengths: Vec<Value>,
    #[serde(default)]
    weaknesses: Vec<Value>,
    #[serde(default)]
    opportunities: Vec<Value>,
    #[serde(default)]
    threats: Vec<Value>,
}

impl RawLayerPayload {
    fn items(&self, dimension: Dimension) -> &[Value] {
        match dimension {
            Dimension::Strengths => &self.strengths,
            Dimension::Weaknesses => &self.weaknesses,
            Dimension::Opportunities => &self.opportunities,
            Dimension::Threats => &self.threats,
        }
    }
}

/// Two-stage JSON recovery: direct parse first, then the brace-delimited
/// substring (first `{` to last `}`), which also strips markdown fences and
/// other prose the model wraps around the object.
fn recover_json_payload(content: &str) -> Option<RawLayerPayload> {
    let trimmed = content.trim();

    if let Ok(payload) = serde_json::from_str(trimmed) {
        return Some(payload);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

/// Parse one model response into a normalized layer output.
///
/// Per-item defects are coerced or dropped by the normalizer; a response in
/// which no JSON object can be recovered at all fails with an error naming
/// the layer.
fn parse_layer_output(
    layer: Layer,
    company: &str,
    desired_outcomes: &str,
    content: &str,
) -> Result<LayerOutput> {
    let payload = recover_json_payload(content).ok_or_else(|| Error::LayerOutput {
        layer: layer.as_str().into(),
        message: "response contained no parseable JSON object".into(),
    })?;

    let mut output = LayerOutput::new(layer, company, desired_outcomes);
    for dimension in Dimension::ALL {
        *output.items_mut(dimension) = normalize_items(payload.items(dimension));
    }

    let dropped: usize = Dimension::ALL
        .iter()
        .map(|d| payload.items(*d).len() - output.items(*d).len())
        .sum();
    if dropped > 0 {
        tracing::warn!(layer = %layer, dropped, "Dropped items with empty text from model payload");
    }

    Ok(output)
}

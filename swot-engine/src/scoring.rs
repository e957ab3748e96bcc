//! Gap x impact priority scoring across the three analytical layers.
//!
//! For each SWOT dimension the scorer reduces the three layers' item lists
//! to average impact/sentiment, takes the spread between the most and least
//! favorable layer as the gap, and ranks dimensions by gap times mean
//! impact. Pure and deterministic; empty lists score 0.0.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{Dimension, LayerOutput, SwotItem};

// ============================================================================
// Types
// ============================================================================

/// One value per analytical layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerAverages {
    pub canonical: f64,
    pub corpus: f64,
    pub transactional: f64,
}

impl LayerAverages {
    fn values(&self) -> [f64; 3] {
        [self.canonical, self.corpus, self.transactional]
    }
}

/// Full scoring detail for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionPriority {
    /// Average item impact per layer (0.0 for an empty list)
    pub layer_impacts: LayerAverages,
    /// Average item sentiment per layer (0.0 for an empty list)
    pub layer_sentiments: LayerAverages,
    /// Spread between the highest and lowest layer-average impact
    pub gap: f64,
    /// Mean of the three layer-average impacts
    pub impact_mean: f64,
    /// round(gap * impact_mean, 2)
    pub priority: f64,
}

/// A ranked entry tagged with its dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPriority {
    pub dimension: Dimension,
    pub gap: f64,
    pub impact_mean: f64,
    pub priority: f64,
}

/// Per-dimension detail plus the descending priority ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityReport {
    pub by_dimension: BTreeMap<Dimension, DimensionPriority>,
    pub ranked: Vec<RankedPriority>,
}

impl PriorityReport {
    /// The highest-priority entry.
    pub fn top(&self) -> Option<&RankedPriority> {
        self.ranked.first()
    }
}

// ============================================================================
// Scoring
// ============================================================================

fn avg_impact(items: &[SwotItem]) -> f64 {
    if items.is_empty() {
        0.0
    } else {
        items.iter().map(|i| i.impact as f64).sum::<f64>() / items.len() as f64
    }
}

fn avg_sentiment(items: &[SwotItem]) -> f64 {
    if items.is_empty() {
        0.0
    } else {
        items.iter().map(|i| i.sentiment).sum::<f64>() / items.len() as f64
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Compute per-dimension priorities across the three layers.
///
/// For each dimension:
/// - per-layer `avg_impact` / `avg_sentiment` (0.0 for empty lists)
/// - `gap` = max - min of the three layer-average impacts
/// - `impact_mean` = mean of the three layer-average impacts
/// - `priority` = round(gap * impact_mean, 2)
///
/// Gap and impact_mean depend only on the multiset of layer averages, so the
/// result is invariant under relabeling which physical layer is which. The
/// ranking is a stable descending sort: ties keep `Dimension::ALL` order.
pub fn compute_priorities(
    canonical: &LayerOutput,
    corpus: &LayerOutput,
    transactional: &LayerOutput,
) -> PriorityReport {
    let mut by_dimension = BTreeMap::new();

    for dimension in Dimension::ALL {
        let layer_impacts = LayerAverages {
            canonical: avg_impact(canonical.items(dimension)),
            corpus: avg_impact(corpus.items(dimension)),
            transactional: avg_impact(transactional.items(dimension)),
        };
        let layer_sentiments = LayerAverages {
            canonical: avg_sentiment(canonical.items(dimension)),
            corpus: avg_sentiment(corpus.items(dimension)),
            transactional: avg_sentiment(transactional.items(dimension)),
        };

        let impacts = layer_impacts.values();
        let max = impacts.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = impacts.iter().cloned().fold(f64::INFINITY, f64::min);
        let gap = max - min;
        let impact_mean = impacts.iter().sum::<f64>() / impacts.len() as f64;
        let priority = round2(gap * impact_mean);

        by_dimension.insert(
            dimension,
            DimensionPriority {
                layer_impacts,
                layer_sentiments,
                gap: round3(gap),
                impact_mean: round3(impact_mean),
                priority,
            },
        );
    }

    let mut ranked: Vec<RankedPriority> = Dimension::ALL
        .iter()
        .map(|dimension| {
            let detail = &by_dimension[dimension];
            RankedPriority {
                dimension: *dimension,
                gap: detail.gap,
                impact_mean: detail.impact_mean,
                priority: detail.priority,
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(Ordering::Equal)
    });

    PriorityReport {
        by_dimension,
        ranked,
    }
}

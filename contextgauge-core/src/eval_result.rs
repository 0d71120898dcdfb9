// Copyright 2025 ContextGauge (https://github.com/contextgauge)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Evaluation result contract: sub-scores, aggregation, and the
//! recommendation bands derived from the overall score.

use serde::{Deserialize, Serialize};

/// Display cap for `key_points` and `missing_aspects`.
pub const ASPECT_LIMIT: usize = 3;

/// How relevant the retrieved context is to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceResult {
    /// In [0.0, 1.0]. Clamped by the evaluator regardless of what the
    /// judgment model returned.
    pub relevance_score: f64,
    pub explanation: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// Whether the retrieved context suffices to answer the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessResult {
    pub completeness_score: f64,
    pub explanation: String,
    #[serde(default)]
    pub missing_aspects: Vec<String>,
}

/// Weights used to combine the two sub-scores into the overall score.
///
/// Equal weighting is the default; the combination normalizes by the weight
/// sum so any non-negative pair is valid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityWeights {
    pub relevance: f64,
    pub completeness: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            relevance: 0.5,
            completeness: 0.5,
        }
    }
}

impl QualityWeights {
    /// Deterministic weighted mean of the two sub-scores. Inputs are
    /// clamped so the result always lies in [0, 1].
    pub fn combine(&self, relevance_score: f64, completeness_score: f64) -> f64 {
        let total = self.relevance + self.completeness;
        if total <= 0.0 {
            return 0.0;
        }
        let relevance = clamp_score(relevance_score);
        let completeness = clamp_score(completeness_score);
        (relevance * self.relevance + completeness * self.completeness) / total
    }
}

/// Clamps a judged score into [0, 1]; NaN collapses to 0.0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Recommendation bands over the overall score.
///
/// The bands partition [0, 1] with inclusive lower bounds: every score maps
/// to exactly one band, and 0.8 sits in `High` while 0.79999 sits in
/// `Moderate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    High,
    Moderate,
    Low,
}

impl Recommendation {
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= 0.8 {
            Recommendation::High
        } else if score >= 0.5 {
            Recommendation::Moderate
        } else {
            Recommendation::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::High => "High quality context - suitable for use",
            Recommendation::Moderate => "Moderate quality - may need supplementation",
            Recommendation::Low => "Low quality - consider retrieving additional context",
        }
    }
}

/// The full quality verdict for one `(query, contexts)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub overall_quality_score: f64,
    pub relevance: RelevanceResult,
    pub completeness: CompletenessResult,
    pub recommendation: String,
}

impl EvaluationResult {
    /// Builds the aggregate from two sub-results. Waits on the caller to
    /// have both outcomes in hand; there is no partial construction.
    pub fn from_parts(
        relevance: RelevanceResult,
        completeness: CompletenessResult,
        weights: QualityWeights,
    ) -> Self {
        let overall =
            weights.combine(relevance.relevance_score, completeness.completeness_score);
        Self {
            overall_quality_score: overall,
            relevance,
            completeness,
            recommendation: Recommendation::from_score(overall).as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_weights_combine() {
        let weights = QualityWeights::default();
        let overall = weights.combine(0.9, 0.7);
        assert!((overall - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_combine_clamps_out_of_range_inputs() {
        let weights = QualityWeights::default();
        assert!((weights.combine(1.7, -0.3) - 0.5).abs() < 1e-6);
        assert_eq!(weights.combine(f64::NAN, f64::NAN), 0.0);
    }

    #[test]
    fn test_combine_zero_weights() {
        let weights = QualityWeights {
            relevance: 0.0,
            completeness: 0.0,
        };
        assert_eq!(weights.combine(1.0, 1.0), 0.0);
    }

    #[test]
    fn test_recommendation_band_boundaries() {
        assert_eq!(Recommendation::from_score(0.8), Recommendation::High);
        assert_eq!(Recommendation::from_score(0.79999), Recommendation::Moderate);
        assert_eq!(Recommendation::from_score(0.5), Recommendation::Moderate);
        assert_eq!(Recommendation::from_score(0.49999), Recommendation::Low);
        assert_eq!(Recommendation::from_score(1.0), Recommendation::High);
        assert_eq!(Recommendation::from_score(0.0), Recommendation::Low);
    }

    #[test]
    fn test_every_score_maps_to_exactly_one_band() {
        // Sweep the unit interval; from_score is total over clamped input.
        for i in 0..=1000 {
            let score = i as f64 / 1000.0;
            let band = Recommendation::from_score(score);
            let matches = [
                score >= 0.8,
                (0.5..0.8).contains(&score),
                score < 0.5,
            ]
            .iter()
            .filter(|&&m| m)
            .count();
            assert_eq!(matches, 1, "score {score} matched {matches} bands");
            let _ = band.as_str();
        }
    }

    #[test]
    fn test_from_parts_recomputes_identically() {
        let relevance = RelevanceResult {
            relevance_score: 0.6,
            explanation: "partially on topic".to_string(),
            key_points: vec!["IAU definition".to_string()],
        };
        let completeness = CompletenessResult {
            completeness_score: 0.4,
            explanation: "orbit clearing missing".to_string(),
            missing_aspects: vec!["orbital dominance".to_string()],
        };

        let a = EvaluationResult::from_parts(
            relevance.clone(),
            completeness.clone(),
            QualityWeights::default(),
        );
        let b = EvaluationResult::from_parts(relevance, completeness, QualityWeights::default());

        assert_eq!(a.overall_quality_score, b.overall_quality_score);
        assert!((a.overall_quality_score - 0.5).abs() < 1e-6);
        assert_eq!(a.recommendation, Recommendation::Moderate.as_str());
    }
}

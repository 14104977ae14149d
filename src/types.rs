use serde::{Deserialize, Serialize};

use crate::codebook::Codebook;

/// Distance metric used to rank candidate centroids.
///
/// The comparison direction differs per metric: squared L2 selects the
/// minimum score, inner product the maximum. Both k-means assignment and
/// encoding go through [`DistanceMetric::improves`] so the two stages can
/// never disagree on which centroid is "best".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared Euclidean distance (lower is better).
    #[default]
    SquaredL2,
    /// Inner (dot) product similarity (higher is better).
    InnerProduct,
}

impl DistanceMetric {
    /// Score a candidate centroid against a query slice.
    #[inline]
    pub fn score(&self, q: &[f32], x: &[f32]) -> f32 {
        match self {
            DistanceMetric::SquaredL2 => crate::distance::squared_l2(q, x),
            DistanceMetric::InnerProduct => crate::distance::dot(q, x),
        }
    }

    /// Whether `candidate` is strictly better than `incumbent`.
    ///
    /// Strict comparison means ties keep the earlier (lowest-index) centroid.
    #[inline]
    pub fn improves(&self, candidate: f32, incumbent: f32) -> bool {
        match self {
            DistanceMetric::SquaredL2 => candidate < incumbent,
            DistanceMetric::InnerProduct => candidate > incumbent,
        }
    }

    /// Sentinel score that any real candidate improves on.
    #[inline]
    pub fn worst_score(&self) -> f32 {
        match self {
            DistanceMetric::SquaredL2 => f32::INFINITY,
            DistanceMetric::InnerProduct => f32::NEG_INFINITY,
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceMetric::SquaredL2 => write!(f, "squared_l2"),
            DistanceMetric::InnerProduct => write!(f, "inner_product"),
        }
    }
}

/// Unsigned integer width of the codes emitted by a quantizer.
///
/// The smallest of 8/16/32 bits that can represent `Ks` distinct values.
/// Fixed at quantizer construction so downstream buffer sizing never
/// revisits the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeWidth {
    /// Codes fit in a u8 (Ks <= 256).
    U8,
    /// Codes fit in a u16 (Ks <= 65536).
    U16,
    /// Codes fit in a u32.
    U32,
}

impl CodeWidth {
    /// Smallest width able to represent indices `0..ks`.
    pub fn for_codebook_size(ks: usize) -> CodeWidth {
        if ks <= 1 << 8 {
            CodeWidth::U8
        } else if ks <= 1 << 16 {
            CodeWidth::U16
        } else {
            CodeWidth::U32
        }
    }

    /// Width in bits.
    pub fn bits(&self) -> u32 {
        match self {
            CodeWidth::U8 => 8,
            CodeWidth::U16 => 16,
            CodeWidth::U32 => 32,
        }
    }
}

impl std::fmt::Display for CodeWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u{}", self.bits())
    }
}

/// Centroid initialization strategy for codebook training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStrategy {
    /// Seed centroids from uniformly sampled distinct training points.
    Points,
    /// Assign every sample a random cluster, seed centroids from the
    /// partition means.
    RandomPartition,
    /// k-means++ style seeding: points chosen with probability proportional
    /// to squared distance from the nearest already-chosen centroid.
    PlusPlus,
    /// Externally supplied initial codebook of shape (M, Ks, Ds).
    Matrix(Codebook),
}

impl Default for InitStrategy {
    fn default() -> Self {
        InitStrategy::Points
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_metric_serde_roundtrip() {
        for (variant, expected_json) in [
            (DistanceMetric::SquaredL2, "\"squared_l2\""),
            (DistanceMetric::InnerProduct, "\"inner_product\""),
        ] {
            let json = serde_json::to_string(&variant).unwrap();
            assert_eq!(json, expected_json);
            let back: DistanceMetric = serde_json::from_str(&json).unwrap();
            assert_eq!(back, variant);
        }
    }

    #[test]
    fn test_distance_metric_display() {
        assert_eq!(DistanceMetric::SquaredL2.to_string(), "squared_l2");
        assert_eq!(DistanceMetric::InnerProduct.to_string(), "inner_product");
    }

    #[test]
    fn test_improves_direction() {
        // L2: lower wins, ties lose.
        assert!(DistanceMetric::SquaredL2.improves(1.0, 2.0));
        assert!(!DistanceMetric::SquaredL2.improves(2.0, 1.0));
        assert!(!DistanceMetric::SquaredL2.improves(1.0, 1.0));

        // Inner product: higher wins, ties lose.
        assert!(DistanceMetric::InnerProduct.improves(2.0, 1.0));
        assert!(!DistanceMetric::InnerProduct.improves(1.0, 2.0));
        assert!(!DistanceMetric::InnerProduct.improves(1.0, 1.0));
    }

    #[test]
    fn test_worst_score_always_improved() {
        for metric in [DistanceMetric::SquaredL2, DistanceMetric::InnerProduct] {
            assert!(metric.improves(0.0, metric.worst_score()));
        }
    }

    #[test]
    fn test_code_width_boundaries() {
        assert_eq!(CodeWidth::for_codebook_size(1), CodeWidth::U8);
        assert_eq!(CodeWidth::for_codebook_size(256), CodeWidth::U8);
        assert_eq!(CodeWidth::for_codebook_size(257), CodeWidth::U16);
        assert_eq!(CodeWidth::for_codebook_size(65536), CodeWidth::U16);
        assert_eq!(CodeWidth::for_codebook_size(65537), CodeWidth::U32);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_code_width_at_max_codebook_size() {
        assert_eq!(CodeWidth::for_codebook_size(1 << 32), CodeWidth::U32);
    }

    #[test]
    fn test_code_width_display() {
        assert_eq!(CodeWidth::U8.to_string(), "u8");
        assert_eq!(CodeWidth::U16.to_string(), "u16");
        assert_eq!(CodeWidth::U32.to_string(), "u32");
    }

    #[test]
    fn test_init_strategy_serde() {
        let json = serde_json::to_string(&InitStrategy::PlusPlus).unwrap();
        assert_eq!(json, "\"plus_plus\"");
        let back: InitStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InitStrategy::PlusPlus);
    }

    #[test]
    fn test_init_strategy_default() {
        assert_eq!(InitStrategy::default(), InitStrategy::Points);
    }
}

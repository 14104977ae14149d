//! Scalar scoring kernels for centroid ranking.
//!
//! The loops are chunked so LLVM can auto-vectorize them when compiling with
//! `-C target-cpu=native` or appropriate target features. Subspace slices are
//! short (often 2-16 dims), so the remainder path matters as much as the
//! chunked path here.

/// Squared Euclidean distance: `sum((a_i - b_i)^2)`.
///
/// Squared to avoid the sqrt cost; ordering over candidates is preserved.
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "slice dimensions must match");

    let mut sum: f32 = 0.0;
    let chunks = a.len() / 8;
    let remainder = a.len() % 8;

    for i in 0..chunks {
        let base = i * 8;
        let mut tmp = [0.0f32; 8];
        for j in 0..8 {
            let d = a[base + j] - b[base + j];
            tmp[j] = d * d;
        }
        for val in tmp {
            sum += val;
        }
    }

    let base = chunks * 8;
    for i in 0..remainder {
        let d = a[base + i] - b[base + i];
        sum += d * d;
    }

    sum
}

/// Inner (dot) product: `sum(a_i * b_i)`.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "slice dimensions must match");

    let mut sum: f32 = 0.0;
    let chunks = a.len() / 8;
    let remainder = a.len() % 8;

    for i in 0..chunks {
        let base = i * 8;
        let mut tmp = [0.0f32; 8];
        for j in 0..8 {
            tmp[j] = a[base + j] * b[base + j];
        }
        for val in tmp {
            sum += val;
        }
    }

    let base = chunks * 8;
    for i in 0..remainder {
        sum += a[base + i] * b[base + i];
    }

    sum
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DistanceMetric;

    #[test]
    fn test_squared_l2_zero() {
        let a = vec![3.0, 4.0];
        assert!((squared_l2(&a, &a) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_squared_l2_known() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        // 3^2 + 3^2 + 3^2 = 27
        assert!((squared_l2(&a, &b) - 27.0).abs() < 1e-6);
    }

    #[test]
    fn test_dot_orthogonal() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert!((dot(&a, &b) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_dot_known() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 2.0, 3.0];
        assert!((dot(&a, &b) - 14.0).abs() < 1e-6);
    }

    #[test]
    fn test_chunked_loop_with_remainder() {
        // Dimension that exercises both the chunked loop and the remainder.
        let dim = 19;
        let a: Vec<f32> = (0..dim).map(|i| i as f32 * 0.25).collect();
        let b: Vec<f32> = (0..dim).map(|i| (dim - i) as f32 * 0.25).collect();

        let naive_l2: f32 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        assert!((squared_l2(&a, &b) - naive_l2).abs() < 1e-4);

        let naive_dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        assert!((dot(&a, &b) - naive_dot).abs() < 1e-4);
    }

    #[test]
    fn test_metric_score_dispatch() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        assert!((DistanceMetric::SquaredL2.score(&a, &b) - 25.0).abs() < 1e-6);
        assert!((DistanceMetric::InnerProduct.score(&b, &b) - 25.0).abs() < 1e-6);
    }
}

//! Seeded k-means training for one subspace codebook.
//!
//! Each subspace is trained independently, so this module is written for a
//! single (N x Ds) slice and the quantizer fans it out across subspaces.
//! Centroid storage is flat and reused across iterations to avoid
//! per-iteration heap churn on large training sets.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::{GondolaError, Result};
use crate::types::DistanceMetric;

/// Per-subspace view of the initialization strategy.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SubspaceInit<'a> {
    /// Distinct training points sampled uniformly.
    Points,
    /// Means of a uniformly random partition of the samples.
    RandomPartition,
    /// k-means++ weighted seeding.
    PlusPlus,
    /// Caller-supplied flat `ks * ds` block.
    Matrix(&'a [f32]),
}

/// Parameters for one subspace training run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrainParams<'a> {
    pub ds: usize,
    pub ks: usize,
    pub iterations: usize,
    pub seed: u64,
    pub metric: DistanceMetric,
    pub init: SubspaceInit<'a>,
}

/// Train `ks` centroids of dimension `ds` from the given subspace slices.
///
/// Returns a flat `ks * ds` centroid block. Deterministic: the same
/// (samples, params) always produce the same block.
pub(crate) fn train_subspace(samples: &[&[f32]], params: &TrainParams) -> Result<Vec<f32>> {
    let n = samples.len();
    let TrainParams {
        ds,
        ks,
        iterations,
        seed,
        metric,
        init,
    } = *params;

    // Ks non-empty clusters need more than Ks samples.
    if ks >= n {
        return Err(GondolaError::InsufficientTrainingData { ks, n });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = match init {
        SubspaceInit::Points => init_points(samples, ks, ds, &mut rng),
        SubspaceInit::RandomPartition => init_random_partition(samples, ks, ds, &mut rng),
        SubspaceInit::PlusPlus => init_plus_plus(samples, ks, ds, &mut rng),
        SubspaceInit::Matrix(block) => {
            debug_assert_eq!(block.len(), ks * ds);
            block.to_vec()
        }
    };

    // usize::MAX marks "not yet assigned" so the first round always counts
    // as changed.
    let mut assignments = vec![usize::MAX; n];
    let mut scores = vec![0.0f32; n];
    let mut counts = vec![0usize; ks];
    let mut sums = vec![0.0f32; ks * ds];

    for iter in 0..iterations {
        let changed = assign_step(samples, &centroids, ds, ks, metric, &mut assignments, &mut scores);

        counts.fill(0);
        for &a in &assignments {
            counts[a] += 1;
        }
        let empties = counts.iter().filter(|&&c| c == 0).count();

        if !changed && empties == 0 {
            debug!(iter, "k-means converged, assignments stable");
            return Ok(centroids);
        }

        // Mean update for populated clusters.
        sums.fill(0.0);
        for (i, slice) in samples.iter().enumerate() {
            let base = assignments[i] * ds;
            for d in 0..ds {
                sums[base + d] += slice[d];
            }
        }
        for k in 0..ks {
            if counts[k] == 0 {
                continue;
            }
            let inv = 1.0 / counts[k] as f32;
            let base = k * ds;
            for d in 0..ds {
                centroids[base + d] = sums[base + d] * inv;
            }
        }

        if empties > 0 {
            debug!(iter, empties, "reseeding empty clusters");
            reseed_empty_clusters(samples, &mut centroids, &counts, &scores, ds, metric);
        }
    }

    // Iteration budget exhausted without a stable round. The centroids are
    // still usable, just not fully converged.
    warn!(
        iterations,
        "k-means used the full iteration budget without stabilizing"
    );
    Ok(centroids)
}

/// Assign every sample to its best centroid under the metric.
///
/// Ties keep the lowest centroid index (strict improvement only). Records
/// the winning score per sample and returns whether any assignment moved.
fn assign_step(
    samples: &[&[f32]],
    centroids: &[f32],
    ds: usize,
    ks: usize,
    metric: DistanceMetric,
    assignments: &mut [usize],
    scores: &mut [f32],
) -> bool {
    let mut changed = false;
    for (i, slice) in samples.iter().enumerate() {
        let mut best = metric.worst_score();
        let mut best_k = 0usize;
        for k in 0..ks {
            let score = metric.score(slice, &centroids[k * ds..(k + 1) * ds]);
            if metric.improves(score, best) {
                best = score;
                best_k = k;
            }
        }
        if assignments[i] != best_k {
            assignments[i] = best_k;
            changed = true;
        }
        scores[i] = best;
    }
    changed
}

/// Reseed each emptied centroid to the sample currently worst-served by its
/// own centroid, consuming a distinct sample per reseed.
///
/// Deterministic: clusters are visited in ascending index order and ties on
/// the worst score keep the lowest sample index.
fn reseed_empty_clusters(
    samples: &[&[f32]],
    centroids: &mut [f32],
    counts: &[usize],
    scores: &[f32],
    ds: usize,
    metric: DistanceMetric,
) {
    let mut consumed = vec![false; samples.len()];
    for k in 0..counts.len() {
        if counts[k] > 0 {
            continue;
        }
        let mut worst: Option<usize> = None;
        for i in 0..samples.len() {
            if consumed[i] {
                continue;
            }
            // `i` is worse-served than the incumbent when the incumbent's
            // score would beat it.
            let take = match worst {
                None => true,
                Some(w) => metric.improves(scores[w], scores[i]),
            };
            if take {
                worst = Some(i);
            }
        }
        if let Some(i) = worst {
            consumed[i] = true;
            centroids[k * ds..(k + 1) * ds].copy_from_slice(samples[i]);
        }
    }
}

/// Seed centroids from `ks` distinct training points chosen uniformly.
fn init_points(samples: &[&[f32]], ks: usize, ds: usize, rng: &mut StdRng) -> Vec<f32> {
    let picks = rand::seq::index::sample(rng, samples.len(), ks);
    let mut centroids = Vec::with_capacity(ks * ds);
    for idx in picks {
        centroids.extend_from_slice(samples[idx]);
    }
    centroids
}

/// Seed centroids from the means of a uniformly random partition.
fn init_random_partition(samples: &[&[f32]], ks: usize, ds: usize, rng: &mut StdRng) -> Vec<f32> {
    let n = samples.len();
    let mut counts = vec![0usize; ks];
    let mut sums = vec![0.0f32; ks * ds];

    for slice in samples {
        let k = rng.gen_range(0..ks);
        counts[k] += 1;
        let base = k * ds;
        for d in 0..ds {
            sums[base + d] += slice[d];
        }
    }

    let mut centroids = vec![0.0f32; ks * ds];
    for k in 0..ks {
        let base = k * ds;
        if counts[k] == 0 {
            // A partition cell came up empty; fall back to a random point.
            let idx = rng.gen_range(0..n);
            centroids[base..base + ds].copy_from_slice(samples[idx]);
        } else {
            let inv = 1.0 / counts[k] as f32;
            for d in 0..ds {
                centroids[base + d] = sums[base + d] * inv;
            }
        }
    }
    centroids
}

/// k-means++ seeding: pick points with probability proportional to squared
/// distance from the nearest already-chosen centroid.
///
/// Seeding weights always use squared L2 spread; only assignment and
/// encoding are metric-aware.
fn init_plus_plus(samples: &[&[f32]], ks: usize, ds: usize, rng: &mut StdRng) -> Vec<f32> {
    let n = samples.len();
    let mut centroids = Vec::with_capacity(ks * ds);

    let first = rng.gen_range(0..n);
    centroids.extend_from_slice(samples[first]);

    let mut min_dists = vec![f32::MAX; n];
    for c in 1..ks {
        let last = &centroids[(c - 1) * ds..c * ds];
        let mut total: f64 = 0.0;
        for (i, slice) in samples.iter().enumerate() {
            let d = crate::distance::squared_l2(slice, last);
            if d < min_dists[i] {
                min_dists[i] = d;
            }
            total += min_dists[i] as f64;
        }

        if total <= 0.0 {
            // Every remaining point coincides with a chosen centroid.
            warn!(chosen = c, ks, "zero residual spread, repeating last seed");
            let tail = centroids[(c - 1) * ds..c * ds].to_vec();
            while centroids.len() < ks * ds {
                centroids.extend_from_slice(&tail);
            }
            break;
        }

        let threshold = rng.gen::<f64>() * total;
        let mut cumulative: f64 = 0.0;
        let mut chosen = n - 1;
        for (i, &d) in min_dists.iter().enumerate() {
            cumulative += d as f64;
            if cumulative >= threshold {
                chosen = i;
                break;
            }
        }
        centroids.extend_from_slice(samples[chosen]);
    }

    centroids
}

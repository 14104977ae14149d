//! The product quantizer: configuration, codebook training, and encoding.
//!
//! A quantizer splits each D-dimensional vector into M contiguous slices of
//! Ds = D/M dimensions, learns Ks centroids per subspace from training data,
//! and encodes vectors as M centroid indices. Subspaces are independent, so
//! both training and encoding fan out across M with rayon and join only to
//! assemble the final tensor/matrix.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::codebook::Codebook;
use crate::codes::CodeMatrix;
use crate::error::{GondolaError, Result};
use crate::kmeans::{self, SubspaceInit, TrainParams};
use crate::subspace;
use crate::types::{CodeWidth, DistanceMetric, InitStrategy};

/// Options for a single `fit` call.
///
/// Defaults are the conventional PQ training settings: 20 Lloyd iterations,
/// seed 123, centroids seeded from training points.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    /// Maximum Lloyd iterations per subspace.
    pub iterations: usize,
    /// Base RNG seed; per-subspace seeds are derived from it.
    pub seed: u64,
    /// Centroid initialization strategy.
    pub init: InitStrategy,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            iterations: 20,
            seed: 123,
            init: InitStrategy::Points,
        }
    }
}

/// A product quantizer over M subspaces with Ks centroids each.
///
/// Two states: untrained (no codebook, only `fit` permitted) and trained
/// (`encode`/`decode` permitted, `fit` retrains). A failed `fit` never
/// touches existing state.
#[derive(Debug, Clone)]
pub struct ProductQuantizer {
    m: usize,
    ks: usize,
    metric: DistanceMetric,
    verbose: bool,
    code_width: CodeWidth,
    ds: Option<usize>,
    codebook: Option<Codebook>,
}

impl ProductQuantizer {
    /// Create an untrained quantizer.
    ///
    /// Fails with `InvalidConfig` if `m` is zero or `ks` is outside
    /// `1..=2^32`. The code width is derived here and fixed for the
    /// quantizer's lifetime.
    pub fn new(m: usize, ks: usize, metric: DistanceMetric) -> Result<Self> {
        if m == 0 {
            return Err(GondolaError::InvalidConfig(
                "subspace count M must be > 0".into(),
            ));
        }
        if ks == 0 || (ks as u64) > (1u64 << 32) {
            return Err(GondolaError::InvalidConfig(format!(
                "codebook size Ks must be in 1..=2^32, got {ks}"
            )));
        }

        let code_width = CodeWidth::for_codebook_size(ks);
        debug!(m, ks, metric = %metric, code_width = %code_width, "created product quantizer");

        Ok(Self {
            m,
            ks,
            metric,
            verbose: false,
            code_width,
            ds: None,
            codebook: None,
        })
    }

    /// Promote per-subspace progress events from `debug` to `info` level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Number of subspaces (M).
    pub fn num_subspaces(&self) -> usize {
        self.m
    }

    /// Codebook size per subspace (Ks).
    pub fn codebook_size(&self) -> usize {
        self.ks
    }

    /// The configured distance metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Integer width of emitted codes.
    pub fn code_width(&self) -> CodeWidth {
        self.code_width
    }

    /// Subspace dimensionality (Ds = D/M), known after the first fit.
    pub fn subspace_dim(&self) -> Option<usize> {
        self.ds
    }

    /// The trained codebook, if any.
    pub fn codebook(&self) -> Option<&Codebook> {
        self.codebook.as_ref()
    }

    /// Whether `fit` has succeeded at least once.
    pub fn is_trained(&self) -> bool {
        self.codebook.is_some()
    }

    /// Train the codebook from `vectors`, replacing any previous codebook.
    ///
    /// Each subspace is clustered independently (in parallel) with a seed
    /// derived from `opts.seed`, so results are reproducible regardless of
    /// thread scheduling. On any error the quantizer keeps its prior state.
    pub fn fit(&mut self, vectors: &[&[f32]], opts: &TrainOptions) -> Result<()> {
        let d = self.validate_rows(vectors)?;
        let n = vectors.len();

        if d % self.m != 0 {
            return Err(GondolaError::InvalidConfig(format!(
                "input dimension {d} is not divisible by M = {}",
                self.m
            )));
        }
        if self.ks >= n {
            return Err(GondolaError::InsufficientTrainingData { ks: self.ks, n });
        }
        let ds = d / self.m;

        if let InitStrategy::Matrix(initial) = &opts.init {
            let shape = initial.shape();
            if shape != (self.m, self.ks, ds) {
                return Err(GondolaError::InvalidInput(format!(
                    "initial codebook shape {shape:?} does not match ({}, {}, {ds})",
                    self.m, self.ks
                )));
            }
        }

        info!(
            n,
            d,
            m = self.m,
            ks = self.ks,
            metric = %self.metric,
            iterations = opts.iterations,
            seed = opts.seed,
            "training codebook"
        );

        let verbose = self.verbose;
        let blocks: Vec<Vec<f32>> = (0..self.m)
            .into_par_iter()
            .map(|sub| {
                if verbose {
                    info!(subspace = sub + 1, total = self.m, "training subspace");
                } else {
                    debug!(subspace = sub + 1, total = self.m, "training subspace");
                }
                let samples = subspace::slices_of(vectors, sub, ds);
                let init = match &opts.init {
                    InitStrategy::Points => SubspaceInit::Points,
                    InitStrategy::RandomPartition => SubspaceInit::RandomPartition,
                    InitStrategy::PlusPlus => SubspaceInit::PlusPlus,
                    InitStrategy::Matrix(cb) => SubspaceInit::Matrix(cb.subspace_block(sub)),
                };
                kmeans::train_subspace(
                    &samples,
                    &TrainParams {
                        ds,
                        ks: self.ks,
                        iterations: opts.iterations,
                        seed: opts.seed.wrapping_add(sub as u64),
                        metric: self.metric,
                        init,
                    },
                )
            })
            .collect::<Result<_>>()?;

        // All subspaces trained; swap the codebook in wholesale.
        self.ds = Some(ds);
        self.codebook = Some(Codebook::from_subspaces(self.ks, ds, blocks));
        Ok(())
    }

    /// Encode vectors into an N x M matrix of centroid indices.
    ///
    /// Pure with respect to the quantizer: the codebook is read-only here,
    /// so concurrent encodes are safe once training has completed.
    pub fn encode(&self, vectors: &[&[f32]]) -> Result<CodeMatrix> {
        let codebook = self.codebook.as_ref().ok_or(GondolaError::NotTrained)?;
        let ds = codebook.shape().2;
        let d = self.validate_rows(vectors)?;

        if d != self.m * ds {
            return Err(GondolaError::InvalidInput(format!(
                "input dimension {d} does not match M * Ds = {}",
                self.m * ds
            )));
        }

        debug!(n = vectors.len(), m = self.m, "encoding vectors");

        let verbose = self.verbose;
        let columns: Vec<Vec<u32>> = (0..self.m)
            .into_par_iter()
            .map(|sub| {
                if verbose {
                    info!(subspace = sub + 1, total = self.m, "encoding subspace");
                } else {
                    debug!(subspace = sub + 1, total = self.m, "encoding subspace");
                }
                let slices = subspace::slices_of(vectors, sub, ds);
                encode_subspace(
                    &slices,
                    codebook.subspace_block(sub),
                    ds,
                    self.ks,
                    self.metric,
                )
            })
            .collect();

        Ok(CodeMatrix::from_columns(
            self.code_width,
            vectors.len(),
            &columns,
        ))
    }

    /// Reconstruct approximate vectors from codes by concatenating the
    /// selected centroids.
    ///
    /// Codes from a quantizer with a larger codebook are rejected, not
    /// indexed: every entry must be in `0..Ks`.
    pub fn decode(&self, codes: &CodeMatrix) -> Result<Vec<Vec<f32>>> {
        let codebook = self.codebook.as_ref().ok_or(GondolaError::NotTrained)?;
        if codes.cols() != self.m {
            return Err(GondolaError::InvalidInput(format!(
                "code matrix has {} columns, expected M = {}",
                codes.cols(),
                self.m
            )));
        }

        let ds = codebook.shape().2;
        let mut out = Vec::with_capacity(codes.rows());
        for row in 0..codes.rows() {
            let mut vector = Vec::with_capacity(self.m * ds);
            for sub in 0..self.m {
                let k = codes.get(row, sub) as usize;
                if k >= self.ks {
                    return Err(GondolaError::InvalidInput(format!(
                        "code {k} at ({row}, {sub}) is out of range for codebook size {}",
                        self.ks
                    )));
                }
                vector.extend_from_slice(codebook.centroid(sub, k));
            }
            out.push(vector);
        }
        Ok(out)
    }

    /// Check that the batch is non-empty and rectangular; returns D.
    fn validate_rows(&self, vectors: &[&[f32]]) -> Result<usize> {
        let first = vectors
            .first()
            .ok_or_else(|| GondolaError::InvalidInput("empty vector batch".into()))?;
        let d = first.len();
        if d == 0 {
            return Err(GondolaError::InvalidInput(
                "vectors must have at least one dimension".into(),
            ));
        }
        for (i, row) in vectors.iter().enumerate() {
            if row.len() != d {
                return Err(GondolaError::InvalidInput(format!(
                    "row {i} has length {}, expected {d}",
                    row.len()
                )));
            }
        }
        Ok(d)
    }
}

/// Equality covers configuration (M, Ks, metric, code width, Ds) and
/// bitwise-exact codebook contents. The `verbose` toggle is presentation
/// state and does not participate.
impl PartialEq for ProductQuantizer {
    fn eq(&self, other: &Self) -> bool {
        if (self.m, self.ks, self.metric, self.code_width, self.ds)
            != (other.m, other.ks, other.metric, other.code_width, other.ds)
        {
            return false;
        }
        match (&self.codebook, &other.codebook) {
            (None, None) => true,
            (Some(a), Some(b)) => a.bitwise_eq(b),
            _ => false,
        }
    }
}

/// Assign each slice to its best centroid under the metric.
///
/// Pure function of (slices, centroids, metric); ties keep the lowest
/// centroid index.
fn encode_subspace(
    slices: &[&[f32]],
    centroids: &[f32],
    ds: usize,
    ks: usize,
    metric: DistanceMetric,
) -> Vec<u32> {
    slices
        .iter()
        .map(|slice| {
            let mut best = metric.worst_score();
            let mut best_k = 0u32;
            for k in 0..ks {
                let score = metric.score(slice, &centroids[k * ds..(k + 1) * ds]);
                if metric.improves(score, best) {
                    best = score;
                    best_k = k as u32;
                }
            }
            best_k
        })
        .collect()
}

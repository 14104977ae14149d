//! The trained codebook: an (M, Ks, Ds) tensor of centroids.

use serde::{Deserialize, Serialize};

use crate::error::{GondolaError, Result};

/// Centroid tensor of shape (M, Ks, Ds), stored flat in row-major
/// (subspace, codeword, dimension) order.
///
/// `centroid(m, k)` is the k-th representative point for subspace m. A
/// codebook is immutable once handed to a quantizer; refitting replaces it
/// wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Codebook {
    m: usize,
    ks: usize,
    ds: usize,
    centroids: Vec<f32>,
}

impl Codebook {
    /// Build a codebook from flat centroid data of length `m * ks * ds`.
    pub fn from_flat(m: usize, ks: usize, ds: usize, centroids: Vec<f32>) -> Result<Self> {
        let expected = m * ks * ds;
        if centroids.len() != expected {
            return Err(GondolaError::InvalidInput(format!(
                "codebook data length {} does not match shape ({m}, {ks}, {ds}) = {expected}",
                centroids.len()
            )));
        }
        Ok(Self {
            m,
            ks,
            ds,
            centroids,
        })
    }

    /// Assemble a codebook from per-subspace blocks, each of length `ks * ds`.
    pub(crate) fn from_subspaces(ks: usize, ds: usize, blocks: Vec<Vec<f32>>) -> Self {
        let m = blocks.len();
        let mut centroids = Vec::with_capacity(m * ks * ds);
        for block in blocks {
            debug_assert_eq!(block.len(), ks * ds);
            centroids.extend(block);
        }
        Self {
            m,
            ks,
            ds,
            centroids,
        }
    }

    /// Tensor shape as (M, Ks, Ds).
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.m, self.ks, self.ds)
    }

    /// The k-th centroid of subspace m.
    #[inline]
    pub fn centroid(&self, m: usize, k: usize) -> &[f32] {
        let base = (m * self.ks + k) * self.ds;
        &self.centroids[base..base + self.ds]
    }

    /// All centroids of subspace m as one flat `ks * ds` block.
    #[inline]
    pub(crate) fn subspace_block(&self, m: usize) -> &[f32] {
        let base = m * self.ks * self.ds;
        &self.centroids[base..base + self.ks * self.ds]
    }

    /// Whether every entry is a normal, finite float.
    pub fn is_finite(&self) -> bool {
        self.centroids.iter().all(|v| v.is_finite())
    }

    /// Bitwise-exact equality of the centroid data, ignoring nothing.
    ///
    /// Unlike `PartialEq` (IEEE `==`, under which `-0.0 == 0.0`), this
    /// compares the raw bit patterns.
    pub fn bitwise_eq(&self, other: &Codebook) -> bool {
        self.shape() == other.shape()
            && self
                .centroids
                .iter()
                .zip(other.centroids.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

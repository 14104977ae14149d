//! Gondola: product quantization for compact vector codes.
//!
//! A [`ProductQuantizer`] splits D-dimensional f32 vectors into M contiguous
//! subspaces, learns Ks centroids per subspace with seeded k-means, and
//! encodes vectors as M small integer indices. Codes take M bytes at
//! Ks <= 256 (vs 4D bytes for raw f32), which is the usual building block
//! for approximate-nearest-neighbor search over large collections.
//!
//! ```
//! use gondola::{DistanceMetric, ProductQuantizer, TrainOptions};
//!
//! let data: Vec<Vec<f32>> = (0..100)
//!     .map(|i| (0..8).map(|j| ((i * 8 + j) as f32 * 0.37) % 7.0).collect())
//!     .collect();
//! let rows: Vec<&[f32]> = data.iter().map(|v| v.as_slice()).collect();
//!
//! let mut pq = ProductQuantizer::new(4, 16, DistanceMetric::SquaredL2)?;
//! pq.fit(&rows, &TrainOptions::default())?;
//!
//! let codes = pq.encode(&rows)?;
//! assert_eq!((codes.rows(), codes.cols()), (100, 4));
//! # Ok::<(), gondola::GondolaError>(())
//! ```

pub mod codebook;
pub mod codes;
pub mod distance;
pub mod error;
mod kmeans;
pub mod quantizer;
pub mod subspace;
pub mod types;

pub use codebook::Codebook;
pub use codes::CodeMatrix;
pub use error::{GondolaError, Result};
pub use quantizer::{ProductQuantizer, TrainOptions};
pub use types::{CodeWidth, DistanceMetric, InitStrategy};

//! Hyperslab selections: regular, strided sub-regions of an n-dimensional array.
//!
//! A [`Hyperslab`] describes, per dimension,
//! - `start`: offset of the first block
//! - `stride`: spacing between the starts of successive blocks
//! - `count`: number of blocks
//! - `block`: extent of each block
//!
//! The last selected coordinate (exclusive) is
//! `start + stride * (count - 1) + block`,
//! and the selection addresses `count * block` elements per dimension.

use std::fmt;
use std::ops::Range;

use crate::dataset::Dataset;

fn check_rank(what: &str, values: &[u64], rank: usize) -> crate::Result<()> {
    if values.len() != rank {
        return Err(crate::Error::invalid_selection(format!(
            "{what} has {} dimensions, expected {rank}",
            values.len()
        )));
    }
    Ok(())
}

/// Empty stride or count vectors stand for all ones.
fn ones_if_empty(values: &[u64], rank: usize) -> Vec<u64> {
    if values.is_empty() {
        vec![1; rank]
    } else {
        values.to_vec()
    }
}

fn overflow(what: &str) -> crate::Error {
    crate::Error::invalid_selection(format!("{what} overflows 64 bits"))
}

/// Exclusive end coordinate per dimension.
///
/// A dimension with zero blocks ends at its start.
pub fn end(start: &[u64], stride: &[u64], count: &[u64], block: &[u64]) -> crate::Result<Vec<u64>> {
    let rank = start.len();
    let stride = ones_if_empty(stride, rank);
    let count = ones_if_empty(count, rank);
    check_rank("stride", &stride, rank)?;
    check_rank("count", &count, rank)?;
    check_rank("block", block, rank)?;

    (0..rank)
        .map(|d| {
            if count[d] == 0 {
                return Ok(start[d]);
            }
            stride[d]
                .checked_mul(count[d] - 1)
                .and_then(|n| n.checked_add(start[d]))
                .and_then(|n| n.checked_add(block[d]))
                .ok_or_else(|| overflow("selection end"))
        })
        .collect()
}

/// Total number of elements addressed by `count` blocks of extent `block`.
pub fn nof_datapoints(count: &[u64], block: &[u64]) -> crate::Result<u64> {
    let count = ones_if_empty(count, block.len());
    check_rank("count", &count, block.len())?;
    count
        .iter()
        .zip(block)
        .try_fold(1u64, |acc, (&c, &b)| {
            c.checked_mul(b).and_then(|n| acc.checked_mul(n))
        })
        .ok_or_else(|| overflow("number of datapoints"))
}

/// An immutable selection against an array of a given shape.
///
/// Construct with [`Hyperslab::new`], [`Hyperslab::with_block`],
/// [`Hyperslab::with_stride`] or a [`HyperslabBuilder`].
/// To change a parameter, rebuild via [`Hyperslab::to_builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperslab {
    shape: Vec<u64>,
    start: Vec<u64>,
    stride: Vec<u64>,
    count: Vec<u64>,
    block: Vec<u64>,
}

impl Hyperslab {
    /// Select the whole of `shape`.
    pub fn new(shape: Vec<u64>) -> Self {
        let rank = shape.len();
        Self {
            start: vec![0; rank],
            stride: vec![1; rank],
            count: vec![1; rank],
            block: shape.clone(),
            shape,
        }
    }

    /// Select a single contiguous block of extent `block` at `start`.
    pub fn with_block(shape: Vec<u64>, start: Vec<u64>, block: Vec<u64>) -> crate::Result<Self> {
        HyperslabBuilder::new(shape)
            .start(start)
            .block(block)
            .build()
    }

    /// Select `count` blocks of extent `block`, `stride` apart, from `start`.
    pub fn with_stride(
        shape: Vec<u64>,
        start: Vec<u64>,
        stride: Vec<u64>,
        count: Vec<u64>,
        block: Vec<u64>,
    ) -> crate::Result<Self> {
        HyperslabBuilder::new(shape)
            .start(start)
            .stride(stride)
            .count(count)
            .block(block)
            .build()
    }

    pub fn builder(shape: Vec<u64>) -> HyperslabBuilder {
        HyperslabBuilder::new(shape)
    }

    /// A builder seeded with every parameter of this selection.
    pub fn to_builder(&self) -> HyperslabBuilder {
        HyperslabBuilder {
            shape: self.shape.clone(),
            start: Some(self.start.clone()),
            stride: Some(self.stride.clone()),
            count: Some(self.count.clone()),
            block: Some(self.block.clone()),
        }
    }

    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    pub fn start(&self) -> &[u64] {
        &self.start
    }

    pub fn stride(&self) -> &[u64] {
        &self.stride
    }

    pub fn count(&self) -> &[u64] {
        &self.count
    }

    pub fn block(&self) -> &[u64] {
        &self.block
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Exclusive end coordinate per dimension.
    pub fn end(&self) -> crate::Result<Vec<u64>> {
        end(&self.start, &self.stride, &self.count, &self.block)
    }

    pub fn nof_datapoints(&self) -> crate::Result<u64> {
        nof_datapoints(&self.count, &self.block)
    }

    /// Shape of the buffer holding the selected elements: `count * block`.
    pub fn output_shape(&self) -> Vec<u64> {
        self.count
            .iter()
            .zip(&self.block)
            .map(|(c, b)| c.saturating_mul(*b))
            .collect()
    }

    /// Per dimension, whether the selection ends within `shape`.
    ///
    /// A dimension whose end cannot be computed is reported as out of bounds.
    pub fn within_bounds(&self) -> Vec<bool> {
        match self.end() {
            Ok(end) => end.iter().zip(&self.shape).map(|(e, s)| e <= s).collect(),
            Err(_) => vec![false; self.rank()],
        }
    }

    pub fn is_within_bounds(&self) -> bool {
        self.within_bounds().into_iter().all(|ok| ok)
    }

    /// Fail with [`crate::Error::InvalidSelection`] unless the selection fits in `shape`.
    pub fn validate(&self, shape: &[u64]) -> crate::Result<()> {
        check_rank("selection", &self.start, shape.len())?;
        let end = self.end()?;
        for (dim, (e, s)) in end.iter().zip(shape).enumerate() {
            if e > s {
                return Err(crate::Error::invalid_selection(format!(
                    "dimension {dim} ends at {e}, beyond extent {s}"
                )));
            }
        }
        Ok(())
    }

    /// Install this selection as the active region of `dataset`.
    pub fn apply<TStorage: ?Sized>(&self, dataset: &mut Dataset<TStorage>) -> crate::Result<()> {
        dataset.select(self.clone())
    }

    /// Coordinate ranges of every block, in C order of the block indices.
    pub(crate) fn block_ranges(&self) -> impl Iterator<Item = (Vec<u64>, Vec<Range<u64>>)> + '_ {
        MultiIndex::new(&self.count).map(move |block_idx| {
            let ranges = (0..self.rank())
                .map(|d| {
                    let lo = self.start[d] + block_idx[d] * self.stride[d];
                    lo..lo + self.block[d]
                })
                .collect();
            (block_idx, ranges)
        })
    }
}

impl fmt::Display for Hyperslab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hyperslab")?;
        writeln!(f, "-- shape          = {:?}", self.shape)?;
        writeln!(f, "-- start          = {:?}", self.start)?;
        writeln!(f, "-- stride         = {:?}", self.stride)?;
        writeln!(f, "-- count          = {:?}", self.count)?;
        writeln!(f, "-- block          = {:?}", self.block)?;
        match self.end() {
            Ok(end) => writeln!(f, "-- end            = {end:?}")?,
            Err(e) => writeln!(f, "-- end            = <{e}>")?,
        }
        match self.nof_datapoints() {
            Ok(n) => write!(f, "-- nof. datapoints = {n}"),
            Err(e) => write!(f, "-- nof. datapoints = <{e}>"),
        }
    }
}

/// Builds a [`Hyperslab`], defaulting omitted parameters to
/// `start = 0`, `stride = 1`, `count = 1`, `block = shape`.
#[derive(Debug, Clone)]
pub struct HyperslabBuilder {
    shape: Vec<u64>,
    start: Option<Vec<u64>>,
    stride: Option<Vec<u64>>,
    count: Option<Vec<u64>>,
    block: Option<Vec<u64>>,
}

impl HyperslabBuilder {
    pub fn new(shape: Vec<u64>) -> Self {
        Self {
            shape,
            start: None,
            stride: None,
            count: None,
            block: None,
        }
    }

    pub fn start(mut self, start: Vec<u64>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn stride(mut self, stride: Vec<u64>) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn count(mut self, count: Vec<u64>) -> Self {
        self.count = Some(count);
        self
    }

    pub fn block(mut self, block: Vec<u64>) -> Self {
        self.block = Some(block);
        self
    }

    /// Fails if any supplied parameter does not match the rank of the shape.
    pub fn build(self) -> crate::Result<Hyperslab> {
        let rank = self.shape.len();
        let start = self.start.unwrap_or_else(|| vec![0; rank]);
        let stride = self.stride.unwrap_or_else(|| vec![1; rank]);
        let count = self.count.unwrap_or_else(|| vec![1; rank]);
        let block = self.block.unwrap_or_else(|| self.shape.clone());
        check_rank("start", &start, rank)?;
        check_rank("stride", &stride, rank)?;
        check_rank("count", &count, rank)?;
        check_rank("block", &block, rank)?;
        Ok(Hyperslab {
            shape: self.shape,
            start,
            stride,
            count,
            block,
        })
    }
}

/// C-order iterator over every index of a shape.
///
/// Yields a single empty index for rank 0 and nothing if any extent is zero.
pub(crate) struct MultiIndex {
    shape: Vec<u64>,
    next: Option<Vec<u64>>,
}

impl MultiIndex {
    pub(crate) fn new(shape: &[u64]) -> Self {
        let next = if shape.contains(&0) {
            None
        } else {
            Some(vec![0; shape.len()])
        };
        Self {
            shape: shape.to_vec(),
            next,
        }
    }
}

impl Iterator for MultiIndex {
    type Item = Vec<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut following = current.clone();
        for d in (0..self.shape.len()).rev() {
            following[d] += 1;
            if following[d] < self.shape[d] {
                self.next = Some(following);
                break;
            }
            following[d] = 0;
        }
        Some(current)
    }
}

/// Linear C-order offset of `index` within `shape`.
pub(crate) fn ravel(index: &[u64], shape: &[u64]) -> u64 {
    index
        .iter()
        .zip(shape)
        .fold(0, |acc, (&i, &extent)| acc * extent + i)
}

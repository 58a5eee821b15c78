use std::sync::Arc;

use zarrs::{
    array::{Array, ArrayBuilder, ArraySubset},
    storage::{
        ReadableStorageTraits, ReadableWritableStorageTraits, StorageError, WritableStorageTraits,
    },
};

use crate::config::DatasetConfig;
use crate::hyperslab::{Hyperslab, MultiIndex, ravel};
use crate::kind::ElementKind;
use crate::node::Node;
use crate::value::Value;

/// A numeric zarr array with an optional active [`Hyperslab`] selection.
///
/// Reads and writes address the active selection, or the whole array if there is none.
/// Selected elements are exchanged as a flat C-order buffer of shape
/// [`Hyperslab::output_shape`].
pub struct Dataset<TStorage: ?Sized> {
    array: Array<TStorage>,
    kind: ElementKind,
    selection: Option<Hyperslab>,
}

impl<TStorage: ?Sized> Dataset<TStorage> {
    /// Wrap an existing array, classifying its data type.
    pub fn from_array(array: Array<TStorage>) -> crate::Result<Self> {
        let kind = ElementKind::from_data_type(array.data_type())?;
        Ok(Self {
            array,
            kind,
            selection: None,
        })
    }

    pub fn array(&self) -> &Array<TStorage> {
        &self.array
    }

    pub fn into_array(self) -> Array<TStorage> {
        self.array
    }

    pub fn shape(&self) -> &[u64] {
        self.array.shape()
    }

    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn selection(&self) -> Option<&Hyperslab> {
        self.selection.as_ref()
    }

    /// Install `selection` for subsequent reads and writes.
    ///
    /// Fails with [`crate::Error::InvalidSelection`] if it does not fit within the array,
    /// in which case the previous selection is kept.
    pub fn select(&mut self, selection: Hyperslab) -> crate::Result<()> {
        selection.validate(self.shape())?;
        log::debug!(
            "Selecting {} blocks of {:?} from {:?} in {}",
            selection.count().iter().product::<u64>(),
            selection.block(),
            selection.start(),
            self.array.path().as_str()
        );
        self.selection = Some(selection);
        Ok(())
    }

    /// Revert to addressing the whole array.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn active_selection(&self) -> Hyperslab {
        self.selection
            .clone()
            .unwrap_or_else(|| Hyperslab::new(self.shape().to_vec()))
    }
}

fn num_elements(selection: &Hyperslab) -> crate::Result<usize> {
    let n = selection.nof_datapoints()?;
    usize::try_from(n)
        .map_err(|_| crate::Error::invalid_selection(format!("{n} elements do not fit in memory")))
}

/// Offset within the flat output buffer of every element of one block, in C order.
fn block_offsets<'a>(
    selection: &'a Hyperslab,
    block_idx: &'a [u64],
    output_shape: &'a [u64],
) -> impl Iterator<Item = usize> + 'a {
    MultiIndex::new(selection.block()).map(move |local| {
        let global: Vec<u64> = local
            .iter()
            .zip(block_idx)
            .zip(selection.block())
            .map(|((j, k), b)| k * b + j)
            .collect();
        ravel(&global, output_shape) as usize
    })
}

fn gather<T: Copy + Default>(
    selection: &Hyperslab,
    mut fetch: impl FnMut(&ArraySubset) -> crate::Result<Vec<T>>,
) -> crate::Result<Vec<T>> {
    let total = num_elements(selection)?;
    if total == 0 {
        return Ok(Vec::new());
    }
    let output_shape = selection.output_shape();
    let mut out = vec![T::default(); total];
    for (block_idx, ranges) in selection.block_ranges() {
        let subset = ArraySubset::new_with_ranges(&ranges);
        log::trace!("Reading block {block_idx:?} at {ranges:?}");
        let elements = fetch(&subset)?;
        for (offset, element) in block_offsets(selection, &block_idx, &output_shape).zip(elements) {
            out[offset] = element;
        }
    }
    Ok(out)
}

fn scatter<T: Copy>(
    selection: &Hyperslab,
    buffer: &[T],
    mut store: impl FnMut(&ArraySubset, Vec<T>) -> crate::Result<()>,
) -> crate::Result<()> {
    let total = num_elements(selection)?;
    if buffer.len() != total {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("{total} elements for selection of {:?}", selection.output_shape()),
            found: format!("{} elements", buffer.len()),
        });
    }
    if total == 0 {
        return Ok(());
    }
    let output_shape = selection.output_shape();
    for (block_idx, ranges) in selection.block_ranges() {
        let subset = ArraySubset::new_with_ranges(&ranges);
        log::trace!("Writing block {block_idx:?} at {ranges:?}");
        let elements = block_offsets(selection, &block_idx, &output_shape)
            .map(|offset| buffer[offset])
            .collect();
        store(&subset, elements)?;
    }
    Ok(())
}

impl<TStorage: ?Sized + ReadableStorageTraits + 'static> Dataset<TStorage> {
    pub fn open(storage: Arc<TStorage>, path: &str) -> crate::Result<Self> {
        let array = Array::open(storage, path)
            .map_err(|e| crate::Error::StorageRead(format!("could not open {path}: {e}")))?;
        Self::from_array(array)
    }

    /// Read the selected elements as a flat sequence of the dataset's kind.
    pub fn read(&self) -> crate::Result<Value> {
        let selection = self.active_selection();
        let read_err = |e: zarrs::array::ArrayError| {
            crate::Error::StorageRead(format!("{}: {e}", self.array.path().as_str()))
        };

        macro_rules! read_as {
            ($ty:ty, $variant:ident) => {
                Value::$variant(gather(&selection, |subset| {
                    self.array
                        .retrieve_array_subset::<Vec<$ty>>(subset)
                        .map_err(read_err)
                })?)
            };
        }

        let value = match self.kind {
            ElementKind::Int16 => read_as!(i16, Int16Array),
            ElementKind::Int32 => read_as!(i32, Int32Array),
            ElementKind::Int64 => read_as!(i64, Int64Array),
            ElementKind::Float32 => read_as!(f32, Float32Array),
            ElementKind::Float64 => read_as!(f64, Float64Array),
            ElementKind::String => {
                return Err(crate::Error::UnsupportedKind(
                    "string arrays are not supported".into(),
                ));
            }
        };
        Ok(value)
    }
}

impl<TStorage: ?Sized + ReadableWritableStorageTraits + 'static> Dataset<TStorage> {
    /// Create a new array at `path` and store its metadata.
    pub fn create(
        storage: Arc<TStorage>,
        path: &str,
        shape: Vec<u64>,
        kind: ElementKind,
        config: &DatasetConfig,
    ) -> crate::Result<Self> {
        let data_type = kind.to_data_type()?;
        let chunk_shape = config.chunk_shape_for(&shape)?;
        let codecs: Vec<_> = config.compression.to_bytes_to_bytes_codec()?.into_iter().collect();

        macro_rules! build {
            ($fill:expr) => {
                ArrayBuilder::new(shape.clone(), chunk_shape, data_type, $fill)
                    .bytes_to_bytes_codecs(codecs)
                    .build(storage, path)
            };
        }

        let array = match kind {
            ElementKind::Int16 => build!(0i16),
            ElementKind::Int32 => build!(0i32),
            ElementKind::Int64 => build!(0i64),
            ElementKind::Float32 => build!(0f32),
            ElementKind::Float64 => build!(0f64),
            ElementKind::String => {
                return Err(crate::Error::UnsupportedKind(
                    "string arrays are not supported".into(),
                ));
            }
        }
        .map_err(|e| crate::Error::StorageWrite(format!("could not create {path}: {e}")))?;

        let dataset = Self {
            array,
            kind,
            selection: None,
        };
        dataset
            .store_attributes()
            .map_err(|e| crate::Error::StorageWrite(format!("could not store {path}: {e}")))?;
        log::debug!("Created {kind} dataset {path} of shape {shape:?}");
        Ok(dataset)
    }

    /// Write a flat C-order buffer over the selected elements.
    ///
    /// A scalar is accepted for a single-element selection.
    pub fn write(&self, value: &Value) -> crate::Result<()> {
        if value.kind() != self.kind {
            return Err(crate::Error::KindMismatch {
                expected: self.kind.to_string(),
                found: value.kind().to_string(),
            });
        }
        let selection = self.active_selection();
        let write_err = |e: zarrs::array::ArrayError| {
            crate::Error::StorageWrite(format!("{}: {e}", self.array.path().as_str()))
        };

        macro_rules! write_from {
            ($elements:expr) => {
                scatter(&selection, $elements, |subset, block| {
                    self.array
                        .store_array_subset(subset, &block)
                        .map_err(write_err)
                })
            };
        }

        match value.clone().into_sequence() {
            Value::Int16Array(v) => write_from!(&v),
            Value::Int32Array(v) => write_from!(&v),
            Value::Int64Array(v) => write_from!(&v),
            Value::Float32Array(v) => write_from!(&v),
            Value::Float64Array(v) => write_from!(&v),
            other => Err(crate::Error::UnsupportedKind(format!(
                "cannot write {} to a dataset",
                other.kind()
            ))),
        }
    }
}

impl<TStorage: ?Sized + WritableStorageTraits + 'static> Node for Dataset<TStorage> {
    fn node_name(&self) -> String {
        self.array.node_name()
    }

    fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        Node::attributes(&self.array)
    }

    fn attributes_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        Node::attributes_mut(&mut self.array)
    }

    fn store_attributes(&self) -> Result<(), StorageError> {
        self.array.store_attributes()
    }
}

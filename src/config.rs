use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zarrs::array::codec::{Bz2Codec, Bz2CompressionLevel, GzipCodec};
use zarrs_codec::BytesToBytesCodecTraits;

/// Options for creating a [`crate::Dataset`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    /// Extent of each stored chunk. Default: one chunk covering the whole array.
    #[serde(default)]
    pub chunk_shape: Option<Vec<u64>>,
    #[serde(default)]
    pub compression: Compression,
}

impl DatasetConfig {
    pub fn with_chunk_shape(mut self, chunk_shape: Vec<u64>) -> Self {
        self.chunk_shape = Some(chunk_shape);
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// The chunk shape to use for an array of `shape`.
    pub(crate) fn chunk_shape_for(&self, shape: &[u64]) -> crate::Result<Vec<u64>> {
        let Some(chunk_shape) = &self.chunk_shape else {
            // zero-sized dimensions still need a non-zero chunk extent
            return Ok(shape.iter().map(|s| (*s).max(1)).collect());
        };
        if chunk_shape.len() != shape.len() {
            return Err(crate::Error::general(format!(
                "chunk shape {chunk_shape:?} does not match rank of shape {shape:?}"
            )));
        }
        if chunk_shape.contains(&0) {
            return Err(crate::Error::general(format!(
                "chunk shape {chunk_shape:?} has a zero extent"
            )));
        }
        Ok(chunk_shape.clone())
    }
}

/// Bytes-to-bytes compression applied to every stored chunk.
///
/// Serialized with a `type` tag, e.g. `{"type": "gzip", "level": 9}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Copy)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Compression {
    #[default]
    Raw,
    Bzip2 {
        /// 1 to 9, in units of 100kB. Omitted means 9.
        #[serde(default = "bzip2_max_block_size")]
        block_size: u8,
    },
    Gzip {
        /// 0 to 9, or -1 for zlib's default of 6. Omitted means -1.
        #[serde(default = "gzip_zlib_default")]
        level: i8,
    },
}

fn bzip2_max_block_size() -> u8 {
    9
}

fn gzip_zlib_default() -> i8 {
    -1
}

impl Compression {
    /// The chunk codec for this compression; `None` for raw chunks.
    pub fn to_bytes_to_bytes_codec(
        &self,
    ) -> crate::Result<Option<Arc<dyn BytesToBytesCodecTraits>>> {
        let codec: Arc<dyn BytesToBytesCodecTraits> = match *self {
            Compression::Raw => return Ok(None),
            Compression::Bzip2 { block_size } => {
                if !(1..=9).contains(&block_size) {
                    return Err(crate::Error::general(format!(
                        "bzip2 block size {block_size} is outside 1..=9"
                    )));
                }
                let level = Bz2CompressionLevel::new(u32::from(block_size)).map_err(|n| {
                    crate::Error::general(format!("invalid bzip2 block size {n}"))
                })?;
                Arc::new(Bz2Codec::new(level))
            }
            Compression::Gzip { level } => {
                let level = match level {
                    -1 => 6,
                    0..=9 => level as u32,
                    _ => {
                        return Err(crate::Error::general(format!(
                            "gzip level {level} is outside -1..=9"
                        )));
                    }
                };
                Arc::new(GzipCodec::new(level).map_err(crate::Error::wrap)?)
            }
        };
        Ok(Some(codec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_json() {
        let config: DatasetConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DatasetConfig::default());
        assert_eq!(config.compression, Compression::Raw);
    }

    #[test]
    fn compression_defaults() {
        let config: DatasetConfig =
            serde_json::from_str(r#"{"chunkShape": [4, 2], "compression": {"type": "gzip"}}"#)
                .unwrap();
        assert_eq!(config.chunk_shape, Some(vec![4, 2]));
        assert_eq!(config.compression, Compression::Gzip { level: -1 });

        let bz2: Compression = serde_json::from_str(r#"{"type": "bzip2"}"#).unwrap();
        assert_eq!(bz2, Compression::Bzip2 { block_size: 9 });
    }

    #[test]
    fn codecs_are_built() {
        assert!(Compression::Raw.to_bytes_to_bytes_codec().unwrap().is_none());
        assert!(
            Compression::Gzip { level: -1 }
                .to_bytes_to_bytes_codec()
                .unwrap()
                .is_some()
        );
        assert!(Compression::Gzip { level: -2 }.to_bytes_to_bytes_codec().is_err());
    }

    #[test]
    fn out_of_range_levels_are_errors() {
        for block_size in [0, 10, u8::MAX] {
            assert!(matches!(
                Compression::Bzip2 { block_size }.to_bytes_to_bytes_codec(),
                Err(crate::Error::General(_))
            ));
        }
        for level in [-2, 10, i8::MIN] {
            assert!(matches!(
                Compression::Gzip { level }.to_bytes_to_bytes_codec(),
                Err(crate::Error::General(_))
            ));
        }
        let zero: Compression =
            serde_json::from_str(r#"{"type": "bzip2", "blockSize": 0}"#).unwrap();
        assert!(zero.to_bytes_to_bytes_codec().is_err());
        assert!(
            Compression::Bzip2 { block_size: 1 }
                .to_bytes_to_bytes_codec()
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn chunk_shape_is_checked() {
        let config = DatasetConfig::default();
        assert_eq!(config.chunk_shape_for(&[10, 0]).unwrap(), vec![10, 1]);
        let config = config.with_chunk_shape(vec![5]);
        assert!(config.chunk_shape_for(&[10, 10]).is_err());
        let config = DatasetConfig::default().with_chunk_shape(vec![5, 0]);
        assert!(config.chunk_shape_for(&[10, 10]).is_err());
    }
}

use std::borrow::Cow;
use std::fmt;

use zarrs::array::{DataType, data_type};

/// The element kinds a stored value may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Int16,
        ElementKind::Int32,
        ElementKind::Int64,
        ElementKind::Float32,
        ElementKind::Float64,
        ElementKind::String,
    ];

    /// Name as used in zarr data type metadata.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Int16 => "int16",
            ElementKind::Int32 => "int32",
            ElementKind::Int64 => "int64",
            ElementKind::Float32 => "float32",
            ElementKind::Float64 => "float64",
            ElementKind::String => "string",
        }
    }

    /// Width in bytes of one element; `None` for strings, whose width is per attribute.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            ElementKind::Int16 => Some(2),
            ElementKind::Int32 | ElementKind::Float32 => Some(4),
            ElementKind::Int64 | ElementKind::Float64 => Some(8),
            ElementKind::String => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ElementKind::String)
    }

    /// Classify a zarr array data type.
    pub fn from_data_type(data_type: &DataType) -> crate::Result<Self> {
        let name = data_type
            .name_v3()
            .map_or_else(String::new, Cow::into_owned);
        match name.as_str() {
            "int16" => Ok(ElementKind::Int16),
            "int32" => Ok(ElementKind::Int32),
            "int64" => Ok(ElementKind::Int64),
            "float32" => Ok(ElementKind::Float32),
            "float64" => Ok(ElementKind::Float64),
            "" => Err(crate::Error::UnsupportedKind(
                "array data type has no name".into(),
            )),
            s => Err(crate::Error::UnsupportedKind(format!("array data type {s}"))),
        }
    }

    /// The zarr array data type for this kind.
    pub fn to_data_type(&self) -> crate::Result<DataType> {
        match self {
            ElementKind::Int16 => Ok(data_type::int16()),
            ElementKind::Int32 => Ok(data_type::int32()),
            ElementKind::Int64 => Ok(data_type::int64()),
            ElementKind::Float32 => Ok(data_type::float32()),
            ElementKind::Float64 => Ok(data_type::float64()),
            ElementKind::String => Err(crate::Error::UnsupportedKind(
                "string arrays are not supported".into(),
            )),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_kinds_map_to_data_types() {
        for kind in ElementKind::ALL.into_iter().filter(ElementKind::is_numeric) {
            let data_type = kind.to_data_type().unwrap();
            assert_eq!(ElementKind::from_data_type(&data_type).unwrap(), kind);
        }
        assert!(ElementKind::String.to_data_type().is_err());
        assert!(matches!(
            ElementKind::from_data_type(&data_type::uint8()),
            Err(crate::Error::UnsupportedKind(_))
        ));
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::kind::ElementKind;
use crate::value::Value;

/// Keys in a node's attribute map which belong to the storage library, not the user.
pub const RESERVED_ATTRIBUTES: &[&str] = &["_zarrs"];

pub(crate) fn is_reserved(name: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&name)
}

/// Type class of a stored attribute, as reported by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TypeClass {
    Integer,
    Float,
    String,
    /// Any class this library cannot read (compound, opaque, bitfield...).
    #[serde(other)]
    Unknown,
}

/// Representation of the stored datatype of an attribute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Datatype {
    pub class: TypeClass,
    /// Width of one element in bytes.
    /// For strings, the length of the longest value written.
    pub size: usize,
    /// Only meaningful for integers.
    #[serde(default = "default_signed")]
    pub signed: bool,
}

fn default_signed() -> bool {
    true
}

impl Datatype {
    pub fn for_kind(kind: ElementKind, string_size: usize) -> Self {
        let class = match kind {
            ElementKind::Int16 | ElementKind::Int32 | ElementKind::Int64 => TypeClass::Integer,
            ElementKind::Float32 | ElementKind::Float64 => TypeClass::Float,
            ElementKind::String => TypeClass::String,
        };
        Self {
            class,
            size: kind.fixed_size().unwrap_or(string_size),
            signed: true,
        }
    }

    /// Map type class and width onto a supported element kind.
    pub fn classify(&self) -> crate::Result<ElementKind> {
        let kind = match (self.class, self.size, self.signed) {
            (TypeClass::Integer, 2, true) => ElementKind::Int16,
            (TypeClass::Integer, 4, true) => ElementKind::Int32,
            (TypeClass::Integer, 8, true) => ElementKind::Int64,
            (TypeClass::Float, 4, _) => ElementKind::Float32,
            (TypeClass::Float, 8, _) => ElementKind::Float64,
            (TypeClass::String, _, _) => ElementKind::String,
            _ => return Err(crate::Error::UnsupportedKind(self.to_string())),
        };
        Ok(kind)
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            TypeClass::Integer if !self.signed => write!(f, "unsigned integer({})", self.size),
            TypeClass::Integer => write!(f, "integer({})", self.size),
            TypeClass::Float => write!(f, "float({})", self.size),
            TypeClass::String => write!(f, "string({})", self.size),
            TypeClass::Unknown => write!(f, "unknown({})", self.size),
        }
    }
}

/// Representation of a typed attribute as stored in a node's attribute map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeMetadata {
    pub datatype: Datatype,
    /// Extent per dimension; empty for a scalar.
    pub shape: Vec<u64>,
    /// A bare JSON scalar for rank 0, otherwise a flat C-order array.
    pub value: serde_json::Value,
}

impl AttributeMetadata {
    /// Whether a raw attribute entry claims to be a typed record.
    pub fn is_record(raw: &serde_json::Value) -> bool {
        raw.as_object()
            .is_some_and(|m| m.contains_key("datatype") && m.contains_key("shape"))
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of stored elements; 1 for a scalar.
    pub fn num_elements(&self) -> crate::Result<u64> {
        self.shape
            .iter()
            .try_fold(1u64, |acc, extent| acc.checked_mul(*extent))
            .ok_or_else(|| {
                crate::Error::StorageRead(format!(
                    "attribute shape {:?} overflows 64 bits",
                    self.shape
                ))
            })
    }

    /// Encode a value into its stored record.
    pub fn encode(value: &Value) -> Self {
        let (shape, json, string_size): (Vec<u64>, serde_json::Value, usize) = match value {
            Value::Int16(v) => (vec![], (*v).into(), 0),
            Value::Int32(v) => (vec![], (*v).into(), 0),
            Value::Int64(v) => (vec![], (*v).into(), 0),
            Value::Float32(v) => (vec![], float_to_json(f64::from(*v)), 0),
            Value::Float64(v) => (vec![], float_to_json(*v), 0),
            Value::String(v) => (vec![], v.clone().into(), v.len()),
            Value::Int16Array(v) => (vec![v.len() as u64], v.clone().into(), 0),
            Value::Int32Array(v) => (vec![v.len() as u64], v.clone().into(), 0),
            Value::Int64Array(v) => (vec![v.len() as u64], v.clone().into(), 0),
            Value::Float32Array(v) => (
                vec![v.len() as u64],
                v.iter().map(|f| float_to_json(f64::from(*f))).collect(),
                0,
            ),
            Value::Float64Array(v) => (
                vec![v.len() as u64],
                v.iter().map(|f| float_to_json(*f)).collect(),
                0,
            ),
            Value::StringArray(v) => (
                vec![v.len() as u64],
                v.clone().into(),
                v.iter().map(String::len).max().unwrap_or(0),
            ),
        };
        Self {
            datatype: Datatype::for_kind(value.kind(), string_size),
            shape,
            value: json,
        }
    }

    /// Decode the stored record into a value of its classified kind.
    ///
    /// Rank 0 yields a scalar, any other rank a flat sequence.
    pub fn decode(&self) -> crate::Result<Value> {
        let kind = self.datatype.classify()?;
        let elements = self.elements()?;
        let value = match kind {
            ElementKind::Int16 => Value::Int16Array(decode_all(elements, json_to_int)?),
            ElementKind::Int32 => Value::Int32Array(decode_all(elements, json_to_int)?),
            ElementKind::Int64 => Value::Int64Array(decode_all(elements, json_to_int)?),
            ElementKind::Float32 => Value::Float32Array(decode_all(elements, json_to_f32)?),
            ElementKind::Float64 => Value::Float64Array(decode_all(elements, json_to_float)?),
            ElementKind::String => {
                let size = self.datatype.size;
                Value::StringArray(decode_all(elements, |v| json_to_string(v, size))?)
            }
        };
        if self.rank() == 0 {
            value.into_scalar().ok_or_else(|| {
                crate::Error::StorageRead("scalar attribute holds no element".into())
            })
        } else {
            Ok(value)
        }
    }

    fn elements(&self) -> crate::Result<Vec<&serde_json::Value>> {
        if self.rank() == 0 {
            return Ok(vec![&self.value]);
        }
        let Some(items) = self.value.as_array() else {
            return Err(crate::Error::StorageRead(format!(
                "attribute of shape {:?} does not hold an array",
                self.shape
            )));
        };
        if items.len() as u64 != self.num_elements()? {
            return Err(crate::Error::StorageRead(format!(
                "attribute of shape {:?} holds {} elements",
                self.shape,
                items.len()
            )));
        }
        Ok(items.iter().collect())
    }
}

fn decode_all<T>(
    elements: Vec<&serde_json::Value>,
    f: impl Fn(&serde_json::Value) -> crate::Result<T>,
) -> crate::Result<Vec<T>> {
    elements.into_iter().map(f).collect()
}

/// Non-finite floats follow the zarr fill value convention.
fn float_to_json(v: f64) -> serde_json::Value {
    match Number::from_f64(v) {
        Some(n) => serde_json::Value::Number(n),
        None if v.is_nan() => "NaN".into(),
        None if v > 0.0 => "Infinity".into(),
        None => "-Infinity".into(),
    }
}

fn json_to_float(v: &serde_json::Value) -> crate::Result<f64> {
    match v {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| crate::Error::StorageRead(format!("invalid float {n}"))),
        serde_json::Value::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(crate::Error::StorageRead(format!("invalid float {s:?}"))),
        },
        other => Err(crate::Error::StorageRead(format!("invalid float {other}"))),
    }
}

/// Finite values beyond the `f32` range are an error, not infinity.
fn json_to_f32(v: &serde_json::Value) -> crate::Result<f32> {
    let wide = json_to_float(v)?;
    let narrow = wide as f32;
    if wide.is_finite() && !narrow.is_finite() {
        return Err(crate::Error::StorageRead(format!(
            "float {wide} out of range for float(4)"
        )));
    }
    Ok(narrow)
}

fn json_to_int<T: TryFrom<i64>>(v: &serde_json::Value) -> crate::Result<T> {
    let wide = v
        .as_i64()
        .ok_or_else(|| crate::Error::StorageRead(format!("invalid integer {v}")))?;
    T::try_from(wide)
        .map_err(|_| crate::Error::StorageRead(format!("integer {wide} out of range")))
}

fn json_to_string(v: &serde_json::Value, size: usize) -> crate::Result<String> {
    let s = v
        .as_str()
        .ok_or_else(|| crate::Error::StorageRead(format!("invalid string {v}")))?;
    if s.len() > size {
        return Err(crate::Error::StorageRead(format!(
            "string of {} bytes exceeds type size {size}",
            s.len()
        )));
    }
    let mut out = String::with_capacity(size);
    out.push_str(s);
    Ok(out)
}

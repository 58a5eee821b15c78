use std::fmt;

use crate::kind::ElementKind;

/// An in-memory attribute value: a scalar or a sequence of one supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Int16Array(Vec<i16>),
    Int32Array(Vec<i32>),
    Int64Array(Vec<i64>),
    Float32Array(Vec<f32>),
    Float64Array(Vec<f64>),
    StringArray(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> ElementKind {
        match self {
            Value::Int16(_) | Value::Int16Array(_) => ElementKind::Int16,
            Value::Int32(_) | Value::Int32Array(_) => ElementKind::Int32,
            Value::Int64(_) | Value::Int64Array(_) => ElementKind::Int64,
            Value::Float32(_) | Value::Float32Array(_) => ElementKind::Float32,
            Value::Float64(_) | Value::Float64Array(_) => ElementKind::Float64,
            Value::String(_) | Value::StringArray(_) => ElementKind::String,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Int16(_)
                | Value::Int32(_)
                | Value::Int64(_)
                | Value::Float32(_)
                | Value::Float64(_)
                | Value::String(_)
        )
    }

    /// 0 for scalars, 1 for sequences.
    pub fn rank(&self) -> usize {
        if self.is_scalar() { 0 } else { 1 }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Value::Int16Array(v) => v.len(),
            Value::Int32Array(v) => v.len(),
            Value::Int64Array(v) => v.len(),
            Value::Float32Array(v) => v.len(),
            Value::Float64Array(v) => v.len(),
            Value::StringArray(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Promote a scalar to a one-element sequence; sequences are returned unchanged.
    pub fn into_sequence(self) -> Value {
        match self {
            Value::Int16(v) => Value::Int16Array(vec![v]),
            Value::Int32(v) => Value::Int32Array(vec![v]),
            Value::Int64(v) => Value::Int64Array(vec![v]),
            Value::Float32(v) => Value::Float32Array(vec![v]),
            Value::Float64(v) => Value::Float64Array(vec![v]),
            Value::String(v) => Value::StringArray(vec![v]),
            seq => seq,
        }
    }

    /// Take the only element of a one-element sequence; scalars are returned unchanged.
    ///
    /// Returns `None` for sequences of any other length.
    pub fn into_scalar(self) -> Option<Value> {
        fn single<T>(mut v: Vec<T>) -> Option<T> {
            if v.len() == 1 { v.pop() } else { None }
        }
        match self {
            Value::Int16Array(v) => single(v).map(Value::Int16),
            Value::Int32Array(v) => single(v).map(Value::Int32),
            Value::Int64Array(v) => single(v).map(Value::Int64),
            Value::Float32Array(v) => single(v).map(Value::Float32),
            Value::Float64Array(v) => single(v).map(Value::Float64),
            Value::StringArray(v) => single(v).map(Value::String),
            scalar => Some(scalar),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Int16Array(v) => write_list(f, v),
            Value::Int32Array(v) => write_list(f, v),
            Value::Int64Array(v) => write_list(f, v),
            Value::Float32Array(v) => write_list(f, v),
            Value::Float64Array(v) => write_list(f, v),
            Value::StringArray(v) => {
                let quoted: Vec<String> = v.iter().map(|s| format!("{s:?}")).collect();
                write_list(f, &quoted)
            }
        }
    }
}

/// A Rust type which maps onto one of the supported element kinds.
pub trait AttributeElement: Sized + Clone {
    const KIND: ElementKind;

    fn into_scalar_value(self) -> Value;

    fn into_sequence_value(values: Vec<Self>) -> Value;

    /// Extract from a scalar value of the same kind.
    fn from_scalar_value(value: Value) -> Option<Self>;

    /// Extract from a sequence value of the same kind.
    fn from_sequence_value(value: Value) -> Option<Vec<Self>>;
}

macro_rules! impl_attribute_element {
    ($ty:ty, $kind:ident, $scalar:ident, $sequence:ident) => {
        impl AttributeElement for $ty {
            const KIND: ElementKind = ElementKind::$kind;

            fn into_scalar_value(self) -> Value {
                Value::$scalar(self)
            }

            fn into_sequence_value(values: Vec<Self>) -> Value {
                Value::$sequence(values)
            }

            fn from_scalar_value(value: Value) -> Option<Self> {
                match value {
                    Value::$scalar(v) => Some(v),
                    _ => None,
                }
            }

            fn from_sequence_value(value: Value) -> Option<Vec<Self>> {
                match value {
                    Value::$sequence(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$scalar(value)
            }
        }

        impl From<Vec<$ty>> for Value {
            fn from(value: Vec<$ty>) -> Self {
                Value::$sequence(value)
            }
        }

        impl From<&[$ty]> for Value {
            fn from(value: &[$ty]) -> Self {
                Value::$sequence(value.to_vec())
            }
        }
    };
}

impl_attribute_element!(i16, Int16, Int16, Int16Array);
impl_attribute_element!(i32, Int32, Int32, Int32Array);
impl_attribute_element!(i64, Int64, Int64, Int64Array);
impl_attribute_element!(f32, Float32, Float32, Float32Array);
impl_attribute_element!(f64, Float64, Float64, Float64Array);
impl_attribute_element!(String, String, String, StringArray);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::StringArray(value.into_iter().map(str::to_owned).collect())
    }
}

//! Typed reads and writes of single attributes on a [`Node`].
//!
//! Each attribute is held as an [`AttributeMetadata`] record in the node's attribute map.
//! Writes are upserts: any existing attribute of the same name is replaced wholesale,
//! including its kind and shape.

use crate::kind::ElementKind;
use crate::metadata::{AttributeMetadata, is_reserved};
use crate::node::Node;
use crate::value::{AttributeElement, Value};

fn check_name(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(crate::Error::StorageWrite(
            "attribute name must not be empty".into(),
        ));
    }
    if name.contains(['/', '\0']) {
        return Err(crate::Error::StorageWrite(format!(
            "illegal character in attribute name {name:?}"
        )));
    }
    if is_reserved(name) {
        return Err(crate::Error::StorageWrite(format!(
            "attribute name {name:?} is reserved"
        )));
    }
    Ok(())
}

/// Create or overwrite the attribute `name` with `value`.
///
/// If the node cannot be persisted, its in-memory attribute map is left as it was.
pub fn set<N: Node + ?Sized>(node: &mut N, name: &str, value: &Value) -> crate::Result<()> {
    check_name(name)?;
    if !node.is_open() {
        return Err(crate::Error::StorageWrite(format!(
            "{} is closed",
            node.node_name()
        )));
    }
    let raw = serde_json::to_value(AttributeMetadata::encode(value))?;
    let previous = node.attributes_mut().insert(name.to_string(), raw);

    if let Err(e) = node.store_attributes() {
        let attributes = node.attributes_mut();
        match previous {
            Some(p) => {
                attributes.insert(name.to_string(), p);
            }
            None => {
                attributes.remove(name);
            }
        }
        return Err(crate::Error::StorageWrite(format!(
            "could not store attribute {name:?} on {}: {e}",
            node.node_name()
        )));
    }
    log::debug!(
        "Set {} attribute {name:?} ({} elements) on {}",
        value.kind(),
        value.len(),
        node.node_name()
    );
    Ok(())
}

pub fn set_scalar<N: Node + ?Sized, T: AttributeElement>(
    node: &mut N,
    name: &str,
    value: T,
) -> crate::Result<()> {
    set(node, name, &value.into_scalar_value())
}

/// Store `values` as a rank-1 attribute; an empty sequence is legal.
pub fn set_sequence<N: Node + ?Sized, T: AttributeElement>(
    node: &mut N,
    name: &str,
    values: Vec<T>,
) -> crate::Result<()> {
    set(node, name, &T::into_sequence_value(values))
}

/// Store a copy of `values` as a rank-1 attribute.
pub fn set_array<N: Node + ?Sized, T: AttributeElement>(
    node: &mut N,
    name: &str,
    values: &[T],
) -> crate::Result<()> {
    set_sequence(node, name, values.to_vec())
}

/// Read the stored record of attribute `name` without decoding its value.
pub fn record<N: Node + ?Sized>(node: &N, name: &str) -> crate::Result<AttributeMetadata> {
    if !node.is_open() {
        return Err(crate::Error::StorageRead(format!(
            "{} is closed",
            node.node_name()
        )));
    }
    let raw = node
        .attributes()
        .get(name)
        .filter(|_| !is_reserved(name))
        .ok_or_else(|| crate::Error::not_found(node.node_name(), name))?;
    if !AttributeMetadata::is_record(raw) {
        return Err(crate::Error::UnsupportedKind(format!(
            "attribute {name:?} on {} is not a typed record",
            node.node_name()
        )));
    }
    serde_json::from_value(raw.clone()).map_err(|e| {
        crate::Error::StorageRead(format!(
            "malformed attribute {name:?} on {}: {e}",
            node.node_name()
        ))
    })
}

/// Read attribute `name` as whatever kind it was stored with.
///
/// Rank 0 attributes come back as scalars, all others as flat sequences.
pub fn get<N: Node + ?Sized>(node: &N, name: &str) -> crate::Result<Value> {
    let value = record(node, name)?.decode()?;
    log::trace!("Read attribute {name:?} from {}", node.node_name());
    Ok(value)
}

fn check_kind(expected: ElementKind, value: &Value) -> crate::Result<()> {
    if value.kind() != expected {
        return Err(crate::Error::KindMismatch {
            expected: expected.to_string(),
            found: value.kind().to_string(),
        });
    }
    Ok(())
}

/// Read a single element of type `T`.
///
/// A rank-1 attribute holding exactly one element is accepted.
pub fn get_scalar<N: Node + ?Sized, T: AttributeElement>(node: &N, name: &str) -> crate::Result<T> {
    let value = get(node, name)?;
    check_kind(T::KIND, &value)?;
    let len = value.len();
    value
        .into_scalar()
        .and_then(T::from_scalar_value)
        .ok_or_else(|| crate::Error::ShapeMismatch {
            expected: "a single element".into(),
            found: format!("{len} elements"),
        })
}

/// Read every element of type `T`; a scalar becomes a one-element sequence.
pub fn get_sequence<N: Node + ?Sized, T: AttributeElement>(
    node: &N,
    name: &str,
) -> crate::Result<Vec<T>> {
    let value = get(node, name)?;
    check_kind(T::KIND, &value)?;
    let found = value.kind();
    T::from_sequence_value(value.into_sequence()).ok_or_else(|| crate::Error::KindMismatch {
        expected: T::KIND.to_string(),
        found: found.to_string(),
    })
}

pub fn kind_of<N: Node + ?Sized>(node: &N, name: &str) -> crate::Result<ElementKind> {
    record(node, name)?.datatype.classify()
}

/// 0 for scalars.
pub fn rank_of<N: Node + ?Sized>(node: &N, name: &str) -> crate::Result<usize> {
    Ok(record(node, name)?.rank())
}

/// Stored extent per dimension; empty for scalars.
pub fn dims_of<N: Node + ?Sized>(node: &N, name: &str) -> crate::Result<Vec<u64>> {
    Ok(record(node, name)?.shape)
}

/// Whether `name` is present, typed or not. Never fails.
pub fn exists<N: Node + ?Sized>(node: &N, name: &str) -> bool {
    !is_reserved(name) && node.attributes().contains_key(name)
}

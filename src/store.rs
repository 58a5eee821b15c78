use std::collections::BTreeSet;
use std::fmt::Write;

use crate::codec;
use crate::kind::ElementKind;
use crate::metadata::is_reserved;
use crate::node::Node;
use crate::value::{AttributeElement, Value};

/// Named attribute access on a borrowed [`Node`].
///
/// ```
/// # use std::sync::Arc;
/// # use zarrs::{group::GroupBuilder, storage::store::MemoryStore};
/// # use zarrs_dal::{AttributeStore, ElementKind};
/// let store = Arc::new(MemoryStore::new());
/// let mut group = GroupBuilder::new().build(store, "/")?;
///
/// let mut attributes = AttributeStore::new(&mut group);
/// attributes.set("TELESCOPE", "LOFAR")?;
/// attributes.set("FREQUENCY", vec![30.0f64, 80.0])?;
///
/// assert!(attributes.exists("TELESCOPE"));
/// assert_eq!(attributes.kind_of("FREQUENCY")?, ElementKind::Float64);
/// assert_eq!(attributes.get_sequence::<f64>("FREQUENCY")?, vec![30.0, 80.0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AttributeStore<'a, N: Node + ?Sized> {
    node: &'a mut N,
    names: BTreeSet<String>,
}

impl<'a, N: Node + ?Sized> AttributeStore<'a, N> {
    pub fn new(node: &'a mut N) -> Self {
        let names = node
            .attributes()
            .keys()
            .filter(|k| !is_reserved(k))
            .cloned()
            .collect();
        Self { node, names }
    }

    pub fn node(&self) -> &N {
        &*self.node
    }

    /// Create or overwrite `name`, replacing any previous kind and shape.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> crate::Result<()> {
        codec::set(&mut *self.node, name, &value.into())?;
        self.names.insert(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> crate::Result<Value> {
        codec::get(&*self.node, name)
    }

    pub fn get_scalar<T: AttributeElement>(&self, name: &str) -> crate::Result<T> {
        codec::get_scalar(&*self.node, name)
    }

    pub fn get_sequence<T: AttributeElement>(&self, name: &str) -> crate::Result<Vec<T>> {
        codec::get_sequence(&*self.node, name)
    }

    /// Never fails; a missing attribute is simply absent.
    pub fn exists(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names of all attributes on the node, in lexical order.
    pub fn list_attribute_names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn kind_of(&self, name: &str) -> crate::Result<ElementKind> {
        codec::kind_of(&*self.node, name)
    }

    pub fn rank_of(&self, name: &str) -> crate::Result<usize> {
        codec::rank_of(&*self.node, name)
    }

    pub fn dims_of(&self, name: &str) -> crate::Result<Vec<u64>> {
        codec::dims_of(&*self.node, name)
    }

    /// One line per attribute with its kind, extent and value.
    ///
    /// Attributes which cannot be read are listed with the reason.
    pub fn summarize(&self) -> String {
        let mut out = String::new();
        for name in &self.names {
            let line = codec::record(&*self.node, name).and_then(|record| {
                let value = record.decode()?;
                Ok(format!("{name} ({}, {:?}) = {value}", value.kind(), record.shape))
            });
            match line {
                Ok(line) => {
                    let _ = writeln!(out, "{line}");
                }
                Err(e) => {
                    log::warn!(
                        "Could not read attribute {name:?} of {}: {e}",
                        self.node.node_name()
                    );
                    let _ = writeln!(out, "{name} = <{e}>");
                }
            }
        }
        out
    }
}

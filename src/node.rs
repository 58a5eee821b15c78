use zarrs::{
    array::{Array, ArrayMetadataOptions},
    group::Group,
    storage::{StorageError, WritableStorageTraits},
};

/// A location in a hierarchy which can carry attributes.
///
/// Implementors own the underlying handle;
/// this library only borrows it for the duration of a call.
pub trait Node {
    /// Path of the node within its hierarchy, for messages.
    fn node_name(&self) -> String;

    /// Whether the handle may still be used.
    fn is_open(&self) -> bool {
        true
    }

    /// The node's attribute map as currently held in memory.
    fn attributes(&self) -> &serde_json::Map<String, serde_json::Value>;

    fn attributes_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value>;

    /// Persist the in-memory attribute map to the store.
    fn store_attributes(&self) -> Result<(), StorageError>;
}

impl<TStorage: ?Sized + WritableStorageTraits + 'static> Node for Group<TStorage> {
    fn node_name(&self) -> String {
        self.path().as_str().to_string()
    }

    fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        Group::attributes(self)
    }

    fn attributes_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        Group::attributes_mut(self)
    }

    fn store_attributes(&self) -> Result<(), StorageError> {
        self.store_metadata()
    }
}

impl<TStorage: ?Sized + WritableStorageTraits + 'static> Node for Array<TStorage> {
    fn node_name(&self) -> String {
        self.path().as_str().to_string()
    }

    fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        Array::attributes(self)
    }

    fn attributes_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        Array::attributes_mut(self)
    }

    fn store_attributes(&self) -> Result<(), StorageError> {
        // keep provenance out of the user-visible attribute map
        self.store_metadata_opt(
            &ArrayMetadataOptions::default().with_include_zarrs_metadata(false),
        )
    }
}

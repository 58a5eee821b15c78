use std::sync::Arc;

use zarrs::filesystem::FilesystemStore;
use zarrs::group::{Group, GroupBuilder};
use zarrs_dal::{
    AttributeStore, Compression, Dataset, DatasetConfig, ElementKind, Hyperslab, Value,
};

fn fs_store(dir: &tempfile::TempDir) -> Arc<FilesystemStore> {
    env_logger::try_init().ok();
    Arc::new(FilesystemStore::new(dir.path()).expect("should be able to create store"))
}

#[test]
fn group_attributes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = fs_store(&dir);
        let mut group = GroupBuilder::new().build(store, "/").unwrap();
        let mut attributes = AttributeStore::new(&mut group);
        attributes.set("FILENAME", "L12345_SAP000_B000.h5").unwrap();
        attributes.set("NOF_BEAMS", 3i32).unwrap();
        attributes.set("CLOCK_FREQUENCY", 200.0f64).unwrap();
        attributes
            .set("TARGETS", vec!["Crab".to_string(), "Cas A".into()])
            .unwrap();
        attributes.set("FLAGGED", Vec::<i16>::new()).unwrap();
    }

    let mut group = Group::open(fs_store(&dir), "/").unwrap();
    let attributes = AttributeStore::new(&mut group);
    assert_eq!(attributes.list_attribute_names().len(), 5);
    assert_eq!(
        attributes.get("FILENAME").unwrap(),
        Value::String("L12345_SAP000_B000.h5".into())
    );
    assert_eq!(attributes.get_scalar::<i32>("NOF_BEAMS").unwrap(), 3);
    assert_eq!(
        attributes.get_scalar::<f64>("CLOCK_FREQUENCY").unwrap(),
        200.0
    );
    assert_eq!(
        attributes.get_sequence::<String>("TARGETS").unwrap(),
        vec!["Crab", "Cas A"]
    );
    assert_eq!(attributes.dims_of("FLAGGED").unwrap(), vec![0]);
}

#[test]
fn compressed_selection_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatasetConfig::default()
        .with_chunk_shape(vec![4, 4])
        .with_compression(Compression::Bzip2 { block_size: 9 });
    {
        let dataset = Dataset::create(
            fs_store(&dir),
            "/data",
            vec![8, 8],
            ElementKind::Float32,
            &config,
        )
        .unwrap();
        dataset
            .write(&Value::Float32Array((0..64).map(|n| n as f32).collect()))
            .unwrap();
    }

    let mut dataset = Dataset::<FilesystemStore>::open(fs_store(&dir), "/data").unwrap();
    assert_eq!(dataset.kind(), ElementKind::Float32);
    let slab = Hyperslab::with_stride(
        vec![8, 8],
        vec![1, 6],
        vec![4, 1],
        vec![2, 1],
        vec![1, 2],
    )
    .unwrap();
    slab.apply(&mut dataset).unwrap();
    assert_eq!(
        dataset.read().unwrap(),
        Value::Float32Array(vec![14.0, 15.0, 46.0, 47.0])
    );
}

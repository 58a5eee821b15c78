use std::sync::Arc;

use zarrs::storage::store::MemoryStore;
use zarrs_dal::{
    AttributeStore, Compression, Dataset, DatasetConfig, ElementKind, Error, Hyperslab, Value,
};

fn store() -> Arc<MemoryStore> {
    env_logger::try_init().ok();
    Arc::new(MemoryStore::new())
}

/// A 6x4 int32 dataset holding 0..24 in C order.
fn counting_dataset(config: &DatasetConfig) -> Dataset<MemoryStore> {
    let dataset = Dataset::create(store(), "/counts", vec![6, 4], ElementKind::Int32, config)
        .expect("should create dataset");
    dataset
        .write(&Value::Int32Array((0..24).collect()))
        .expect("should write whole dataset");
    dataset
}

#[test]
fn whole_dataset_round_trips() {
    let dataset = counting_dataset(&DatasetConfig::default());
    assert_eq!(dataset.kind(), ElementKind::Int32);
    assert_eq!(dataset.shape(), &[6, 4]);
    assert_eq!(dataset.read().unwrap(), Value::Int32Array((0..24).collect()));
}

#[test]
fn contiguous_block_is_read() {
    let mut dataset = counting_dataset(&DatasetConfig::default().with_chunk_shape(vec![4, 4]));
    let slab = Hyperslab::with_block(vec![6, 4], vec![1, 1], vec![2, 3]).unwrap();
    slab.apply(&mut dataset).unwrap();
    assert_eq!(
        dataset.read().unwrap(),
        Value::Int32Array(vec![5, 6, 7, 9, 10, 11])
    );
}

#[test]
fn strided_blocks_are_read_in_c_order() {
    let mut dataset = counting_dataset(&DatasetConfig::default().with_chunk_shape(vec![2, 2]));
    // rows {0, 3}, columns {0, 1}
    let slab = Hyperslab::with_stride(
        vec![6, 4],
        vec![0, 0],
        vec![3, 1],
        vec![2, 2],
        vec![1, 1],
    )
    .unwrap();
    assert_eq!(slab.output_shape(), vec![2, 2]);
    dataset.select(slab).unwrap();
    assert_eq!(dataset.read().unwrap(), Value::Int32Array(vec![0, 1, 12, 13]));

    // two blocks of 2x2, rows 0..2 and 3..5
    let slab = Hyperslab::with_stride(
        vec![6, 4],
        vec![0, 1],
        vec![3, 1],
        vec![2, 1],
        vec![2, 2],
    )
    .unwrap();
    dataset.select(slab).unwrap();
    assert_eq!(
        dataset.read().unwrap(),
        Value::Int32Array(vec![1, 2, 5, 6, 13, 14, 17, 18])
    );
}

#[test]
fn strided_write_touches_only_selection() {
    let config = DatasetConfig::default().with_compression(Compression::Gzip { level: -1 });
    let mut dataset =
        Dataset::create(store(), "/zeros", vec![4, 4], ElementKind::Float64, &config).unwrap();
    let slab = Hyperslab::with_stride(
        vec![4, 4],
        vec![0, 0],
        vec![2, 2],
        vec![2, 2],
        vec![1, 1],
    )
    .unwrap();
    dataset.select(slab).unwrap();
    dataset
        .write(&Value::Float64Array(vec![1.0, 2.0, 3.0, 4.0]))
        .unwrap();

    dataset.clear_selection();
    assert_eq!(
        dataset.read().unwrap(),
        Value::Float64Array(vec![
            1.0, 0.0, 2.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, //
            3.0, 0.0, 4.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, //
        ])
    );
}

#[test]
fn out_of_bounds_selection_is_rejected() {
    let mut dataset = counting_dataset(&DatasetConfig::default());
    let inside = Hyperslab::with_block(vec![6, 4], vec![4, 0], vec![2, 4]).unwrap();
    inside.apply(&mut dataset).unwrap();

    let outside = inside.to_builder().start(vec![5, 0]).build().unwrap();
    assert!(!outside.is_within_bounds());
    assert!(matches!(
        outside.apply(&mut dataset),
        Err(Error::InvalidSelection(_))
    ));
    // the previous selection survives
    assert_eq!(dataset.selection(), Some(&inside));

    // block defaults to the whole shape, so any offset overflows
    let shifted = Hyperslab::builder(vec![6, 4])
        .start(vec![1, 0])
        .build()
        .unwrap();
    assert!(matches!(
        dataset.select(shifted),
        Err(Error::InvalidSelection(_))
    ));

    let wrong_rank = Hyperslab::new(vec![6]);
    assert!(matches!(
        wrong_rank.apply(&mut dataset),
        Err(Error::InvalidSelection(_))
    ));
}

#[test]
fn mismatched_buffers_are_rejected() {
    let dataset = counting_dataset(&DatasetConfig::default());
    assert!(matches!(
        dataset.write(&Value::Int32Array(vec![1, 2, 3])),
        Err(Error::ShapeMismatch { .. })
    ));
    assert!(matches!(
        dataset.write(&Value::Float32Array(vec![0.0; 24])),
        Err(Error::KindMismatch { .. })
    ));
}

#[test]
fn overlapping_blocks_repeat_elements() {
    let mut dataset = Dataset::create(
        store(),
        "/line",
        vec![4],
        ElementKind::Int64,
        &DatasetConfig::default(),
    )
    .unwrap();
    dataset.write(&Value::Int64Array(vec![0, 1, 2, 3])).unwrap();

    let slab = Hyperslab::with_stride(vec![4], vec![0], vec![0], vec![3], vec![2]).unwrap();
    dataset.select(slab).unwrap();
    assert_eq!(
        dataset.read().unwrap(),
        Value::Int64Array(vec![0, 1, 0, 1, 0, 1])
    );

    // later blocks overwrite earlier ones
    dataset
        .write(&Value::Int64Array(vec![10, 11, 20, 21, 30, 31]))
        .unwrap();
    dataset.clear_selection();
    assert_eq!(
        dataset.read().unwrap(),
        Value::Int64Array(vec![30, 31, 2, 3])
    );
}

#[test]
fn empty_selection_reads_nothing() {
    let mut dataset = counting_dataset(&DatasetConfig::default());
    let slab = Hyperslab::with_stride(
        vec![6, 4],
        vec![2, 2],
        vec![1, 1],
        vec![0, 1],
        vec![1, 1],
    )
    .unwrap();
    assert_eq!(slab.nof_datapoints().unwrap(), 0);
    dataset.select(slab).unwrap();
    assert_eq!(dataset.read().unwrap(), Value::Int32Array(vec![]));
}

#[test]
fn single_element_accepts_scalar() {
    let mut dataset = counting_dataset(&DatasetConfig::default());
    let slab = Hyperslab::with_block(vec![6, 4], vec![5, 3], vec![1, 1]).unwrap();
    dataset.select(slab).unwrap();
    dataset.write(&Value::Int32(-1)).unwrap();
    assert_eq!(dataset.read().unwrap(), Value::Int32Array(vec![-1]));
}

#[test]
fn strings_are_not_stored_as_arrays() {
    let result = Dataset::create(
        store(),
        "/names",
        vec![3],
        ElementKind::String,
        &DatasetConfig::default(),
    );
    assert!(matches!(result, Err(Error::UnsupportedKind(_))));
}

#[test]
fn dataset_carries_attributes() {
    let storage = store();
    {
        let mut dataset = Dataset::create(
            storage.clone(),
            "/beam",
            vec![8],
            ElementKind::Int16,
            &DatasetConfig::default(),
        )
        .unwrap();
        let mut attributes = AttributeStore::new(&mut dataset);
        attributes.set("DATATYPE", "BeamFormed").unwrap();
        attributes.set("NOF_SAMPLES", 8i64).unwrap();
    }

    let mut reopened = Dataset::open(storage, "/beam").unwrap();
    assert_eq!(reopened.kind(), ElementKind::Int16);
    let attributes = AttributeStore::new(&mut reopened);
    let names: Vec<&str> = attributes
        .list_attribute_names()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(names, vec!["DATATYPE", "NOF_SAMPLES"]);
    assert_eq!(attributes.get_scalar::<i64>("NOF_SAMPLES").unwrap(), 8);
}

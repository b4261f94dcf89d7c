/// Event store, input tags and value maps
///
/// Run with: cargo test --test event_tests -- --nocapture
use electron_regression::error::RegressionError;
use electron_regression::event::{get_by_label, EventRecord, EventStore, InputTag, Product};
use electron_regression::value_map::{ElectronRef, ValueMap};

#[test]
fn test_input_tag_parsing() {
    let tag: InputTag = "kt6PFJets:rho".parse().unwrap();
    assert_eq!(tag, InputTag::new("kt6PFJets", "rho"));
    assert_eq!(tag.to_string(), "kt6PFJets:rho");

    let plain: InputTag = " offlinePrimaryVertices ".parse().unwrap();
    assert_eq!(plain.instance, "");
    assert_eq!(plain.to_string(), "offlinePrimaryVertices");

    for bad in ["", ":rho", "a:b:c"] {
        assert!(
            matches!(bad.parse::<InputTag>(), Err(RegressionError::InvalidInputTag(_))),
            "{bad:?}"
        );
    }
}

#[test]
fn test_input_tag_as_json_key() {
    let record = EventRecord::new(1, 2, 3).with(InputTag::new("kt6PFJets", "rho"), Product::Scalar(4.5));
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["products"]["kt6PFJets:rho"]["type"], "scalar");
    let back: EventRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn test_typed_lookup() {
    let record = EventRecord::default().with(InputTag::label("rho"), Product::Scalar(2.0));
    assert_eq!(*get_by_label::<f64>(&record, &InputTag::label("rho")).unwrap(), 2.0);
    assert!(matches!(
        get_by_label::<f64>(&record, &InputTag::label("other")),
        Err(RegressionError::MissingProduct(_))
    ));
    assert!(matches!(
        get_by_label::<ValueMap<f64>>(&record, &InputTag::label("rho")),
        Err(RegressionError::ProductType { .. })
    ));
}

#[test]
fn test_put_refuses_overwrite() {
    let mut record = EventRecord::default();
    let tag = InputTag::new("producer", "out");
    record.put(tag.clone(), Product::Scalar(1.0)).unwrap();
    let err = record.put(tag.clone(), Product::Scalar(2.0)).unwrap_err();
    assert!(matches!(err, RegressionError::DuplicateProduct(_)));
    assert_eq!(record.get(&tag), Some(&Product::Scalar(1.0)));
}

#[test]
fn test_value_map_insert() {
    println!("\n=== Test: Value Map ===");
    let electrons = InputTag::label("gsfElectrons");
    let mut map = ValueMap::new();
    map.insert(&electrons, 3, vec![1.0, 2.0, 3.0]).unwrap();
    assert_eq!(map.len(), 3);
    let second = ElectronRef {
        collection: electrons.clone(),
        key: 1,
    };
    assert_eq!(map.get(&second), Some(&2.0));
    assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);

    let err = map.insert(&electrons, 3, vec![4.0, 5.0, 6.0]).unwrap_err();
    assert!(matches!(err, RegressionError::DuplicateProduct(_)));

    let mut short = ValueMap::new();
    let err = short.insert(&electrons, 3, vec![1.0]).unwrap_err();
    assert!(matches!(err, RegressionError::SizeMismatch { items: 3, values: 1, .. }));
    assert!(short.is_empty());
    println!("✓ sizes enforced");
}

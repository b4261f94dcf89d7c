/// GBR forest traversal, validation and weights-file handling
///
/// Run with: cargo test --test forest_tests -- --nocapture
mod common;

use electron_regression::error::RegressionError;
use electron_regression::forest::{GbrForest, GbrTree};
use electron_regression::regression::{ElectronEnergyRegression, RegressionModel, RegressionType};

/// x[0] > 1 ? (x[1] > 5 ? 3 : 2) : 1
fn two_level_tree() -> GbrTree {
    GbrTree {
        cut_indices: vec![0, 1],
        cut_values: vec![1.0, 5.0],
        left_indices: vec![0, -1],
        right_indices: vec![1, -2],
        responses: vec![1.0, 2.0, 3.0],
    }
}

#[test]
fn test_tree_traversal() {
    println!("\n=== Test: Tree Traversal ===");
    let tree = two_level_tree();
    assert_eq!(tree.response(&[0.5, 9.0]), 1.0);
    assert_eq!(tree.response(&[1.0, 9.0]), 1.0, "equal to the cut goes left");
    assert_eq!(tree.response(&[2.0, 4.0]), 2.0);
    assert_eq!(tree.response(&[2.0, 6.0]), 3.0);
    println!("✓ all branches reached");
}

#[test]
fn test_forest_sums_trees_on_initial_response() {
    let forest = GbrForest::new(
        0.5,
        vec![two_level_tree(), GbrTree::constant(0.25), GbrTree::stump(1, 0.0, -1.0, 1.0)],
    );
    assert_eq!(forest.response(&[2.0, 6.0]), 0.5 + 3.0 + 0.25 + 1.0);
    assert_eq!(forest.response(&[0.0, -1.0]), 0.5 + 1.0 + 0.25 - 1.0);
}

#[test]
fn test_validation_rejects_malformed_trees() {
    println!("\n=== Test: Tree Validation ===");
    assert!(GbrForest::new(0.0, vec![two_level_tree()]).validate(2).is_ok());

    // reads a variable the input does not have
    let err = GbrForest::new(0.0, vec![two_level_tree()]).validate(1).unwrap_err();
    assert!(matches!(err, RegressionError::InvalidModel(_)), "{err}");

    // child pointing backwards would loop forever
    let mut looping = two_level_tree();
    looping.right_indices[1] = 1;
    assert!(GbrForest::new(0.0, vec![looping]).validate(2).is_err());

    // leaf out of range
    let mut missing_leaf = two_level_tree();
    missing_leaf.right_indices[1] = -7;
    assert!(GbrForest::new(0.0, vec![missing_leaf]).validate(2).is_err());

    // most negative leaf index has no positive counterpart
    let mut extreme_leaf = two_level_tree();
    extreme_leaf.left_indices[0] = i32::MIN;
    let err = GbrForest::new(0.0, vec![extreme_leaf]).validate(2).unwrap_err();
    assert!(matches!(err, RegressionError::InvalidModel(_)), "{err}");

    // ragged arrays
    let mut ragged = two_level_tree();
    ragged.cut_values.pop();
    assert!(GbrForest::new(0.0, vec![ragged]).validate(2).is_err());

    // no responses at all
    let empty = GbrTree {
        responses: vec![],
        ..GbrTree::constant(0.0)
    };
    assert!(GbrForest::new(0.0, vec![empty]).validate(2).is_err());
    println!("✓ every malformed tree rejected");
}

#[test]
fn test_weights_file_round_trip_and_load() {
    println!("\n=== Test: Weights File ===");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.json");
    let model = common::test_model();
    model.save(&path).unwrap();

    let loaded = RegressionModel::load(&path).unwrap();
    assert_eq!(loaded, model);

    let evaluator = ElectronEnergyRegression::load(&path, RegressionType::WithTrkVarV2).unwrap();
    assert!(evaluator.is_initialized());
    assert_eq!(evaluator.regression_type(), RegressionType::WithTrkVarV2);
    println!("✓ loaded {} bytes", std::fs::metadata(&path).unwrap().len());
}

#[test]
fn test_missing_and_corrupt_weights_fail() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("nope.json");
    let err = ElectronEnergyRegression::load(&missing, RegressionType::NoTrkVar).unwrap_err();
    assert!(matches!(err, RegressionError::Io(_)), "{err}");

    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, "{\"eb_correction\": ").unwrap();
    let err = ElectronEnergyRegression::load(&corrupt, RegressionType::NoTrkVar).unwrap_err();
    assert!(matches!(err, RegressionError::Json(_)), "{err}");

    let incomplete = dir.path().join("incomplete.json");
    std::fs::write(
        &incomplete,
        r#"{"eb_correction": {"trees": []}, "eb_uncertainty": {"trees": []}}"#,
    )
    .unwrap();
    let err = ElectronEnergyRegression::load(&incomplete, RegressionType::NoTrkVar).unwrap_err();
    assert!(matches!(err, RegressionError::Json(_)), "{err}");
}

#[test]
fn test_declared_variant_must_match_configured_one() {
    let mut model = common::test_model();
    model.regression_type = Some(RegressionType::WithSubCluVar);
    let err = ElectronEnergyRegression::from_model(model.clone(), RegressionType::NoTrkVar)
        .unwrap_err();
    assert!(matches!(err, RegressionError::ModelMismatch { .. }), "{err}");
    assert!(ElectronEnergyRegression::from_model(model, RegressionType::WithSubCluVar).is_ok());
}

#[test]
fn test_endcap_forest_checked_against_endcap_inputs() {
    // 35 is a valid barrel index for NoTrkVar but past the 31 endcap inputs
    let mut model = common::constant_model(1.0, 0.0);
    model.ee_correction.trees.push(GbrTree::stump(35, 0.0, 0.0, 1.0));
    let err = model.validate(RegressionType::NoTrkVar).unwrap_err();
    assert!(err.to_string().contains("ee_correction"), "{err}");

    model.eb_correction.trees.push(GbrTree::stump(35, 0.0, 0.0, 1.0));
    model.ee_correction.trees.clear();
    assert!(model.validate(RegressionType::NoTrkVar).is_ok());
}

//! Error types for the regression producer

use thiserror::Error;

use crate::event::InputTag;

#[derive(Error, Debug)]
pub enum RegressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Only 1..=4 name a model variant.
    #[error("invalid energyRegressionType {0}: expected 1, 2, 3 or 4")]
    InvalidRegressionType(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid regression model: {0}")]
    InvalidModel(String),

    #[error("weights file holds a {found} model but {expected} was configured")]
    ModelMismatch { expected: String, found: String },

    #[error("product not found in event: {0}")]
    MissingProduct(InputTag),

    #[error("product {tag} is a {found}, expected {expected}")]
    ProductType {
        tag: InputTag,
        expected: &'static str,
        found: &'static str,
    },

    #[error("value count {values} does not match collection size {items} for {tag}")]
    SizeMismatch {
        tag: InputTag,
        items: usize,
        values: usize,
    },

    #[error("product already present in event: {0}")]
    DuplicateProduct(InputTag),

    #[error("invalid input tag {0:?}")]
    InvalidInputTag(String),
}

pub type Result<T> = std::result::Result<T, RegressionError>;

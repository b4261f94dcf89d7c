//! Event store abstraction.
//!
//! The producer only needs "get product by tag" and "put product under a
//! name". [`EventStore`] captures exactly that; [`EventRecord`] is the
//! in-memory store used by the batch driver, the HTTP service and the tests.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};
use crate::rechits::RecHitCollection;
use crate::types::{Electron, Vertex};
use crate::value_map::ValueMap;

/// Product identifier, written `label` or `label:instance`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InputTag {
    pub label: String,
    pub instance: String,
}

impl InputTag {
    pub fn new(label: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instance: instance.into(),
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self::new(label, "")
    }
}

impl fmt::Display for InputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance.is_empty() {
            write!(f, "{}", self.label)
        } else {
            write!(f, "{}:{}", self.label, self.instance)
        }
    }
}

impl FromStr for InputTag {
    type Err = RegressionError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (label, instance) = match s.split_once(':') {
            Some((l, i)) => (l, i),
            None => (s, ""),
        };
        if label.is_empty() || instance.contains(':') {
            return Err(RegressionError::InvalidInputTag(s.to_string()));
        }
        Ok(Self::new(label, instance))
    }
}

impl TryFrom<String> for InputTag {
    type Error = RegressionError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<InputTag> for String {
    fn from(tag: InputTag) -> Self {
        tag.to_string()
    }
}

/// Anything that can live in an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Product {
    Electrons(Vec<Electron>),
    RecHits(RecHitCollection),
    Vertices(Vec<Vertex>),
    Scalar(f64),
    ValueMap(ValueMap<f64>),
}

impl Product {
    pub fn kind(&self) -> &'static str {
        match self {
            Product::Electrons(_) => "electrons",
            Product::RecHits(_) => "rec_hits",
            Product::Vertices(_) => "vertices",
            Product::Scalar(_) => "scalar",
            Product::ValueMap(_) => "value_map",
        }
    }
}

/// Typed view into a [`Product`].
pub trait FromProduct {
    const KIND: &'static str;

    fn from_product(product: &Product) -> Option<&Self>;
}

impl FromProduct for Vec<Electron> {
    const KIND: &'static str = "electrons";

    fn from_product(product: &Product) -> Option<&Self> {
        match product {
            Product::Electrons(v) => Some(v),
            _ => None,
        }
    }
}

impl FromProduct for RecHitCollection {
    const KIND: &'static str = "rec_hits";

    fn from_product(product: &Product) -> Option<&Self> {
        match product {
            Product::RecHits(v) => Some(v),
            _ => None,
        }
    }
}

impl FromProduct for Vec<Vertex> {
    const KIND: &'static str = "vertices";

    fn from_product(product: &Product) -> Option<&Self> {
        match product {
            Product::Vertices(v) => Some(v),
            _ => None,
        }
    }
}

impl FromProduct for f64 {
    const KIND: &'static str = "scalar";

    fn from_product(product: &Product) -> Option<&Self> {
        match product {
            Product::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

impl FromProduct for ValueMap<f64> {
    const KIND: &'static str = "value_map";

    fn from_product(product: &Product) -> Option<&Self> {
        match product {
            Product::ValueMap(v) => Some(v),
            _ => None,
        }
    }
}

pub trait EventStore {
    fn get(&self, tag: &InputTag) -> Option<&Product>;

    /// Stores a product; a tag can be written only once per event.
    fn put(&mut self, tag: InputTag, product: Product) -> Result<()>;
}

/// Typed lookup; absent and wrongly typed products are both errors.
pub fn get_by_label<'a, T: FromProduct>(store: &'a dyn EventStore, tag: &InputTag) -> Result<&'a T> {
    let product = store
        .get(tag)
        .ok_or_else(|| RegressionError::MissingProduct(tag.clone()))?;
    T::from_product(product).ok_or_else(|| RegressionError::ProductType {
        tag: tag.clone(),
        expected: T::KIND,
        found: product.kind(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub run: u32,
    #[serde(default)]
    pub lumi: u32,
    #[serde(default)]
    pub event: u64,
    #[serde(default)]
    pub products: HashMap<InputTag, Product>,
}

impl EventRecord {
    pub fn new(run: u32, lumi: u32, event: u64) -> Self {
        Self {
            run,
            lumi,
            event,
            products: HashMap::new(),
        }
    }

    /// Builder-style insert for fixtures; replaces an existing product.
    pub fn with(mut self, tag: InputTag, product: Product) -> Self {
        self.products.insert(tag, product);
        self
    }
}

impl EventStore for EventRecord {
    fn get(&self, tag: &InputTag) -> Option<&Product> {
        self.products.get(tag)
    }

    fn put(&mut self, tag: InputTag, product: Product) -> Result<()> {
        if self.products.contains_key(&tag) {
            return Err(RegressionError::DuplicateProduct(tag));
        }
        self.products.insert(tag, product);
        Ok(())
    }
}

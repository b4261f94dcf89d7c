//! Regression-corrected electron energies for ECAL superclusters.
//!
//! [`producer::ElectronRegressionProducer`] reads electrons, rechits,
//! vertices and the pileup density from an [`event::EventStore`], scores each
//! electron with a [`regression::RegressionEvaluator`] and writes two value
//! maps (energy, energy uncertainty) back into the event.

pub mod batch;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod features;
pub mod forest;
pub mod geometry;
pub mod producer;
pub mod rechits;
pub mod regression;
pub mod service;
pub mod types;
pub mod value_map;

pub use error::{RegressionError, Result};

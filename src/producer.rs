//! Per-event driver: electrons in, regression energy value maps out.

use std::sync::Arc;

use serde::Serialize;

use crate::config::ProducerConfig;
use crate::context::{EventContext, VertexQualityCuts};
use crate::error::{RegressionError, Result};
use crate::event::{get_by_label, EventStore, InputTag, Product};
use crate::features::{FeatureExtractor, SuperClusterHelper};
use crate::geometry::{CaloGeometry, CaloTopology};
use crate::rechits::RecHitCollection;
use crate::regression::{ElectronEnergyRegression, RegressionEvaluator};
use crate::types::{Electron, Region, Vertex};
use crate::value_map::ValueMap;

/// What one call to [`ElectronRegressionProducer::produce`] wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProducedMaps {
    pub context: EventContext,
    pub energy_tag: InputTag,
    pub energy: ValueMap<f64>,
    pub energy_error_tag: InputTag,
    pub energy_error: ValueMap<f64>,
}

pub struct ElectronRegressionProducer {
    print_debug: bool,
    electron_tag: InputTag,
    rec_hits_eb: InputTag,
    rec_hits_ee: InputTag,
    vertex_tag: InputTag,
    rho_tag: InputTag,
    vertex_cuts: VertexQualityCuts,
    energy_tag: InputTag,
    energy_error_tag: InputTag,
    evaluator: Box<dyn RegressionEvaluator>,
    extractor: Box<dyn FeatureExtractor>,
}

impl ElectronRegressionProducer {
    /// Loads the weights named by `cfg` and wires the supercluster helper to
    /// the given detector description.
    pub fn from_config(
        cfg: &ProducerConfig,
        geometry: Arc<CaloGeometry>,
        topology: Arc<CaloTopology>,
    ) -> Result<Self> {
        cfg.validate()?;
        let evaluator =
            ElectronEnergyRegression::load(&cfg.regression_input_file, cfg.regression_type()?)?;
        Ok(Self::with_components(
            cfg,
            Box::new(evaluator),
            Box::new(SuperClusterHelper::new(geometry, topology)),
        ))
    }

    pub fn with_components(
        cfg: &ProducerConfig,
        evaluator: Box<dyn RegressionEvaluator>,
        extractor: Box<dyn FeatureExtractor>,
    ) -> Self {
        Self {
            print_debug: cfg.print_debug,
            electron_tag: cfg.electron_tag.clone(),
            rec_hits_eb: cfg.rec_hit_collection_eb.clone(),
            rec_hits_ee: cfg.rec_hit_collection_ee.clone(),
            vertex_tag: cfg.vertex_tag.clone(),
            rho_tag: cfg.rho_tag.clone(),
            vertex_cuts: cfg.vertex_cuts,
            energy_tag: cfg.energy_output_tag(),
            energy_error_tag: cfg.energy_error_output_tag(),
            evaluator,
            extractor,
        }
    }

    /// Scores every electron of `event` and stores both value maps in it.
    ///
    /// Nothing is written unless every input product is present.
    pub fn produce(&self, event: &mut dyn EventStore) -> Result<ProducedMaps> {
        let (context, energies, errors, n_electrons) = {
            let store: &dyn EventStore = &*event;
            let vertices: &Vec<Vertex> = get_by_label(store, &self.vertex_tag)?;
            let rho: f64 = *get_by_label::<f64>(store, &self.rho_tag)?;
            let context = EventContext::build(vertices, rho, &self.vertex_cuts);

            let electrons: &Vec<Electron> = get_by_label(store, &self.electron_tag)?;
            let eb_hits: &RecHitCollection = get_by_label(store, &self.rec_hits_eb)?;
            let ee_hits: &RecHitCollection = get_by_label(store, &self.rec_hits_ee)?;

            let (energies, errors) = self.regress(electrons, eb_hits, ee_hits, &context);
            (context, energies, errors, electrons.len())
        };

        if self.print_debug {
            tracing::info!(
                electrons = n_electrons,
                rho = context.rho,
                vertices = context.vertex_count,
                "event processed"
            );
        }

        let mut energy = ValueMap::new();
        energy.insert(&self.electron_tag, n_electrons, energies)?;
        let mut energy_error = ValueMap::new();
        energy_error.insert(&self.electron_tag, n_electrons, errors)?;

        for tag in [&self.energy_tag, &self.energy_error_tag] {
            if event.get(tag).is_some() {
                return Err(RegressionError::DuplicateProduct(tag.clone()));
            }
        }
        event.put(self.energy_tag.clone(), Product::ValueMap(energy.clone()))?;
        event.put(
            self.energy_error_tag.clone(),
            Product::ValueMap(energy_error.clone()),
        )?;

        Ok(ProducedMaps {
            context,
            energy_tag: self.energy_tag.clone(),
            energy,
            energy_error_tag: self.energy_error_tag.clone(),
            energy_error,
        })
    }

    /// Energies and uncertainties of `electrons`, in input order.
    pub fn regress(
        &self,
        electrons: &[Electron],
        eb_hits: &RecHitCollection,
        ee_hits: &RecHitCollection,
        context: &EventContext,
    ) -> (Vec<f64>, Vec<f64>) {
        let mut energies = Vec::with_capacity(electrons.len());
        let mut errors = Vec::with_capacity(electrons.len());
        for electron in electrons {
            let hits = match electron.region {
                Region::Barrel => eb_hits,
                Region::Endcap => ee_hits,
            };
            let features = self.extractor.extract(electron, hits);
            energies.push(self.evaluator.energy(
                electron,
                &features,
                context.rho,
                context.vertex_count,
                self.print_debug,
            ));
            errors.push(self.evaluator.energy_uncertainty(
                electron,
                &features,
                context.rho,
                context.vertex_count,
                self.print_debug,
            ));
        }
        (energies, errors)
    }
}

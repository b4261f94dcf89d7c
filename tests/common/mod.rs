#![allow(dead_code)]

use std::path::Path;

use electron_regression::config::ProducerConfig;
use electron_regression::context::VertexQualityCuts;
use electron_regression::event::{EventRecord, InputTag, Product};
use electron_regression::forest::{GbrForest, GbrTree};
use electron_regression::rechits::RecHitCollection;
use electron_regression::regression::RegressionModel;
use electron_regression::types::{
    BasicCluster, CrystalId, Electron, RecHit, Region, SeedCluster, SuperCluster, TrackInfo,
    Vertex,
};

pub const ELECTRONS: &str = "gsfElectrons";
pub const EB_HITS: &str = "reducedEcalRecHitsEB";
pub const EE_HITS: &str = "reducedEcalRecHitsEE";

pub fn config(weights: &Path) -> ProducerConfig {
    ProducerConfig {
        print_debug: false,
        electron_tag: InputTag::label(ELECTRONS),
        rec_hit_collection_eb: InputTag::label(EB_HITS),
        rec_hit_collection_ee: InputTag::label(EE_HITS),
        regression_input_file: weights.to_path_buf(),
        energy_regression_type: 1,
        name_energy_reg: "eneRegForGsfEle".to_string(),
        name_energy_error_reg: "eneErrorRegForGsfEle".to_string(),
        module_label: "eleRegressionEnergy".to_string(),
        vertex_tag: InputTag::label("offlinePrimaryVertices"),
        rho_tag: InputTag::new("kt6PFJets", "rho"),
        vertex_cuts: VertexQualityCuts::default(),
    }
}

/// Correction 1.0 + 0.05 above rho 4 + 0.01 above 1.5 vertices; uncertainty
/// 0.01 + 0.01 above rho 4. Same forests for both partitions.
pub fn test_model() -> RegressionModel {
    let correction = GbrForest::new(
        1.0,
        vec![GbrTree::stump(9, 4.0, 0.0, 0.05), GbrTree::stump(10, 1.5, 0.0, 0.01)],
    );
    let uncertainty = GbrForest::new(0.01, vec![GbrTree::stump(9, 4.0, 0.0, 0.01)]);
    RegressionModel {
        regression_type: None,
        eb_correction: correction.clone(),
        eb_uncertainty: uncertainty.clone(),
        ee_correction: correction,
        ee_uncertainty: uncertainty,
    }
}

pub fn constant_model(correction: f64, uncertainty: f64) -> RegressionModel {
    let c = GbrForest::new(correction, vec![]);
    let u = GbrForest::new(uncertainty, vec![]);
    RegressionModel {
        regression_type: None,
        eb_correction: c.clone(),
        eb_uncertainty: u.clone(),
        ee_correction: c,
        ee_uncertainty: u,
    }
}

pub fn barrel_electron(ieta: i32, iphi: i32, raw_energy: f64) -> Electron {
    Electron {
        pt: raw_energy * 0.9,
        eta: 0.15,
        phi: 0.8,
        charge: -1,
        region: Region::Barrel,
        h_over_e: 0.01,
        ecal_driven: true,
        supercluster: SuperCluster {
            raw_energy,
            preshower_energy: 0.0,
            eta: 0.15,
            phi: 0.8,
            eta_width: 0.009,
            phi_width: 0.03,
            seed: SeedCluster {
                energy: raw_energy * 0.8,
                eta: 0.152,
                phi: 0.801,
                crystal: CrystalId::Barrel { ieta, iphi },
            },
            clusters: vec![BasicCluster {
                energy: raw_energy * 0.2,
                eta: 0.16,
                phi: 0.85,
            }],
        },
        track: TrackInfo {
            p_in: raw_energy * 1.1,
            p_error: 1.5,
            fbrem: 0.3,
            e_super_cluster_over_p: 0.95,
            ecal_energy: raw_energy,
            ecal_energy_error: 1.2,
            classification: 1,
            ..TrackInfo::default()
        },
    }
}

pub fn endcap_electron(ix: i32, iy: i32, raw_energy: f64, preshower: f64) -> Electron {
    let mut e = barrel_electron(1, 1, raw_energy);
    e.region = Region::Endcap;
    e.eta = 2.0;
    e.supercluster.eta = 2.0;
    e.supercluster.preshower_energy = preshower;
    e.supercluster.seed.eta = 2.0;
    e.supercluster.seed.crystal = CrystalId::Endcap { ix, iy, zside: 1 };
    e
}

/// 3x3 block around the seed: seed `center`, each neighbour `ring`.
pub fn barrel_block(ieta: i32, iphi: i32, center: f64, ring: f64) -> RecHitCollection {
    let mut hits = vec![RecHit {
        id: CrystalId::Barrel { ieta, iphi },
        energy: center,
    }];
    for (de, dp) in [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)] {
        hits.push(RecHit {
            id: CrystalId::Barrel {
                ieta: ieta + de,
                iphi: iphi + dp,
            },
            energy: ring,
        });
    }
    RecHitCollection::new(hits)
}

pub fn good_vertex() -> Vertex {
    Vertex {
        ndof: 10.0,
        x: 0.05,
        y: 0.02,
        z: 1.0,
    }
}

pub fn event(
    electrons: Vec<Electron>,
    eb: RecHitCollection,
    ee: RecHitCollection,
    vertices: Vec<Vertex>,
    rho: f64,
) -> EventRecord {
    EventRecord::new(1, 7, 42)
        .with(InputTag::label(ELECTRONS), Product::Electrons(electrons))
        .with(InputTag::label(EB_HITS), Product::RecHits(eb))
        .with(InputTag::label(EE_HITS), Product::RecHits(ee))
        .with(InputTag::label("offlinePrimaryVertices"), Product::Vertices(vertices))
        .with(InputTag::new("kt6PFJets", "rho"), Product::Scalar(rho))
}

//! Supercluster shower-shape features.

use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::Serialize;

use crate::geometry::{wrap_phi, CaloGeometry, CaloTopology};
use crate::rechits::RecHitCollection;
use crate::types::{CrystalId, Electron, Region};

/// Log-weight cutoff used for the local covariances.
const LOG_WEIGHT_W0: f64 = 4.7;
const MAX_SUB_CLUSTERS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SubCluster {
    pub energy: f64,
    pub eta: f64,
    pub phi: f64,
}

/// Everything the regression needs to know about one electron's
/// supercluster. Energies in GeV.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShowerFeatures {
    pub region: Option<Region>,
    pub sc_raw_energy: f64,
    pub sc_eta: f64,
    pub sc_phi: f64,
    pub sc_eta_width: f64,
    pub sc_phi_width: f64,
    pub preshower_energy: f64,
    pub clusters_size: usize,
    pub h_over_e: f64,

    pub seed_energy: f64,
    pub seed_eta: f64,
    pub seed_phi: f64,

    pub e3x3: f64,
    pub e5x5: f64,
    pub e_max: f64,
    pub e_2nd: f64,
    pub e_top: f64,
    pub e_bottom: f64,
    pub e_left: f64,
    pub e_right: f64,
    pub e2x5_max: f64,
    pub e2x5_top: f64,
    pub e2x5_bottom: f64,
    pub e2x5_left: f64,
    pub e2x5_right: f64,

    pub sigma_ieta_ieta: f64,
    pub sigma_iphi_iphi: f64,
    /// Eta-phi covariance normalised by `sigma_ieta_ieta * sigma_iphi_iphi`.
    pub cov_ieta_iphi: f64,
    pub r9: f64,

    /// `ieta`/`iphi` in the barrel, `ix`/`iy` in the endcap.
    pub ieta_seed: i32,
    pub iphi_seed: i32,
    /// Seed-cluster position inside its crystal, in crystal units. Barrel only.
    pub eta_cry_seed: f64,
    pub phi_cry_seed: f64,

    /// Leading non-seed clusters by energy, zero-filled.
    pub sub_clusters: [SubCluster; MAX_SUB_CLUSTERS],
}

impl ShowerFeatures {
    pub fn preshower_over_raw(&self) -> f64 {
        ratio(self.preshower_energy, self.sc_raw_energy)
    }
}

/// `num / den`, 0 when the denominator vanishes.
pub(crate) fn ratio(num: f64, den: f64) -> f64 {
    if den != 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Builds the feature set of one electron from the hits of its partition.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, electron: &Electron, hits: &RecHitCollection) -> ShowerFeatures;
}

pub struct SuperClusterHelper {
    geometry: Arc<CaloGeometry>,
    topology: Arc<CaloTopology>,
}

impl SuperClusterHelper {
    pub fn new(geometry: Arc<CaloGeometry>, topology: Arc<CaloTopology>) -> Self {
        Self { geometry, topology }
    }

    fn energy_at(&self, hits: &RecHitCollection, seed: CrystalId, deta: i32, dphi: i32) -> f64 {
        self.topology
            .offset(seed, deta, dphi)
            .map_or(0.0, |id| hits.energy(id))
    }

    fn matrix_energy(
        &self,
        hits: &RecHitCollection,
        seed: CrystalId,
        eta: RangeInclusive<i32>,
        phi: RangeInclusive<i32>,
    ) -> f64 {
        let mut sum = 0.0;
        for deta in eta {
            for dphi in phi.clone() {
                sum += self.energy_at(hits, seed, deta, dphi);
            }
        }
        sum
    }

    /// Log-weighted (sigma_eta, sigma_phi, normalised covariance) over the
    /// 5x5 window.
    fn local_covariances(
        &self,
        hits: &RecHitCollection,
        seed: CrystalId,
        e5x5: f64,
        crystal_size: f64,
    ) -> (f64, f64, f64) {
        if e5x5 <= 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let weighted: Vec<(f64, f64, f64)> = self
            .topology
            .window(seed, 2, 2)
            .into_iter()
            .filter_map(|(deta, dphi, id)| {
                let e = hits.energy(id);
                if e <= 0.0 {
                    return None;
                }
                let w = (LOG_WEIGHT_W0 + (e / e5x5).ln()).max(0.0);
                (w > 0.0).then_some((w, deta as f64, dphi as f64))
            })
            .collect();

        let sum_w: f64 = weighted.iter().map(|(w, _, _)| w).sum();
        if sum_w <= 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let mean_eta = weighted.iter().map(|(w, x, _)| w * x).sum::<f64>() / sum_w;
        let mean_phi = weighted.iter().map(|(w, _, y)| w * y).sum::<f64>() / sum_w;

        let (mut var_eta, mut var_phi, mut cov) = (0.0, 0.0, 0.0);
        for (w, x, y) in &weighted {
            var_eta += w * (x - mean_eta).powi(2);
            var_phi += w * (y - mean_phi).powi(2);
            cov += w * (x - mean_eta) * (y - mean_phi);
        }
        let see = (var_eta / sum_w).sqrt() * crystal_size;
        let spp = (var_phi / sum_w).sqrt() * crystal_size;
        let cov = cov / sum_w * crystal_size * crystal_size;
        let sep = if see * spp > 0.0 {
            cov / (see * spp)
        } else if cov > 0.0 {
            1.0
        } else {
            -1.0
        };
        (see, spp, sep)
    }
}

impl FeatureExtractor for SuperClusterHelper {
    fn extract(&self, electron: &Electron, hits: &RecHitCollection) -> ShowerFeatures {
        let sc = &electron.supercluster;
        let seed = sc.seed.crystal;
        let region = seed.region();
        if region != electron.region {
            tracing::warn!(
                ?region,
                electron_region = ?electron.region,
                "seed crystal partition disagrees with electron partition"
            );
        }

        let mut f = ShowerFeatures {
            region: Some(electron.region),
            sc_raw_energy: sc.raw_energy,
            sc_eta: sc.eta,
            sc_phi: sc.phi,
            sc_eta_width: sc.eta_width,
            sc_phi_width: sc.phi_width,
            preshower_energy: sc.preshower_energy,
            clusters_size: sc.clusters_size(),
            h_over_e: electron.h_over_e,
            seed_energy: sc.seed.energy,
            seed_eta: sc.seed.eta,
            seed_phi: sc.seed.phi,
            ..ShowerFeatures::default()
        };

        let window3: Vec<f64> = self
            .topology
            .window(seed, 1, 1)
            .into_iter()
            .map(|(_, _, id)| hits.energy(id))
            .collect();
        f.e3x3 = window3.iter().sum();
        let mut sorted = window3;
        sorted.sort_by(|a, b| b.total_cmp(a));
        f.e_max = sorted.first().copied().unwrap_or(0.0);
        f.e_2nd = sorted.get(1).copied().unwrap_or(0.0);

        f.e5x5 = self.matrix_energy(hits, seed, -2..=2, -2..=2);
        f.e_top = self.energy_at(hits, seed, 0, 1);
        f.e_bottom = self.energy_at(hits, seed, 0, -1);
        f.e_left = self.energy_at(hits, seed, -1, 0);
        f.e_right = self.energy_at(hits, seed, 1, 0);
        f.e2x5_right = self.matrix_energy(hits, seed, 1..=2, -2..=2);
        f.e2x5_left = self.matrix_energy(hits, seed, -2..=-1, -2..=2);
        f.e2x5_top = self.matrix_energy(hits, seed, -2..=2, 1..=2);
        f.e2x5_bottom = self.matrix_energy(hits, seed, -2..=2, -2..=-1);
        f.e2x5_max = self
            .matrix_energy(hits, seed, -1..=0, -2..=2)
            .max(self.matrix_energy(hits, seed, 0..=1, -2..=2));

        let (see, spp, sep) =
            self.local_covariances(hits, seed, f.e5x5, self.geometry.crystal_size(region));
        f.sigma_ieta_ieta = see;
        f.sigma_iphi_iphi = spp;
        f.cov_ieta_iphi = sep;
        f.r9 = ratio(f.e3x3, sc.raw_energy);

        match seed {
            CrystalId::Barrel { ieta, iphi } => {
                f.ieta_seed = ieta;
                f.iphi_seed = iphi;
                if let Some(pos) = self.geometry.position(seed) {
                    let size = self.geometry.crystal_size(Region::Barrel);
                    f.eta_cry_seed = (sc.seed.eta - pos.eta) / size;
                    f.phi_cry_seed = wrap_phi(sc.seed.phi - pos.phi) / size;
                }
            }
            CrystalId::Endcap { ix, iy, .. } => {
                f.ieta_seed = ix;
                f.iphi_seed = iy;
            }
        }

        let mut subs = sc.clusters.clone();
        subs.sort_by(|a, b| b.energy.total_cmp(&a.energy));
        for (slot, bc) in f.sub_clusters.iter_mut().zip(subs.iter()) {
            *slot = SubCluster {
                energy: bc.energy,
                eta: bc.eta,
                phi: bc.phi,
            };
        }

        f
    }
}

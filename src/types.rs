use serde::{Deserialize, Serialize};

/// ECAL partition an electron's supercluster was reconstructed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Barrel,
    Endcap,
}

/// ECAL crystal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "det", rename_all = "lowercase")]
pub enum CrystalId {
    /// `ieta` in ±[1, 85] (no zero), `iphi` in [1, 360].
    Barrel { ieta: i32, iphi: i32 },
    /// `ix`, `iy` in [1, 100], `zside` ±1.
    Endcap { ix: i32, iy: i32, zside: i32 },
}

impl CrystalId {
    pub fn region(&self) -> Region {
        match self {
            CrystalId::Barrel { .. } => Region::Barrel,
            CrystalId::Endcap { .. } => Region::Endcap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecHit {
    pub id: CrystalId,
    pub energy: f64,
}

/// Reconstructed primary vertex; position in cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub ndof: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    /// Transverse displacement from the beam line.
    pub fn rho(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicCluster {
    pub energy: f64,
    pub eta: f64,
    pub phi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedCluster {
    pub energy: f64,
    pub eta: f64,
    pub phi: f64,
    /// Highest-energy crystal of the seed cluster.
    pub crystal: CrystalId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperCluster {
    pub raw_energy: f64,
    #[serde(default)]
    pub preshower_energy: f64,
    pub eta: f64,
    pub phi: f64,
    pub eta_width: f64,
    pub phi_width: f64,
    pub seed: SeedCluster,
    /// Basic clusters other than the seed.
    #[serde(default)]
    pub clusters: Vec<BasicCluster>,
}

impl SuperCluster {
    /// Number of basic clusters including the seed.
    pub fn clusters_size(&self) -> usize {
        self.clusters.len() + 1
    }
}

/// Tracking quantities attached to a GSF electron.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackInfo {
    pub p_in: f64,
    pub p_error: f64,
    pub fbrem: f64,
    pub e_super_cluster_over_p: f64,
    pub ecal_energy: f64,
    pub ecal_energy_error: f64,
    pub classification: i32,
    pub delta_eta_in: f64,
    pub delta_phi_in: f64,
    pub delta_eta_calo: f64,
    pub delta_phi_calo: f64,
    pub gsf_chi2: f64,
    pub kf_layers: i32,
    pub e_ele_cluster_over_pout: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Electron {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub charge: i32,
    pub region: Region,
    #[serde(default)]
    pub h_over_e: f64,
    #[serde(default = "default_ecal_driven")]
    pub ecal_driven: bool,
    pub supercluster: SuperCluster,
    #[serde(default)]
    pub track: TrackInfo,
}

fn default_ecal_driven() -> bool {
    true
}

impl Electron {
    pub fn is_eb(&self) -> bool {
        self.region == Region::Barrel
    }
}

//! Electron energy regression: model variants, weights and evaluation.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};
use crate::features::{ratio, ShowerFeatures};
use crate::forest::GbrForest;
use crate::geometry::wrap_phi;
use crate::types::{Electron, Region};

const EB_BASE_VARS: usize = 38;
const EE_BASE_VARS: usize = 31;
const SUB_CLUSTER_VARS: usize = 10;
const TRACK_V1_VARS: usize = 8;
const TRACK_V2_VARS: usize = 7;

/// Feature set / model variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionType {
    #[default]
    NoTrkVar,
    WithSubCluVar,
    WithTrkVarV1,
    WithTrkVarV2,
}

impl RegressionType {
    pub const ALL: [RegressionType; 4] = [
        RegressionType::NoTrkVar,
        RegressionType::WithSubCluVar,
        RegressionType::WithTrkVarV1,
        RegressionType::WithTrkVarV2,
    ];

    /// Configuration code, 1..=4.
    pub fn code(self) -> u32 {
        match self {
            RegressionType::NoTrkVar => 1,
            RegressionType::WithSubCluVar => 2,
            RegressionType::WithTrkVarV1 => 3,
            RegressionType::WithTrkVarV2 => 4,
        }
    }

    /// Length of the input vector for electrons of `region`.
    pub fn input_len(self, region: Region) -> usize {
        let base = match region {
            Region::Barrel => EB_BASE_VARS,
            Region::Endcap => EE_BASE_VARS,
        };
        match self {
            RegressionType::NoTrkVar => base,
            RegressionType::WithSubCluVar => base + SUB_CLUSTER_VARS,
            RegressionType::WithTrkVarV1 => base + TRACK_V1_VARS,
            RegressionType::WithTrkVarV2 => base + TRACK_V1_VARS + TRACK_V2_VARS,
        }
    }
}

impl TryFrom<u32> for RegressionType {
    type Error = RegressionError;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            1 => Ok(RegressionType::NoTrkVar),
            2 => Ok(RegressionType::WithSubCluVar),
            3 => Ok(RegressionType::WithTrkVarV1),
            4 => Ok(RegressionType::WithTrkVarV2),
            other => Err(RegressionError::InvalidRegressionType(other)),
        }
    }
}

impl fmt::Display for RegressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegressionType::NoTrkVar => "no_trk_var",
            RegressionType::WithSubCluVar => "with_sub_clu_var",
            RegressionType::WithTrkVarV1 => "with_trk_var_v1",
            RegressionType::WithTrkVarV2 => "with_trk_var_v2",
        };
        f.write_str(name)
    }
}

/// Contents of a weights file: one correction and one uncertainty forest per
/// partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regression_type: Option<RegressionType>,
    pub eb_correction: GbrForest,
    pub eb_uncertainty: GbrForest,
    pub ee_correction: GbrForest,
    pub ee_uncertainty: GbrForest,
}

impl RegressionModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Checks the forests against the input vectors of `ty`.
    pub fn validate(&self, ty: RegressionType) -> Result<()> {
        if let Some(found) = self.regression_type {
            if found != ty {
                return Err(RegressionError::ModelMismatch {
                    expected: ty.to_string(),
                    found: found.to_string(),
                });
            }
        }
        let forests = [
            ("eb_correction", &self.eb_correction, Region::Barrel),
            ("eb_uncertainty", &self.eb_uncertainty, Region::Barrel),
            ("ee_correction", &self.ee_correction, Region::Endcap),
            ("ee_uncertainty", &self.ee_uncertainty, Region::Endcap),
        ];
        for (name, forest, region) in forests {
            forest.validate(ty.input_len(region)).map_err(|e| match e {
                RegressionError::InvalidModel(msg) => {
                    RegressionError::InvalidModel(format!("{name}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

/// Energy and energy uncertainty of one electron.
pub trait RegressionEvaluator: Send + Sync {
    fn energy(
        &self,
        electron: &Electron,
        features: &ShowerFeatures,
        rho: f64,
        vertex_count: u32,
        debug: bool,
    ) -> f64;

    fn energy_uncertainty(
        &self,
        electron: &Electron,
        features: &ShowerFeatures,
        rho: f64,
        vertex_count: u32,
        debug: bool,
    ) -> f64;
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Energy,
    Uncertainty,
}

/// GBR-forest backed evaluator.
#[derive(Debug, Default)]
pub struct ElectronEnergyRegression {
    regression_type: RegressionType,
    model: Option<RegressionModel>,
}

impl ElectronEnergyRegression {
    /// Uninitialized evaluator; call [`initialize`](Self::initialize) before
    /// scoring.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>, ty: RegressionType) -> Result<Self> {
        let mut evaluator = Self::new();
        evaluator.initialize(path, ty)?;
        Ok(evaluator)
    }

    pub fn from_model(model: RegressionModel, ty: RegressionType) -> Result<Self> {
        model.validate(ty)?;
        Ok(Self {
            regression_type: ty,
            model: Some(model),
        })
    }

    pub fn initialize(&mut self, path: impl AsRef<Path>, ty: RegressionType) -> Result<()> {
        let path = path.as_ref();
        let model = RegressionModel::load(path)?;
        model.validate(ty)?;
        tracing::info!(path = %path.display(), regression_type = %ty, "loaded regression weights");
        self.regression_type = ty;
        self.model = Some(model);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.model.is_some()
    }

    pub fn regression_type(&self) -> RegressionType {
        self.regression_type
    }

    fn model(&self) -> &RegressionModel {
        match &self.model {
            Some(m) => m,
            None => panic!("electron energy regression used before initialization"),
        }
    }

    /// Input vector fed to the forests for this electron.
    pub fn input_variables(
        &self,
        electron: &Electron,
        f: &ShowerFeatures,
        rho: f64,
        vertex_count: u32,
    ) -> Vec<f64> {
        let ty = self.regression_type;
        let region = electron.region;
        let raw = f.sc_raw_energy;
        let e_seed = f.seed_energy;
        let mut x = Vec::with_capacity(ty.input_len(region));

        x.extend_from_slice(&[
            raw,
            f.sc_eta,
            f.sc_phi,
            f.r9,
            ratio(f.e5x5, raw),
            f.sc_eta_width,
            f.sc_phi_width,
            f.clusters_size as f64,
            f.h_over_e,
            rho,
            vertex_count as f64,
            f.seed_eta - f.sc_eta,
            wrap_phi(f.seed_phi - f.sc_phi),
            ratio(e_seed, raw),
            ratio(f.e3x3, e_seed),
            ratio(f.e5x5, e_seed),
            f.sigma_ieta_ieta,
            f.sigma_iphi_iphi,
            f.cov_ieta_iphi,
            ratio(f.e_max, e_seed),
            ratio(f.e_2nd, e_seed),
            ratio(f.e_top, e_seed),
            ratio(f.e_bottom, e_seed),
            ratio(f.e_left, e_seed),
            ratio(f.e_right, e_seed),
            ratio(f.e2x5_max, e_seed),
            ratio(f.e2x5_top, e_seed),
            ratio(f.e2x5_bottom, e_seed),
            ratio(f.e2x5_left, e_seed),
            ratio(f.e2x5_right, e_seed),
        ]);

        match region {
            Region::Barrel => {
                let ieta = f.ieta_seed;
                let iphi = f.iphi_seed;
                let module_ieta = if ieta.abs() <= 25 {
                    ieta % 25
                } else {
                    (ieta - 25 * ieta.signum()) % 20
                };
                x.extend_from_slice(&[
                    ieta as f64,
                    iphi as f64,
                    (ieta % 5) as f64,
                    (iphi % 2) as f64,
                    module_ieta as f64,
                    (iphi % 20) as f64,
                    f.eta_cry_seed,
                    f.phi_cry_seed,
                ]);
            }
            Region::Endcap => x.push(f.preshower_over_raw()),
        }

        match ty {
            RegressionType::NoTrkVar => {}
            RegressionType::WithSubCluVar => {
                x.push(if electron.ecal_driven { 1.0 } else { 0.0 });
                for sub in &f.sub_clusters {
                    x.push(ratio(sub.energy, raw));
                    if sub.energy > 0.0 {
                        x.push(sub.eta - f.sc_eta);
                        x.push(wrap_phi(sub.phi - f.sc_phi));
                    } else {
                        x.extend_from_slice(&[0.0, 0.0]);
                    }
                }
            }
            RegressionType::WithTrkVarV1 | RegressionType::WithTrkVarV2 => {
                let t = &electron.track;
                x.extend_from_slice(&[
                    electron.pt,
                    t.p_in,
                    t.fbrem,
                    electron.charge as f64,
                    t.e_super_cluster_over_p,
                    ratio(t.p_error, t.p_in),
                    ratio(t.ecal_energy_error, t.ecal_energy),
                    t.classification as f64,
                ]);
                if ty == RegressionType::WithTrkVarV2 {
                    x.extend_from_slice(&[
                        t.delta_eta_in,
                        t.delta_phi_in,
                        t.delta_eta_calo,
                        t.delta_phi_calo,
                        t.gsf_chi2,
                        t.kf_layers as f64,
                        t.e_ele_cluster_over_pout,
                    ]);
                }
            }
        }

        debug_assert_eq!(x.len(), ty.input_len(region));
        x
    }

    /// Energy scale the forest response multiplies.
    fn raw_scale(electron: &Electron, f: &ShowerFeatures) -> f64 {
        match electron.region {
            Region::Barrel => f.sc_raw_energy,
            Region::Endcap => f.sc_raw_energy * (1.0 + f.preshower_over_raw()),
        }
    }

    fn evaluate(
        &self,
        target: Target,
        electron: &Electron,
        features: &ShowerFeatures,
        rho: f64,
        vertex_count: u32,
        debug: bool,
    ) -> f64 {
        let model = self.model();
        let forest = match (electron.region, target) {
            (Region::Barrel, Target::Energy) => &model.eb_correction,
            (Region::Barrel, Target::Uncertainty) => &model.eb_uncertainty,
            (Region::Endcap, Target::Energy) => &model.ee_correction,
            (Region::Endcap, Target::Uncertainty) => &model.ee_uncertainty,
        };
        let x = self.input_variables(electron, features, rho, vertex_count);
        let response = forest.response(&x);
        let value = Self::raw_scale(electron, features) * response;
        if debug {
            tracing::info!(
                ?target,
                region = ?electron.region,
                regression_type = %self.regression_type,
                inputs = ?x,
                response,
                value,
                "regression evaluated"
            );
        }
        value
    }
}

impl RegressionEvaluator for ElectronEnergyRegression {
    fn energy(
        &self,
        electron: &Electron,
        features: &ShowerFeatures,
        rho: f64,
        vertex_count: u32,
        debug: bool,
    ) -> f64 {
        self.evaluate(Target::Energy, electron, features, rho, vertex_count, debug)
    }

    fn energy_uncertainty(
        &self,
        electron: &Electron,
        features: &ShowerFeatures,
        rho: f64,
        vertex_count: u32,
        debug: bool,
    ) -> f64 {
        self.evaluate(Target::Uncertainty, electron, features, rho, vertex_count, debug)
    }
}

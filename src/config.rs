use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::VertexQualityCuts;
use crate::error::{RegressionError, Result};
use crate::event::InputTag;
use crate::regression::RegressionType;

/// Producer parameters, read from a JSON file with camelCase keys.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProducerConfig {
    #[serde(default)]
    pub print_debug: bool,
    pub electron_tag: InputTag,
    #[serde(rename = "recHitCollectionEB")]
    pub rec_hit_collection_eb: InputTag,
    #[serde(rename = "recHitCollectionEE")]
    pub rec_hit_collection_ee: InputTag,
    pub regression_input_file: PathBuf,
    pub energy_regression_type: u32,
    pub name_energy_reg: String,
    pub name_energy_error_reg: String,

    #[serde(default = "default_module_label")]
    pub module_label: String,
    #[serde(default = "default_vertex_tag")]
    pub vertex_tag: InputTag,
    #[serde(default = "default_rho_tag")]
    pub rho_tag: InputTag,
    #[serde(default)]
    pub vertex_cuts: VertexQualityCuts,
}

fn default_module_label() -> String {
    "eleRegressionEnergy".to_string()
}

fn default_vertex_tag() -> InputTag {
    InputTag::label("offlinePrimaryVertices")
}

fn default_rho_tag() -> InputTag {
    InputTag::new("kt6PFJets", "rho")
}

impl ProducerConfig {
    /// Reads and validates a config file. A relative `regressionInputFile`
    /// is resolved against the config file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let mut cfg: ProducerConfig = serde_json::from_str(&data)?;
        if cfg.regression_input_file.is_relative() {
            if let Some(dir) = path.parent() {
                cfg.regression_input_file = dir.join(&cfg.regression_input_file);
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn regression_type(&self) -> Result<RegressionType> {
        RegressionType::try_from(self.energy_regression_type)
    }

    pub fn validate(&self) -> Result<()> {
        self.regression_type()?;
        if self.module_label.is_empty() {
            return Err(RegressionError::InvalidConfig("moduleLabel is empty".into()));
        }
        for (key, name) in [
            ("nameEnergyReg", &self.name_energy_reg),
            ("nameEnergyErrorReg", &self.name_energy_error_reg),
        ] {
            if name.is_empty() || name.contains(':') {
                return Err(RegressionError::InvalidConfig(format!(
                    "{key} must be a non-empty name without ':', got {name:?}"
                )));
            }
        }
        if self.name_energy_reg == self.name_energy_error_reg {
            return Err(RegressionError::InvalidConfig(format!(
                "nameEnergyReg and nameEnergyErrorReg are both {:?}",
                self.name_energy_reg
            )));
        }
        if self.rec_hit_collection_eb == self.rec_hit_collection_ee {
            tracing::warn!(
                tag = %self.rec_hit_collection_eb,
                "barrel and endcap rechits read from the same collection"
            );
        }
        Ok(())
    }

    pub fn energy_output_tag(&self) -> InputTag {
        InputTag::new(self.module_label.as_str(), self.name_energy_reg.as_str())
    }

    pub fn energy_error_output_tag(&self) -> InputTag {
        InputTag::new(self.module_label.as_str(), self.name_energy_error_reg.as_str())
    }
}

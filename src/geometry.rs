//! Ideal ECAL crystal geometry and neighbour navigation.
//!
//! Both are run-level conditions: they are built once and shared by every
//! event the producer sees.

use std::f64::consts::PI;

use crate::types::{CrystalId, Region};

/// Barrel crystal size in eta and phi.
pub const EB_CRYSTAL_SIZE: f64 = 0.01745;
/// Effective endcap crystal size in eta, used for shower-shape units.
pub const EE_CRYSTAL_SIZE: f64 = 0.0447;

const EB_MAX_IETA: i32 = 85;
const EB_MAX_IPHI: i32 = 360;
const EE_GRID: i32 = 100;
const EE_CENTER: f64 = 50.5;
/// Inner and outer radius of the endcap annulus, in crystal pitches.
const EE_INNER_R: f64 = 11.0;
const EE_OUTER_R: f64 = 50.5;

/// Crystal front-face centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrystalPosition {
    pub eta: f64,
    pub phi: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Returns whether `id` names a crystal that exists in the detector.
pub fn crystal_exists(id: CrystalId) -> bool {
    match id {
        CrystalId::Barrel { ieta, iphi } => {
            ieta != 0 && ieta.abs() <= EB_MAX_IETA && (1..=EB_MAX_IPHI).contains(&iphi)
        }
        CrystalId::Endcap { ix, iy, zside } => {
            if zside.abs() != 1 || !(1..=EE_GRID).contains(&ix) || !(1..=EE_GRID).contains(&iy) {
                return false;
            }
            let r = (ix as f64 - EE_CENTER).hypot(iy as f64 - EE_CENTER);
            (EE_INNER_R..=EE_OUTER_R).contains(&r)
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaloGeometry {
    eb_radius_cm: f64,
    ee_pitch_cm: f64,
    ee_z_cm: f64,
}

impl Default for CaloGeometry {
    fn default() -> Self {
        Self::ideal()
    }
}

impl CaloGeometry {
    pub fn ideal() -> Self {
        Self {
            eb_radius_cm: 129.0,
            ee_pitch_cm: 2.862,
            ee_z_cm: 315.4,
        }
    }

    pub fn crystal_size(&self, region: Region) -> f64 {
        match region {
            Region::Barrel => EB_CRYSTAL_SIZE,
            Region::Endcap => EE_CRYSTAL_SIZE,
        }
    }

    /// Front-face centre of a crystal, `None` for crystals outside the detector.
    pub fn position(&self, id: CrystalId) -> Option<CrystalPosition> {
        if !crystal_exists(id) {
            return None;
        }
        let pos = match id {
            CrystalId::Barrel { ieta, iphi } => {
                let eta = ieta.signum() as f64 * (ieta.abs() as f64 - 0.5) * EB_CRYSTAL_SIZE;
                let phi = wrap_phi((iphi as f64 - 0.5) * 2.0 * PI / EB_MAX_IPHI as f64);
                let z = self.eb_radius_cm * eta.sinh();
                CrystalPosition {
                    eta,
                    phi,
                    x: self.eb_radius_cm * phi.cos(),
                    y: self.eb_radius_cm * phi.sin(),
                    z,
                }
            }
            CrystalId::Endcap { ix, iy, zside } => {
                let x = (ix as f64 - EE_CENTER) * self.ee_pitch_cm;
                let y = (iy as f64 - EE_CENTER) * self.ee_pitch_cm;
                let z = zside as f64 * self.ee_z_cm;
                let theta = x.hypot(y).atan2(z.abs());
                let eta = -(theta / 2.0).tan().ln() * zside as f64;
                CrystalPosition {
                    eta,
                    phi: y.atan2(x),
                    x,
                    y,
                    z,
                }
            }
        };
        Some(pos)
    }
}

/// Wraps an angle into (-pi, pi].
pub fn wrap_phi(phi: f64) -> f64 {
    if phi > -PI && phi <= PI {
        return phi;
    }
    let p = (phi + PI).rem_euclid(2.0 * PI) - PI;
    if p == -PI {
        PI
    } else {
        p
    }
}

/// Crystal navigation in (eta, phi) index steps.
///
/// In the barrel `ieta` skips zero and stops at the detector edge while
/// `iphi` wraps around. In the endcap the steps move along `ix` and `iy` and
/// stop at crystals that do not exist.
#[derive(Debug, Clone, Default)]
pub struct CaloTopology;

impl CaloTopology {
    pub fn ideal() -> Self {
        Self
    }

    pub fn offset(&self, id: CrystalId, deta: i32, dphi: i32) -> Option<CrystalId> {
        if !crystal_exists(id) {
            return None;
        }
        let moved = match id {
            CrystalId::Barrel { ieta, iphi } => {
                // contiguous index: ieta -85..=-1 -> -85..=-1, 1..=85 -> 0..=84
                let k = if ieta > 0 { ieta - 1 } else { ieta } + deta;
                let ieta = if k >= 0 { k + 1 } else { k };
                let iphi = (iphi - 1 + dphi).rem_euclid(EB_MAX_IPHI) + 1;
                CrystalId::Barrel { ieta, iphi }
            }
            CrystalId::Endcap { ix, iy, zside } => CrystalId::Endcap {
                ix: ix + deta,
                iy: iy + dphi,
                zside,
            },
        };
        crystal_exists(moved).then_some(moved)
    }

    /// Crystals of the window `[-half_eta, half_eta] x [-half_phi, half_phi]`
    /// around `seed` with their offsets. Positions outside the detector are
    /// skipped.
    pub fn window(
        &self,
        seed: CrystalId,
        half_eta: i32,
        half_phi: i32,
    ) -> Vec<(i32, i32, CrystalId)> {
        let mut out = Vec::with_capacity(((2 * half_eta + 1) * (2 * half_phi + 1)) as usize);
        for deta in -half_eta..=half_eta {
            for dphi in -half_phi..=half_phi {
                if let Some(id) = self.offset(seed, deta, dphi) {
                    out.push((deta, dphi, id));
                }
            }
        }
        out
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{CrystalId, RecHit};

/// Calibrated ECAL hits of one partition, indexed by crystal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RecHit>", into = "Vec<RecHit>")]
pub struct RecHitCollection {
    hits: Vec<RecHit>,
    index: HashMap<CrystalId, usize>,
}

impl RecHitCollection {
    pub fn new(hits: Vec<RecHit>) -> Self {
        let mut index = HashMap::with_capacity(hits.len());
        for (i, hit) in hits.iter().enumerate() {
            // first hit wins on duplicated crystals
            index.entry(hit.id).or_insert(i);
        }
        Self { hits, index }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn find(&self, id: CrystalId) -> Option<&RecHit> {
        self.index.get(&id).map(|&i| &self.hits[i])
    }

    /// Energy of the crystal, 0 when it has no hit.
    pub fn energy(&self, id: CrystalId) -> f64 {
        self.find(id).map_or(0.0, |h| h.energy)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecHit> {
        self.hits.iter()
    }
}

impl From<Vec<RecHit>> for RecHitCollection {
    fn from(hits: Vec<RecHit>) -> Self {
        Self::new(hits)
    }
}

impl From<RecHitCollection> for Vec<RecHit> {
    fn from(c: RecHitCollection) -> Self {
        c.hits
    }
}

impl FromIterator<RecHit> for RecHitCollection {
    fn from_iter<I: IntoIterator<Item = RecHit>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

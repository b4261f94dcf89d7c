//! Gradient-boosted regression forest.
//!
//! Trees are stored as parallel arrays. Internal node `n` sends the input
//! right when `x[cut_indices[n]] > cut_values[n]` and left otherwise. A child
//! index `c > 0` is the next internal node, `c <= 0` is leaf `-c` in
//! `responses`. A tree without internal nodes answers `responses[0]`.

use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbrTree {
    #[serde(default)]
    pub cut_indices: Vec<usize>,
    #[serde(default)]
    pub cut_values: Vec<f64>,
    #[serde(default)]
    pub left_indices: Vec<i32>,
    #[serde(default)]
    pub right_indices: Vec<i32>,
    pub responses: Vec<f64>,
}

impl GbrTree {
    /// Single-leaf tree.
    pub fn constant(response: f64) -> Self {
        Self {
            cut_indices: Vec::new(),
            cut_values: Vec::new(),
            left_indices: Vec::new(),
            right_indices: Vec::new(),
            responses: vec![response],
        }
    }

    /// Depth-one tree on a single variable.
    pub fn stump(index: usize, cut: f64, below: f64, above: f64) -> Self {
        Self {
            cut_indices: vec![index],
            cut_values: vec![cut],
            left_indices: vec![0],
            right_indices: vec![-1],
            responses: vec![below, above],
        }
    }

    pub fn response(&self, x: &[f64]) -> f64 {
        if self.cut_indices.is_empty() {
            return self.responses[0];
        }
        let mut node = 0usize;
        loop {
            let next = if x[self.cut_indices[node]] > self.cut_values[node] {
                self.right_indices[node]
            } else {
                self.left_indices[node]
            };
            if next <= 0 {
                return self.responses[next.unsigned_abs() as usize];
            }
            node = next as usize;
        }
    }

    fn validate(&self, n_vars: usize) -> Result<()> {
        let invalid = |msg: String| Err(RegressionError::InvalidModel(msg));
        let n = self.cut_indices.len();
        if self.cut_values.len() != n || self.left_indices.len() != n || self.right_indices.len() != n {
            return invalid(format!(
                "node arrays disagree in length ({}, {}, {}, {})",
                n,
                self.cut_values.len(),
                self.left_indices.len(),
                self.right_indices.len()
            ));
        }
        if self.responses.is_empty() {
            return invalid("tree has no responses".into());
        }
        for node in 0..n {
            if self.cut_indices[node] >= n_vars {
                return invalid(format!(
                    "node {node} cuts on variable {} but the input has {n_vars}",
                    self.cut_indices[node]
                ));
            }
            for child in [self.left_indices[node], self.right_indices[node]] {
                if child > 0 {
                    let child = child as usize;
                    // children must point forward so traversal terminates
                    if child <= node || child >= n {
                        return invalid(format!("node {node} has invalid child {child}"));
                    }
                } else if child.unsigned_abs() as usize >= self.responses.len() {
                    return invalid(format!(
                        "node {node} points at missing leaf {}",
                        child.unsigned_abs()
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbrForest {
    #[serde(default)]
    pub initial_response: f64,
    pub trees: Vec<GbrTree>,
}

impl GbrForest {
    pub fn new(initial_response: f64, trees: Vec<GbrTree>) -> Self {
        Self {
            initial_response,
            trees,
        }
    }

    pub fn response(&self, x: &[f64]) -> f64 {
        self.initial_response + self.trees.iter().map(|t| t.response(x)).sum::<f64>()
    }

    /// Checks every tree against an input vector of `n_vars` variables.
    pub fn validate(&self, n_vars: usize) -> Result<()> {
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(n_vars).map_err(|e| match e {
                RegressionError::InvalidModel(msg) => {
                    RegressionError::InvalidModel(format!("tree {i}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

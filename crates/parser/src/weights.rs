//! Sparse linear model over discrete feature keys.
//!
//! A feature key pairs the symbols extracted from a configuration with the
//! label of a candidate action. The weight vector supports the three
//! operations the learner needs: dot product against a feature multiset,
//! element-wise add/subtract, and scalar multiply. One vector lives per
//! trained model, persists across epochs, and round-trips through serde so a
//! trained parser can be saved and reloaded.

use std::collections::HashMap;
use std::ops::{AddAssign, MulAssign, SubAssign};

use serde::{Deserialize, Serialize};

/// Join the configuration symbols with an action label into feature keys.
fn feature_key(symbol: &str, label: &str) -> String {
    format!("{symbol}::{label}")
}

/// A sparse feature-key to weight map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseWeightVector {
    weights: HashMap<String, f64>,
}

impl SparseWeightVector {
    /// An empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-zero features.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True when no feature has been touched.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// The weight of one feature key, zero when absent.
    pub fn get(&self, key: &str) -> f64 {
        self.weights.get(key).copied().unwrap_or(0.0)
    }

    /// Dot product against the feature multiset formed by pairing each
    /// symbol with the action label.
    pub fn dot(&self, symbols: &[String], label: &str) -> f64 {
        symbols
            .iter()
            .map(|symbol| self.get(&feature_key(symbol, label)))
            .sum()
    }

    /// Code a `(symbols, label)` observation into a feature vector, one
    /// count per occurrence.
    pub fn code_phi(symbols: &[String], label: &str) -> Self {
        let mut phi = Self::new();
        for symbol in symbols {
            *phi.weights.entry(feature_key(symbol, label)).or_insert(0.0) += 1.0;
        }
        phi
    }

    /// Accumulate another observation into this vector.
    pub fn accumulate(&mut self, symbols: &[String], label: &str) {
        for symbol in symbols {
            *self.weights.entry(feature_key(symbol, label)).or_insert(0.0) += 1.0;
        }
    }
}

impl AddAssign<&SparseWeightVector> for SparseWeightVector {
    fn add_assign(&mut self, other: &SparseWeightVector) {
        for (key, value) in &other.weights {
            *self.weights.entry(key.clone()).or_insert(0.0) += value;
        }
    }
}

impl SubAssign<&SparseWeightVector> for SparseWeightVector {
    fn sub_assign(&mut self, other: &SparseWeightVector) {
        for (key, value) in &other.weights {
            *self.weights.entry(key.clone()).or_insert(0.0) -= value;
        }
    }
}

impl MulAssign<f64> for SparseWeightVector {
    fn mul_assign(&mut self, factor: f64) {
        for value in self.weights.values_mut() {
            *value *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dot_over_multiset() {
        let mut w = SparseWeightVector::new();
        w += &SparseWeightVector::code_phi(&symbols(&["S|a|b", "B|c"]), "S");

        assert!((w.dot(&symbols(&["S|a|b", "B|c"]), "S") - 2.0).abs() < 1e-10);
        assert!((w.dot(&symbols(&["S|a|b"]), "S") - 1.0).abs() < 1e-10);
        // a different label addresses different features
        assert!(w.dot(&symbols(&["S|a|b", "B|c"]), "D").abs() < 1e-10);
    }

    #[test]
    fn test_code_phi_counts_duplicates() {
        let phi = SparseWeightVector::code_phi(&symbols(&["x", "x", "y"]), "A");
        assert!((phi.get("x::A") - 2.0).abs() < 1e-10);
        assert!((phi.get("y::A") - 1.0).abs() < 1e-10);
        assert_eq!(phi.len(), 2);
    }

    #[test]
    fn test_arithmetic() {
        let mut grad = SparseWeightVector::code_phi(&symbols(&["x", "y"]), "A");
        let neg = SparseWeightVector::code_phi(&symbols(&["y"]), "A");
        grad -= &neg;
        grad *= 0.5;

        assert!((grad.get("x::A") - 0.5).abs() < 1e-10);
        assert!(grad.get("y::A").abs() < 1e-10);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut w = SparseWeightVector::new();
        w += &SparseWeightVector::code_phi(&symbols(&["S|a|b"]), "U[SWAP]");
        let encoded = serde_json::to_string(&w).unwrap();
        let decoded: SparseWeightVector = serde_json::from_str(&encoded).unwrap();
        assert_eq!(w, decoded);
    }
}

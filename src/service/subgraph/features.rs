//! Feature sources supplying node vectors at graph-construction time
//!
//! The core treats vectors as opaque fixed-length arrays; only the scorer's
//! model artifact gives the dimensions meaning.

use crate::model::{EntityKind, NodeRecord};

/// Length of vectors produced by [`ProfileFeatures`]
pub const PROFILE_FEATURE_DIM: usize = 6;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FeatureError {
    #[error("No feature vector for node {0}")]
    Missing(String),
}

/// Supplies each node's feature vector
pub trait FeatureSource: Send + Sync {
    fn features_for(&self, node: &NodeRecord) -> Result<Vec<f64>, FeatureError>;
}

/// Uses vectors precomputed by the graph store
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreFeatures;

impl FeatureSource for StoreFeatures {
    fn features_for(&self, node: &NodeRecord) -> Result<Vec<f64>, FeatureError> {
        node.features
            .clone()
            .ok_or_else(|| FeatureError::Missing(node.id.clone()))
    }
}

/// Derives a vector from the node's flag and kind
///
/// Layout: `[flagged, claim, person, shop, doctor, unknown]`, the last five
/// being a one-hot encoding of the entity kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileFeatures;

impl FeatureSource for ProfileFeatures {
    fn features_for(&self, node: &NodeRecord) -> Result<Vec<f64>, FeatureError> {
        let mut vector = vec![0.0; PROFILE_FEATURE_DIM];
        if node.flagged {
            vector[0] = 1.0;
        }
        let slot = match node.kind {
            EntityKind::Claim => 1,
            EntityKind::Person => 2,
            EntityKind::Shop => 3,
            EntityKind::Doctor => 4,
            EntityKind::Unknown => 5,
        };
        vector[slot] = 1.0;
        Ok(vector)
    }
}

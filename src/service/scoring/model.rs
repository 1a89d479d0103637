//! GraphSAGE-style model used for risk inference
//!
//! Each layer updates a node as
//! `relu(W_self · h(v) + W_neigh · mean(h(u) for u in N(v)) + b)`.
//! A linear classifier maps the claim node's final representation to
//! `[legitimate, fraudulent]` logits and a softmax gives the fraud probability.
//! Weights are supplied as a JSON artifact; nothing here trains them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ModelError;
use crate::model::EntityGraph;
use crate::service::subgraph::features::PROFILE_FEATURE_DIM;

/// Index of the fraudulent class in the classifier output
const FRAUD_CLASS: usize = 1;
const CLASS_COUNT: usize = 2;

/// One neighbourhood-aggregation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SageLayer {
    /// `output_dim × input_dim`
    pub self_weight: Vec<Vec<f64>>,
    /// `output_dim × input_dim`
    pub neighbor_weight: Vec<Vec<f64>>,
    /// `output_dim`
    pub bias: Vec<f64>,
}

impl SageLayer {
    pub fn input_dim(&self) -> usize {
        self.self_weight.first().map(Vec::len).unwrap_or(0)
    }

    pub fn output_dim(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, own: &[f64], neighbor_mean: &[f64]) -> Vec<f64> {
        self.bias
            .iter()
            .enumerate()
            .map(|(row, bias)| {
                let value = dot(&self.self_weight[row], own)
                    + dot(&self.neighbor_weight[row], neighbor_mean)
                    + bias;
                value.max(0.0)
            })
            .collect()
    }

    fn validate(&self, index: usize, expected_input: Option<usize>) -> Result<(), ModelError> {
        let rows = self.output_dim();
        let cols = self.input_dim();
        if rows == 0 || cols == 0 {
            return Err(ModelError::InvalidShape(format!("layer {} is empty", index)));
        }
        if self.self_weight.len() != rows || self.neighbor_weight.len() != rows {
            return Err(ModelError::InvalidShape(format!(
                "layer {} has {} bias entries but {}/{} weight rows",
                index,
                rows,
                self.self_weight.len(),
                self.neighbor_weight.len()
            )));
        }
        let ragged = self
            .self_weight
            .iter()
            .chain(self.neighbor_weight.iter())
            .any(|r| r.len() != cols);
        if ragged {
            return Err(ModelError::InvalidShape(format!(
                "layer {} has rows of differing width",
                index
            )));
        }
        if let Some(expected) = expected_input
            && expected != cols
        {
            return Err(ModelError::InvalidShape(format!(
                "layer {} expects {} inputs but previous layer produces {}",
                index, cols, expected
            )));
        }
        Ok(())
    }
}

/// Final linear layer producing class logits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    /// `2 × hidden_dim`
    pub weight: Vec<Vec<f64>>,
    /// `2`
    pub bias: Vec<f64>,
}

/// Pretrained two-hop scoring model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SageModel {
    layers: Vec<SageLayer>,
    classifier: Classifier,
}

impl SageModel {
    pub fn new(layers: Vec<SageLayer>, classifier: Classifier) -> Result<Self, ModelError> {
        let model = Self { layers, classifier };
        model.validate()?;
        Ok(model)
    }

    /// Reference weights for the
    /// [`ProfileFeatures`](crate::service::subgraph::ProfileFeatures) layout
    ///
    /// A single hidden unit carries the "flagged" signal: the first layer lets
    /// it spread one hop, the second layer a further hop, so the claim node
    /// only lights up when a flagged entity sits within two hops.
    pub fn reference() -> Self {
        let mut flag_row = vec![0.0; PROFILE_FEATURE_DIM];
        flag_row[0] = 1.0;

        Self {
            layers: vec![
                SageLayer {
                    self_weight: vec![flag_row.clone()],
                    neighbor_weight: vec![flag_row],
                    bias: vec![0.0],
                },
                SageLayer {
                    self_weight: vec![vec![1.0]],
                    neighbor_weight: vec![vec![1.0]],
                    bias: vec![0.0],
                },
            ],
            classifier: Classifier {
                weight: vec![vec![0.0], vec![24.0]],
                bias: vec![0.0, -2.0],
            },
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: SageModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let contents = fs::read_to_string(path)?;
        let model = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            depth = model.depth(),
            input_dim = model.input_dim(),
            "Loaded risk model artifact"
        );
        Ok(model)
    }

    /// Feature vector length the model expects
    pub fn input_dim(&self) -> usize {
        self.layers.first().map(SageLayer::input_dim).unwrap_or(0)
    }

    /// Number of aggregation layers, i.e. hops of influence
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Final representation of every node after all aggregation layers
    ///
    /// Neighbours are visited in id order, so the floating point sums (and the
    /// result) do not depend on how the graph was assembled.
    pub fn embed<'g>(&self, graph: &'g EntityGraph) -> BTreeMap<&'g str, Vec<f64>> {
        let mut representations: BTreeMap<&str, Vec<f64>> = graph
            .nodes()
            .map(|n| (n.id.as_str(), n.features.clone()))
            .collect();

        for layer in &self.layers {
            let width = layer.input_dim();
            let next: BTreeMap<&str, Vec<f64>> = representations
                .iter()
                .map(|(id, own)| {
                    let mean = neighbor_mean(graph, id, &representations, width);
                    (*id, layer.forward(own, &mean))
                })
                .collect();
            representations = next;
        }

        representations
    }

    /// Softmax probability of the fraudulent class for a final representation
    ///
    /// `None` when the representation or a logit is not finite, which happens
    /// once large inputs overflow during aggregation.
    pub fn fraud_probability(&self, representation: &[f64]) -> Option<f64> {
        if representation.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let logits: Vec<f64> = self
            .classifier
            .weight
            .iter()
            .zip(&self.classifier.bias)
            .map(|(row, bias)| dot(row, representation) + bias)
            .collect();
        if logits.iter().any(|l| !l.is_finite()) {
            return None;
        }

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        Some((exps[FRAUD_CLASS] / total).clamp(0.0, 1.0))
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidShape("model has no layers".to_string()));
        }

        let mut previous_output = None;
        for (index, layer) in self.layers.iter().enumerate() {
            layer.validate(index, previous_output)?;
            previous_output = Some(layer.output_dim());
        }
        let hidden = previous_output.unwrap_or(0);

        let classifier = &self.classifier;
        if classifier.weight.len() != CLASS_COUNT || classifier.bias.len() != CLASS_COUNT {
            return Err(ModelError::InvalidShape(format!(
                "classifier must produce {} logits",
                CLASS_COUNT
            )));
        }
        if classifier.weight.iter().any(|r| r.len() != hidden) {
            return Err(ModelError::InvalidShape(format!(
                "classifier rows must have width {}",
                hidden
            )));
        }

        let all_finite = self
            .layers
            .iter()
            .flat_map(|l| {
                l.self_weight
                    .iter()
                    .chain(l.neighbor_weight.iter())
                    .flatten()
                    .chain(l.bias.iter())
            })
            .chain(classifier.weight.iter().flatten())
            .chain(classifier.bias.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::InvalidShape(
                "model contains non-finite weights".to_string(),
            ));
        }

        Ok(())
    }
}

fn dot(weights: &[f64], values: &[f64]) -> f64 {
    weights.iter().zip(values).map(|(w, v)| w * v).sum()
}

/// Mean of the neighbours' current representations; zeros for an isolated node
fn neighbor_mean(
    graph: &EntityGraph,
    id: &str,
    representations: &BTreeMap<&str, Vec<f64>>,
    width: usize,
) -> Vec<f64> {
    let mut sum = vec![0.0; width];
    let mut count = 0usize;

    for neighbor in graph.neighbors(id) {
        if let Some(rep) = representations.get(neighbor) {
            for (acc, value) in sum.iter_mut().zip(rep) {
                *acc += value;
            }
            count += 1;
        }
    }

    if count > 0 {
        let n = count as f64;
        sum.iter_mut().for_each(|v| *v /= n);
    }
    sum
}

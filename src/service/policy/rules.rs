//! Sources of the trigger-to-clause rule table

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use super::error::PolicyError;
use crate::model::{ClauseKind, PolicyRule};

/// Supplies the ordered rule table; earlier rows take priority
#[async_trait]
pub trait PolicyRuleSource: Send + Sync {
    async fn load_rules(&self) -> Result<Vec<PolicyRule>, PolicyError>;
}

/// Rule table compiled into the binary
#[derive(Debug, Clone)]
pub struct BuiltinPolicyRules {
    rules: Vec<PolicyRule>,
}

impl Default for BuiltinPolicyRules {
    fn default() -> Self {
        let unregistered_commercial = "Coverage VOID for unregistered commercial use.";
        let collision = "Collision coverage applies.";
        Self {
            rules: vec![
                PolicyRule::new(
                    "commercial",
                    "2.1",
                    unregistered_commercial,
                    ClauseKind::Exclusion,
                ),
                PolicyRule::new(
                    "delivery",
                    "2.1",
                    unregistered_commercial,
                    ClauseKind::Exclusion,
                ),
                PolicyRule::new("collision", "1.1", collision, ClauseKind::Coverage),
                PolicyRule::new("bumper", "1.1", collision, ClauseKind::Coverage),
            ],
        }
    }
}

impl BuiltinPolicyRules {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl PolicyRuleSource for BuiltinPolicyRules {
    async fn load_rules(&self) -> Result<Vec<PolicyRule>, PolicyError> {
        Ok(self.rules.clone())
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<RuleRow>,
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    trigger: String,
    clause_id: String,
    text: String,
    kind: ClauseKind,
}

/// Rule table read from a YAML file on every retrieval
///
/// ```yaml
/// rules:
///   - trigger: commercial
///     clause_id: "2.1"
///     text: Coverage VOID for unregistered commercial use.
///     kind: exclusion
/// ```
#[derive(Debug, Clone)]
pub struct YamlPolicyRules {
    path: PathBuf,
}

impl YamlPolicyRules {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a rule table from YAML text
    pub fn parse(contents: &str) -> Result<Vec<PolicyRule>, PolicyError> {
        let file: RuleFile = serde_yaml::from_str(contents).map_err(|e| {
            PolicyError::PolicySourceUnavailable(format!("invalid rule table: {}", e))
        })?;

        file.rules
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                if row.trigger.trim().is_empty() {
                    return Err(PolicyError::PolicySourceUnavailable(format!(
                        "rule {} has an empty trigger",
                        index
                    )));
                }
                Ok(PolicyRule::new(
                    row.trigger.trim(),
                    &row.clause_id,
                    &row.text,
                    row.kind,
                ))
            })
            .collect()
    }
}

#[async_trait]
impl PolicyRuleSource for YamlPolicyRules {
    async fn load_rules(&self) -> Result<Vec<PolicyRule>, PolicyError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to read policy rules");
            PolicyError::PolicySourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        Self::parse(&contents)
    }
}

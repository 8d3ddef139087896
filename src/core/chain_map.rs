use crate::error::{ContactError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Assignment of chain letters to logical group labels.
///
/// Contacts are only computed between different groups, so chains sharing a
/// label are treated as one body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainGroupMap {
    groups: BTreeMap<String, String>,
}

impl ChainGroupMap {
    /// Parses the flat key-value form, e.g. `{"A": "h1", "B": "h1", "C": "h2"}`.
    pub fn parse(text: &str) -> Result<Self> {
        let groups: BTreeMap<String, String> =
            serde_json::from_str(text).map_err(|e| ContactError::ChainMap(e.to_string()))?;

        if let Some((chain, _)) = groups.iter().find(|(_, label)| label.trim().is_empty()) {
            return Err(ContactError::ChainMap(format!(
                "chain '{}' has an empty group label",
                chain
            )));
        }
        Ok(Self { groups })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ContactError::io(path, e))?;
        Self::parse(&text)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            groups: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Group label of a chain, if it was assigned one.
    pub fn group_of(&self, chain: &str) -> Option<&str> {
        self.groups.get(chain).map(String::as_str)
    }

    /// Distinct group labels in sorted order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.groups.values().map(String::as_str).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    /// Chains assigned to `label`, sorted.
    pub fn chains_of(&self, label: &str) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|(_, l)| l.as_str() == label)
            .map(|(c, _)| c.as_str())
            .collect()
    }

    /// Chains assigned to any label other than `label`, sorted.
    pub fn chains_outside(&self, label: &str) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|(_, l)| l.as_str() != label)
            .map(|(c, _)| c.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

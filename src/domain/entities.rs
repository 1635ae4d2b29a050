//! Domain entities: weight configuration and structured tree output

use generational_arena::Index;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping from category name to its weight settings.
///
/// Iteration order is document order and defines both the child order in the
/// allocation tree and the leaf walk order of a session.
pub type WeightConfig = IndexMap<String, CategoryConfig>;

/// Weight settings of a single category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryConfig {
    /// Relative weight among siblings (missing weight counts as 0)
    #[serde(default)]
    pub weight: f64,
    /// Sub-categories; `None` marks a leaf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<WeightConfig>,
}

impl CategoryConfig {
    pub fn leaf(weight: f64) -> Self {
        Self {
            weight,
            children: None,
        }
    }

    pub fn group(weight: f64, children: WeightConfig) -> Self {
        Self {
            weight,
            children: Some(children),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// One node of the tree flattened for display, emitted in pre-order.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLine {
    pub index: Index,
    pub name: String,
    /// Distance from the root (root = 0)
    pub depth: usize,
    pub invested: f64,
    pub recommended: f64,
    pub is_leaf: bool,
}

/// Planned vs. invested totals at the root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub planned: f64,
    pub invested: f64,
}

impl Summary {
    pub fn remaining(&self) -> f64 {
        self.planned - self.invested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_json_with_children_when_deserializing_then_preserves_order() {
        let json = r#"{
            "Stocks": {"weight": 0.6, "children": {"Tech": {"weight": 2}, "Energy": {"weight": 1}}},
            "Bonds": {"weight": 0.4}
        }"#;
        let config: WeightConfig = serde_json::from_str(json).unwrap();

        let names: Vec<_> = config.keys().cloned().collect();
        assert_eq!(names, vec!["Stocks", "Bonds"]);
        let stocks = &config["Stocks"];
        assert!(!stocks.is_leaf());
        let children: Vec<_> = stocks.children.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(children, vec!["Tech", "Energy"]);
        assert!(config["Bonds"].is_leaf());
    }

    #[test]
    fn given_missing_weight_when_deserializing_then_defaults_to_zero() {
        let config: WeightConfig = serde_json::from_str(r#"{"Cash": {}}"#).unwrap();
        assert_eq!(config["Cash"].weight, 0.0);
    }

    #[test]
    fn given_summary_when_remaining_then_is_difference() {
        let summary = Summary {
            planned: 1000.0,
            invested: 700.0,
        };
        assert_eq!(summary.remaining(), 300.0);
    }
}

//! Tree builder: top-down weighted allocation of a total amount.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use crate::domain::arena::AllocationTree;
use crate::domain::entities::{CategoryConfig, WeightConfig};
use crate::domain::error::{DomainError, DomainResult};
use generational_arena::Index;

/// Default name of the root node (the grand total).
pub const DEFAULT_ROOT_NAME: &str = "Total Investment";

/// Tolerance for the forced last top-level weight dropping below zero.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Constructs allocation trees from a weight configuration.
///
/// Top-level categories are special: all but the last take an externally
/// solicited weight (falling back to the configured one), and the last is
/// forced to `1 - sum(previous)`. Deeper levels use configured weights as-is,
/// normalized by their actual sum.
#[derive(Debug, Clone)]
pub struct TreeBuilder<'a> {
    config: &'a WeightConfig,
    root_name: String,
    overrides: HashMap<String, f64>,
    strict: bool,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(config: &'a WeightConfig) -> Self {
        Self {
            config,
            root_name: DEFAULT_ROOT_NAME.to_string(),
            overrides: HashMap::new(),
            strict: false,
        }
    }

    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Externally solicited weight for a top-level category.
    pub fn with_top_level_weight(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.overrides.insert(name.into(), weight);
        self
    }

    /// Fail on zero-weight sibling groups instead of allocating 0 to each.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Top-level categories whose weight is solicited, with configured defaults.
    ///
    /// The last category is excluded when there is more than one: its weight
    /// is derived.
    pub fn top_level_defaults(&self) -> Vec<(String, f64)> {
        let solicited = match self.config.len() {
            0 | 1 => self.config.len(),
            n => n - 1,
        };
        self.config
            .iter()
            .take(solicited)
            .map(|(name, conf)| (name.clone(), conf.weight))
            .collect()
    }

    /// Effective top-level weights in configuration order.
    pub fn top_level_weights(&self) -> DomainResult<Vec<(String, f64)>> {
        if let Some(unknown) = self
            .overrides
            .keys()
            .find(|name| !self.config.contains_key(name.as_str()))
        {
            return Err(DomainError::UnknownCategory(unknown.clone()));
        }

        let count = self.config.len();
        let mut weights = Vec::with_capacity(count);
        let mut solicited_sum = 0.0;

        for (i, (name, conf)) in self.config.iter().enumerate() {
            if count > 1 && i == count - 1 {
                let forced = 1.0 - solicited_sum;
                if forced < -WEIGHT_EPSILON {
                    return Err(DomainError::TopLevelWeightsExceedOne {
                        sum: solicited_sum,
                        last: name.clone(),
                    });
                }
                if self.overrides.contains_key(name) {
                    warn!("weight for {} is derived, ignoring override", name);
                }
                weights.push((name.clone(), forced.max(0.0)));
            } else {
                let weight = self.overrides.get(name).copied().unwrap_or(conf.weight);
                validate_weight(name, weight)?;
                solicited_sum += weight;
                weights.push((name.clone(), weight));
            }
        }
        Ok(weights)
    }

    /// Build the allocation tree for `total`.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self, total: f64) -> DomainResult<AllocationTree> {
        if !total.is_finite() || total < 0.0 {
            return Err(DomainError::InvalidAmount(total));
        }
        if self.config.is_empty() {
            return Err(DomainError::EmptyConfig);
        }
        if let Some(clash) = find_name(self.config, &self.root_name) {
            return Err(DomainError::RootNameClash(clash));
        }

        let top_level = self.top_level_weights()?;
        debug!("top-level weights: {:?}", top_level);

        let mut tree = AllocationTree::new();
        let root = tree.insert_node(&self.root_name, total, None);

        let entries = top_level
            .iter()
            .zip(self.config.values())
            .map(|((name, weight), conf)| (name.as_str(), *weight, conf))
            .collect::<Vec<_>>();
        self.distribute(&mut tree, root, &self.root_name, total, &entries)?;

        Ok(tree)
    }

    fn distribute(
        &self,
        tree: &mut AllocationTree,
        parent: Index,
        parent_name: &str,
        amount: f64,
        entries: &[(&str, f64, &CategoryConfig)],
    ) -> DomainResult<()> {
        let total_weight: f64 = entries.iter().map(|(_, weight, _)| weight).sum();
        if total_weight <= 0.0 && !entries.is_empty() {
            if self.strict {
                return Err(DomainError::ZeroWeightGroup {
                    parent: parent_name.to_string(),
                });
            }
            warn!(
                "all categories under {} have zero weight, allocating 0",
                parent_name
            );
        }

        for &(name, weight, conf) in entries {
            let share = if total_weight > 0.0 {
                amount * (weight / total_weight)
            } else {
                0.0
            };
            let idx = tree.insert_node(name, share, Some(parent));

            if let Some(children) = &conf.children {
                let child_entries = children
                    .iter()
                    .map(|(child_name, child_conf)| {
                        validate_weight(child_name, child_conf.weight)
                            .map(|_| (child_name.as_str(), child_conf.weight, child_conf))
                    })
                    .collect::<DomainResult<Vec<_>>>()?;
                self.distribute(tree, idx, name, share, &child_entries)?;
            }
        }
        Ok(())
    }
}

fn validate_weight(name: &str, weight: f64) -> DomainResult<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(DomainError::InvalidWeight {
            name: name.to_string(),
            weight,
        })
    }
}

fn find_name(config: &WeightConfig, name: &str) -> Option<String> {
    config.iter().find_map(|(key, conf)| {
        if key == name {
            Some(key.clone())
        } else {
            conf.children
                .as_ref()
                .and_then(|children| find_name(children, name))
        }
    })
}

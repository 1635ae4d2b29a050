//! Arena-based allocation tree and its propagation algorithms.

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::entities::{DisplayLine, Summary};
use crate::domain::error::{DomainError, DomainResult};

/// Path separator used by [`AllocationTree::find`] and [`AllocationTree::path_of`].
pub const PATH_SEPARATOR: &str = "/";

/// Budget category in the arena-based hierarchy.
#[derive(Debug, Clone)]
pub struct BudgetNode {
    pub name: String,
    /// Share assigned at construction, weight basis for redistribution
    pub original_recommended: f64,
    /// Current recommendation, recomputed when the parent budget is re-split
    pub recommended: f64,
    /// Leaves: user supplied. Internal nodes: sum over children
    pub invested: f64,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in configuration order
    pub children: Vec<Index>,
}

impl BudgetNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_invested(&self) -> bool {
        self.invested != 0.0
    }

    /// More invested than currently recommended.
    pub fn is_overspent(&self) -> bool {
        self.invested > self.recommended
    }
}

/// Allocation tree: one root (the grand total) over weighted categories.
///
/// Nodes are never added or removed once the tree is built; only `invested`
/// and `recommended` change, through [`AllocationTree::set_invested`].
#[derive(Debug, Clone)]
pub struct AllocationTree {
    arena: Arena<BudgetNode>,
    root: Option<Index>,
}

impl Default for AllocationTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocationTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert a node whose recommended and original recommended amounts are `amount`.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, name: &str, amount: f64, parent: Option<Index>) -> Index {
        let node = BudgetNode {
            name: name.to_string(),
            original_recommended: amount,
            recommended: amount,
            invested: 0.0,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&BudgetNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal yielding `(index, depth, node)`.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn depth(&self) -> usize {
        self.iter().map(|(_, depth, _)| depth + 1).max().unwrap_or(0)
    }

    /// Leaves in depth-first, configuration order.
    pub fn leaves(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, _, node)| node.is_leaf())
            .map(|(idx, _, _)| idx)
            .collect()
    }

    /// Slash separated category path of a node, root excluded.
    pub fn path_of(&self, idx: Index) -> Option<String> {
        let mut names = Vec::new();
        let mut current = Some(idx);
        while let Some(node_idx) = current {
            let node = self.get_node(node_idx)?;
            if node.parent.is_some() {
                names.push(node.name.as_str());
            }
            current = node.parent;
        }
        Some(names.iter().rev().join(PATH_SEPARATOR))
    }

    /// Resolve a slash separated category path (root excluded) to a node.
    pub fn find(&self, path: &str) -> Option<Index> {
        let mut current = self.root?;
        for segment in path.split(PATH_SEPARATOR).filter(|s| !s.is_empty()) {
            let node = self.get_node(current)?;
            current = node
                .children
                .iter()
                .copied()
                .find(|&c| self.get_node(c).is_some_and(|n| n.name == segment))?;
        }
        Some(current)
    }

    /// Structured tree state for renderers.
    pub fn lines(&self) -> Vec<DisplayLine> {
        self.iter()
            .map(|(index, depth, node)| DisplayLine {
                index,
                name: node.name.clone(),
                depth,
                invested: node.invested,
                recommended: node.recommended,
                is_leaf: node.is_leaf(),
            })
            .collect()
    }

    pub fn summary(&self) -> Summary {
        self.root
            .and_then(|idx| self.get_node(idx))
            .map(|root| Summary {
                planned: root.recommended,
                invested: root.invested,
            })
            .unwrap_or(Summary {
                planned: 0.0,
                invested: 0.0,
            })
    }

    /// Record the actual amount invested in a leaf and propagate it.
    #[instrument(level = "debug", skip(self))]
    pub fn set_invested(&mut self, leaf: Index, value: f64) -> DomainResult<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::InvalidAmount(value));
        }
        let node = self.arena.get_mut(leaf).ok_or(DomainError::NodeNotFound)?;
        if !node.is_leaf() {
            return Err(DomainError::NotALeaf(node.name.clone()));
        }
        debug!("set_invested: {} = {}", node.name, value);
        node.invested = value;
        self.update_upwards(leaf);
        Ok(())
    }

    /// Aggregate `invested` from `idx` up to the root, re-splitting the
    /// un-invested children of every ancestor on the way.
    #[instrument(level = "trace", skip(self))]
    pub fn update_upwards(&mut self, idx: Index) {
        let mut current = self.arena.get(idx).and_then(|n| n.parent);
        while let Some(parent_idx) = current {
            let invested = self.children_invested(parent_idx);
            match self.arena.get_mut(parent_idx) {
                Some(parent) => {
                    parent.invested = invested;
                    current = parent.parent;
                }
                None => break,
            }
            self.update_children_recommended(parent_idx);
        }
    }

    /// Redistribute what is left of `idx`'s recommendation among its
    /// un-invested children, proportionally to their original share, and
    /// recurse into the whole subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn update_children_recommended(&mut self, idx: Index) {
        let Some(node) = self.arena.get(idx) else {
            return;
        };
        if node.is_leaf() {
            return;
        }
        let budget = node.recommended;
        let children = node.children.clone();

        let available = (budget - self.children_invested(idx)).max(0.0);
        let pool_weight: f64 = children
            .iter()
            .filter_map(|&c| self.arena.get(c))
            .filter(|c| !c.is_invested())
            .map(|c| c.original_recommended)
            .sum();

        for &child_idx in &children {
            if let Some(child) = self.arena.get_mut(child_idx) {
                if !child.is_invested() {
                    child.recommended = if pool_weight > 0.0 {
                        child.original_recommended / pool_weight * available
                    } else {
                        0.0
                    };
                }
            }
            self.update_children_recommended(child_idx);
        }
    }

    fn children_invested(&self, idx: Index) -> f64 {
        self.arena
            .get(idx)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&c| self.arena.get(c))
                    .map(|c| c.invested)
                    .sum()
            })
            .unwrap_or(0.0)
    }
}

pub struct TreeIterator<'a> {
    tree: &'a AllocationTree,
    stack: Vec<(Index, usize)>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a AllocationTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, 0));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, usize, &'a BudgetNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, depth)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some((current_idx, depth, node));
            }
        }
        None
    }
}

//! Tree rendering for the terminal.

use colored::Colorize;
use generational_arena::Index;
use termtree::Tree;

use crate::application::AmountStyle;
use crate::cli::output;
use crate::domain::{AllocationTree, BudgetNode, Summary};
use crate::infrastructure::traits::SessionView;

pub trait TreeNodeConvert {
    fn to_tree_string(&self, style: &AmountStyle) -> Tree<String>;
}

/// `name: invested X (recommended Y)`, green once a leaf is invested, red when overspent.
pub fn node_label(node: &BudgetNode, style: &AmountStyle) -> String {
    let name = if node.parent.is_none() {
        node.name.bold().to_string()
    } else {
        node.name.clone()
    };
    let invested = format!("invested {}", style.format(node.invested));
    let invested = if node.is_overspent() {
        invested.red().to_string()
    } else if node.is_leaf() && node.is_invested() {
        invested.green().to_string()
    } else {
        invested
    };
    let recommended = format!("(recommended {})", style.format(node.recommended));
    format!("{}: {} {}", name, invested, recommended.dimmed())
}

impl TreeNodeConvert for AllocationTree {
    fn to_tree_string(&self, style: &AmountStyle) -> Tree<String> {
        fn build_tree(
            arena: &AllocationTree,
            node_idx: Index,
            style: &AmountStyle,
            parent_tree: &mut Tree<String>,
        ) {
            if let Some(node) = arena.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = arena.get_node(child_idx) {
                        let mut child_tree = Tree::new(node_label(child, style));
                        build_tree(arena, child_idx, style, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        match self.root().and_then(|idx| self.get_node(idx).map(|n| (idx, n))) {
            Some((root_idx, root)) => {
                let mut tree = Tree::new(node_label(root, style));
                build_tree(self, root_idx, style, &mut tree);
                tree
            }
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

/// Session view printing to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleView {
    style: AmountStyle,
}

impl ConsoleView {
    pub fn new(style: AmountStyle) -> Self {
        Self { style }
    }

    pub fn summary_line(&self, summary: &Summary) -> String {
        format!(
            "Distribution finished. Total invested: {} of {} planned",
            self.style.format(summary.invested),
            self.style.format(summary.planned)
        )
    }
}

impl SessionView for ConsoleView {
    fn show_tree(&mut self, title: &str, tree: &AllocationTree) {
        output::header(&format!("{}:", title));
        output::info(&tree.to_tree_string(&self.style));
    }

    fn notify(&mut self, message: &str) {
        output::warning(message);
    }

    fn show_summary(&mut self, summary: &Summary) {
        output::success(&self.summary_line(summary));
        if summary.remaining() > 0.0 {
            output::detail(&format!("Remaining: {}", self.style.format(summary.remaining())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> AllocationTree {
        let mut tree = AllocationTree::new();
        let root = tree.insert_node("Total", 1000.0, None);
        let a = tree.insert_node("A", 600.0, Some(root));
        tree.insert_node("A1", 600.0, Some(a));
        tree.insert_node("B", 400.0, Some(root));
        tree
    }

    #[test]
    fn given_tree_when_rendering_then_every_node_listed_in_order() {
        colored::control::set_override(false);
        let rendered = tree().to_tree_string(&AmountStyle::default()).to_string();

        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Total: invested $ 0.00 (recommended $ 1000.00)");
        assert!(lines[1].ends_with("A: invested $ 0.00 (recommended $ 600.00)"));
        assert!(lines[2].ends_with("A1: invested $ 0.00 (recommended $ 600.00)"));
        assert!(lines[3].ends_with("B: invested $ 0.00 (recommended $ 400.00)"));
    }

    #[test]
    fn given_empty_tree_when_rendering_then_placeholder() {
        let rendered = AllocationTree::new()
            .to_tree_string(&AmountStyle::default())
            .to_string();
        assert_eq!(rendered.trim(), "Empty tree");
    }

    #[test]
    fn given_summary_when_formatting_then_mentions_both_totals() {
        let view = ConsoleView::default();
        let line = view.summary_line(&Summary {
            planned: 1000.0,
            invested: 900.0,
        });
        assert_eq!(
            line,
            "Distribution finished. Total invested: $ 900.00 of $ 1000.00 planned"
        );
    }
}

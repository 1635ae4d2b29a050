//! Integration tests for tree construction and leaf-update propagation.

use budgettree::domain::{AllocationTree, CategoryConfig, DomainError, TreeBuilder, WeightConfig};
use budgettree::util::testing;
use rstest::rstest;
use serde_json::json;

const EPS: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

fn weights(value: serde_json::Value) -> WeightConfig {
    serde_json::from_value(value).expect("valid weight config")
}

fn node(tree: &AllocationTree, path: &str) -> (f64, f64) {
    let idx = tree.find(path).unwrap_or_else(|| panic!("no node {path}"));
    let node = tree.get_node(idx).unwrap();
    (node.invested, node.recommended)
}

fn invest(tree: &mut AllocationTree, path: &str, value: f64) {
    let idx = tree.find(path).unwrap();
    tree.set_invested(idx, value).unwrap();
}

/// Every internal node's invested equals the sum over its children.
fn assert_sums_hold(tree: &AllocationTree) {
    for (_, _, node) in tree.iter() {
        if node.is_leaf() {
            continue;
        }
        let sum: f64 = node
            .children
            .iter()
            .map(|&c| tree.get_node(c).unwrap().invested)
            .sum();
        assert_close(node.invested, sum);
    }
}

// Stocks 0.5 (Domestic 3, Foreign 1), Bonds 0.3, Cash 0.2
fn nested_config() -> WeightConfig {
    weights(json!({
        "Stocks": {
            "weight": 0.5,
            "children": {
                "Domestic": {"weight": 3},
                "Foreign": {"weight": 1}
            }
        },
        "Bonds": {"weight": 0.3},
        "Cash": {"weight": 0.2}
    }))
}

// ============================================================
// Construction
// ============================================================

#[test]
fn given_two_leaves_when_building_then_split_by_weight() {
    testing::init_test_setup();
    let config = weights(json!({"A": {"weight": 0.6}, "B": {"weight": 0.4}}));

    let tree = TreeBuilder::new(&config).build(1000.0).unwrap();

    assert_close(node(&tree, "A").1, 600.0);
    assert_close(node(&tree, "B").1, 400.0);
    assert_close(tree.summary().planned, 1000.0);
    assert_close(tree.summary().invested, 0.0);
}

#[test]
fn given_nested_config_when_building_then_children_sum_to_parent() {
    let config = nested_config();

    let tree = TreeBuilder::new(&config).build(1000.0).unwrap();

    assert_close(node(&tree, "Stocks").1, 500.0);
    assert_close(node(&tree, "Stocks/Domestic").1, 375.0);
    assert_close(node(&tree, "Stocks/Foreign").1, 125.0);
    assert_close(node(&tree, "Bonds").1, 300.0);
    // last top-level weight is forced to 1 - (0.5 + 0.3)
    assert_close(node(&tree, "Cash").1, 200.0);

    for (_, _, parent) in tree.iter().filter(|(_, _, n)| !n.is_leaf()) {
        let sum: f64 = parent
            .children
            .iter()
            .map(|&c| tree.get_node(c).unwrap().recommended)
            .sum();
        assert_close(sum, parent.recommended);
    }
}

#[test]
fn given_nested_config_when_listing_leaves_then_depth_first_config_order() {
    let config = nested_config();
    let tree = TreeBuilder::new(&config).build(100.0).unwrap();

    let paths: Vec<_> = tree
        .leaves()
        .into_iter()
        .filter_map(|idx| tree.path_of(idx))
        .collect();

    assert_eq!(paths, vec!["Stocks/Domestic", "Stocks/Foreign", "Bonds", "Cash"]);
}

#[test]
fn given_last_weight_in_config_when_building_then_it_is_ignored() {
    // Cash claims 0.9 but only 1 - 0.8 is left for it
    let config = weights(json!({
        "Stocks": {"weight": 0.5},
        "Bonds": {"weight": 0.3},
        "Cash": {"weight": 0.9}
    }));

    let tree = TreeBuilder::new(&config).build(100.0).unwrap();

    assert_close(node(&tree, "Cash").1, 20.0);
}

#[rstest]
#[case(0.0)]
#[case(1.0)]
#[case(12345.67)]
fn given_any_total_when_building_then_root_recommended_equals_total(#[case] total: f64) {
    let config = nested_config();
    let tree = TreeBuilder::new(&config).build(total).unwrap();
    assert_close(tree.summary().planned, total);
}

#[rstest]
#[case(-1.0)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn given_invalid_total_when_building_then_rejected(#[case] total: f64) {
    let config = nested_config();
    assert!(matches!(
        TreeBuilder::new(&config).build(total),
        Err(DomainError::InvalidAmount(_))
    ));
}

#[test]
fn given_negative_nested_weight_when_building_then_rejected() {
    let config = weights(json!({
        "A": {"weight": 1, "children": {"A1": {"weight": -2}, "A2": {"weight": 1}}}
    }));

    let result = TreeBuilder::new(&config).build(100.0);

    assert!(matches!(
        result,
        Err(DomainError::InvalidWeight { ref name, .. }) if name == "A1"
    ));
}

// ============================================================
// Zero-weight groups
// ============================================================

fn zero_weight_config() -> WeightConfig {
    weights(json!({
        "A": {"weight": 0.5, "children": {"A1": {"weight": 0}, "A2": {}}},
        "B": {"weight": 0.5}
    }))
}

#[test]
fn given_zero_weight_group_when_building_leniently_then_children_get_zero() {
    let config = zero_weight_config();

    let tree = TreeBuilder::new(&config).build(100.0).unwrap();

    assert_close(node(&tree, "A").1, 50.0);
    assert_close(node(&tree, "A/A1").1, 0.0);
    assert_close(node(&tree, "A/A2").1, 0.0);
}

#[test]
fn given_zero_weight_group_when_building_strictly_then_error() {
    let config = zero_weight_config();

    let result = TreeBuilder::new(&config).strict(true).build(100.0);

    assert_eq!(
        result.err(),
        Some(DomainError::ZeroWeightGroup {
            parent: "A".to_string()
        })
    );
}

#[test]
fn given_zero_pool_when_sibling_invested_then_no_arithmetic_fault() {
    let config = zero_weight_config();
    let mut tree = TreeBuilder::new(&config).build(100.0).unwrap();

    invest(&mut tree, "A/A1", 10.0);

    let (_, a2_recommended) = node(&tree, "A/A2");
    assert!(a2_recommended.is_finite());
    assert_close(a2_recommended, 0.0);
    assert_sums_hold(&tree);
}

// ============================================================
// Propagation
// ============================================================

#[test]
fn given_investment_below_share_when_set_then_sibling_absorbs_rest() {
    let config = weights(json!({"A": {"weight": 0.6}, "B": {"weight": 0.4}}));
    let mut tree = TreeBuilder::new(&config).build(1000.0).unwrap();

    invest(&mut tree, "A", 500.0);
    assert_close(tree.summary().invested, 500.0);
    assert_close(node(&tree, "B").1, 500.0);

    invest(&mut tree, "B", 500.0);
    let summary = tree.summary();
    assert_close(summary.planned, 1000.0);
    assert_close(summary.invested, 1000.0);
    assert_close(summary.remaining(), 0.0);
}

#[test]
fn given_overspend_when_set_then_sibling_gets_what_is_left() {
    let config = weights(json!({"A": {"weight": 0.5}, "B": {"weight": 0.5}}));
    let mut tree = TreeBuilder::new(&config).build(1000.0).unwrap();

    invest(&mut tree, "A", 700.0);

    assert_close(node(&tree, "B").1, 300.0);
}

#[test]
fn given_nested_leaf_investment_when_set_then_propagates_across_levels() {
    let config = nested_config();
    let mut tree = TreeBuilder::new(&config).build(1000.0).unwrap();

    invest(&mut tree, "Stocks/Domestic", 475.0);

    // Stocks counts as invested now: its recommendation is frozen
    assert_close(node(&tree, "Stocks").0, 475.0);
    assert_close(node(&tree, "Stocks").1, 500.0);
    assert_close(node(&tree, "Stocks/Foreign").1, 25.0);
    // 525 left for Bonds and Cash, split 300:200
    assert_close(node(&tree, "Bonds").1, 315.0);
    assert_close(node(&tree, "Cash").1, 210.0);
    assert_sums_hold(&tree);
}

#[test]
fn given_several_edits_when_propagated_then_sums_always_hold() {
    let config = nested_config();
    let mut tree = TreeBuilder::new(&config).build(1000.0).unwrap();

    for (path, value) in [
        ("Stocks/Domestic", 400.0),
        ("Bonds", 350.0),
        ("Stocks/Foreign", 90.0),
        ("Stocks/Domestic", 0.0),
        ("Cash", 12.5),
    ] {
        invest(&mut tree, path, value);
        assert_sums_hold(&tree);
    }
    assert_close(tree.summary().invested, 452.5);
}

#[test]
fn given_same_value_twice_when_set_then_state_unchanged() {
    let config = nested_config();
    let mut tree = TreeBuilder::new(&config).build(1000.0).unwrap();

    invest(&mut tree, "Stocks/Domestic", 300.0);
    let once = tree.lines();
    invest(&mut tree, "Stocks/Domestic", 300.0);

    assert_eq!(tree.lines(), once);
}

#[test]
fn given_invested_leaf_when_other_leaf_edited_then_its_recommendation_is_frozen() {
    let config = nested_config();
    let mut tree = TreeBuilder::new(&config).build(1000.0).unwrap();

    invest(&mut tree, "Bonds", 100.0);
    let frozen = node(&tree, "Bonds").1;

    invest(&mut tree, "Stocks/Domestic", 900.0);
    invest(&mut tree, "Cash", 5.0);

    assert_close(node(&tree, "Bonds").1, frozen);
}

#[test]
fn given_detour_when_original_values_reentered_then_state_restored() {
    let config = nested_config();
    let mut tree = TreeBuilder::new(&config).build(1000.0).unwrap();

    invest(&mut tree, "Stocks/Domestic", 300.0);
    invest(&mut tree, "Stocks/Foreign", 150.0);
    let before = tree.lines();

    // correct the previous leaf with the same value, then re-enter the current one
    invest(&mut tree, "Stocks/Domestic", 300.0);
    invest(&mut tree, "Stocks/Foreign", 150.0);

    assert_eq!(tree.lines(), before);
}

#[test]
fn given_leaf_reset_to_zero_when_set_then_it_rejoins_the_pool() {
    let config = weights(json!({"A": {"weight": 0.5}, "B": {"weight": 0.5}}));
    let mut tree = TreeBuilder::new(&config).build(1000.0).unwrap();

    invest(&mut tree, "A", 700.0);
    invest(&mut tree, "A", 0.0);

    assert_close(node(&tree, "A").1, 500.0);
    assert_close(node(&tree, "B").1, 500.0);
}

#[test]
fn given_internal_node_when_set_invested_then_not_a_leaf() {
    let config = nested_config();
    let mut tree = TreeBuilder::new(&config).build(1000.0).unwrap();
    let stocks = tree.find("Stocks").unwrap();

    assert_eq!(
        tree.set_invested(stocks, 1.0),
        Err(DomainError::NotALeaf("Stocks".to_string()))
    );
}

#[test]
fn given_hand_built_config_when_building_then_same_as_parsed() {
    let mut children = WeightConfig::new();
    children.insert("Domestic".into(), CategoryConfig::leaf(3.0));
    children.insert("Foreign".into(), CategoryConfig::leaf(1.0));
    let mut config = WeightConfig::new();
    config.insert("Stocks".into(), CategoryConfig::group(0.5, children));
    config.insert("Bonds".into(), CategoryConfig::leaf(0.3));
    config.insert("Cash".into(), CategoryConfig::leaf(0.2));

    assert_eq!(config, nested_config());
}

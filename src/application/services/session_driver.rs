//! Interactive session driver
//!
//! Solicits the total and top-level weights, builds the allocation tree and
//! walks its leaves, one value per leaf, re-rendering after every change.

use tracing::{debug, info, instrument};

use crate::application::format::AmountStyle;
use crate::application::input::{
    parse_amount, parse_leaf_input, parse_review_input, parse_weight, DEFAULT_GO_BACK_KEYWORD,
};
use crate::application::session::{Session, Step, Transition};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{AllocationTree, DomainError, TreeBuilder, WeightConfig, DEFAULT_ROOT_NAME};
use crate::infrastructure::traits::{Prompter, SessionView};

/// Knobs of a session, usually derived from `Settings`.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub root_name: String,
    pub go_back_keyword: String,
    pub style: AmountStyle,
    pub strict_weights: bool,
    /// Use configured top-level weights without prompting
    pub accept_defaults: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            go_back_keyword: DEFAULT_GO_BACK_KEYWORD.to_string(),
            style: AmountStyle::default(),
            strict_weights: false,
            accept_defaults: false,
        }
    }
}

pub struct SessionDriver<'a> {
    prompter: &'a mut dyn Prompter,
    view: &'a mut dyn SessionView,
    options: SessionOptions,
}

impl<'a> SessionDriver<'a> {
    pub fn new(
        prompter: &'a mut dyn Prompter,
        view: &'a mut dyn SessionView,
        options: SessionOptions,
    ) -> Self {
        Self {
            prompter,
            view,
            options,
        }
    }

    fn read(&mut self, prompt: &str) -> ApplicationResult<String> {
        self.prompter
            .read_line(prompt)
            .with_context("read input")?
            .ok_or(ApplicationError::InputClosed)
    }

    /// Ask for the total until a valid amount is entered.
    pub fn ask_total(&mut self) -> ApplicationResult<f64> {
        let prompt = format!(
            "Investment amount ({}):",
            self.options.style.currency_symbol
        );
        loop {
            let raw = self.read(&prompt)?;
            match parse_amount(&raw) {
                Ok(total) => return Ok(total),
                Err(e) => self.view.notify(&e.to_string()),
            }
        }
    }

    /// Ask for each solicited top-level weight; empty input keeps the default.
    pub fn ask_weights(&mut self, defaults: &[(String, f64)]) -> ApplicationResult<Vec<(String, f64)>> {
        let mut weights = Vec::with_capacity(defaults.len());
        for (name, default) in defaults {
            let prompt = format!("Weight for {} (default: {}):", name, default);
            loop {
                let raw = self.read(&prompt)?;
                match parse_weight(&raw, *default) {
                    Ok(weight) => {
                        weights.push((name.clone(), weight));
                        break;
                    }
                    Err(e) => self.view.notify(&e.to_string()),
                }
            }
        }
        Ok(weights)
    }

    /// Build the tree for a session, soliciting whatever was not supplied.
    #[instrument(level = "debug", skip(self, config))]
    pub fn prepare(
        &mut self,
        config: &WeightConfig,
        total: Option<f64>,
        overrides: &[(String, f64)],
    ) -> ApplicationResult<AllocationTree> {
        let total = match total {
            Some(total) => total,
            None => self.ask_total()?,
        };

        let mut builder = TreeBuilder::new(config)
            .with_root_name(self.options.root_name.as_str())
            .strict(self.options.strict_weights);
        for (name, weight) in overrides {
            builder = builder.with_top_level_weight(name.as_str(), *weight);
        }

        let pending: Vec<_> = builder
            .top_level_defaults()
            .into_iter()
            .filter(|(name, _)| !overrides.iter().any(|(o, _)| o == name))
            .collect();
        if self.options.accept_defaults || pending.is_empty() {
            return Ok(builder.build(total)?);
        }

        loop {
            let attempt = self
                .ask_weights(&pending)?
                .into_iter()
                .fold(builder.clone(), |b, (name, weight)| {
                    b.with_top_level_weight(name, weight)
                });
            match attempt.build(total) {
                Err(e @ DomainError::TopLevelWeightsExceedOne { .. }) => {
                    self.view.notify(&e.to_string());
                }
                result => return Ok(result?),
            }
        }
    }

    /// Walk every leaf until the user finishes; returns the final tree.
    #[instrument(level = "debug", skip_all)]
    pub fn run(&mut self, tree: AllocationTree) -> ApplicationResult<AllocationTree> {
        self.view.show_tree("Initial distribution", &tree);
        let mut session = Session::new(tree);

        loop {
            match session.step() {
                Step::Prompt(leaf) => {
                    let prompt = self.leaf_prompt(&session, leaf);
                    let raw = self.read(&prompt)?;
                    let input = match parse_leaf_input(&raw, &self.options.go_back_keyword) {
                        Ok(input) => input,
                        Err(e) => {
                            self.view.notify(&e.to_string());
                            continue;
                        }
                    };
                    match session.submit(input)? {
                        Transition::Advanced => {
                            self.view.show_tree("Updated distribution", session.tree())
                        }
                        Transition::Rewound => {
                            let msg = format!("Going back to {}", self.leaf_label(&session));
                            self.view.notify(&msg);
                        }
                        Transition::AtStart => {
                            self.view.notify("Already at the first category")
                        }
                        Transition::Finished => {}
                    }
                }
                Step::Revisit(leaf) => {
                    let invested = session
                        .tree()
                        .get_node(leaf)
                        .map(|n| n.invested)
                        .unwrap_or_default();
                    let msg = format!(
                        "Keeping {}: {}",
                        session.tree().path_of(leaf).unwrap_or_default(),
                        self.options.style.format(invested)
                    );
                    self.view.notify(&msg);
                    session.skip_revisit()?;
                }
                Step::Review => {
                    let prompt = format!(
                        "Type '{}' to correct the last category, or press Enter to finish:",
                        self.options.go_back_keyword
                    );
                    let raw = self.read(&prompt)?;
                    match parse_review_input(&raw, &self.options.go_back_keyword) {
                        Ok(answer) => {
                            if session.review(answer)? == Transition::Rewound {
                                let msg = format!("Going back to {}", self.leaf_label(&session));
                                self.view.notify(&msg);
                            }
                        }
                        Err(e) => self.view.notify(&e.to_string()),
                    }
                }
                Step::Finished => break,
            }
        }

        let tree = session.into_tree();
        let summary = tree.summary();
        info!(
            "session finished: planned={} invested={}",
            summary.planned, summary.invested
        );
        self.view.show_summary(&summary);
        Ok(tree)
    }

    /// Prepare and run a complete session.
    pub fn start(
        &mut self,
        config: &WeightConfig,
        total: Option<f64>,
        overrides: &[(String, f64)],
    ) -> ApplicationResult<AllocationTree> {
        let tree = self.prepare(config, total, overrides)?;
        debug!("tree built with {} nodes", tree.len());
        self.run(tree)
    }

    fn leaf_prompt(&self, session: &Session, leaf: generational_arena::Index) -> String {
        let recommended = session
            .tree()
            .get_node(leaf)
            .map(|n| n.recommended)
            .unwrap_or_default();
        format!(
            "How much did you actually invest in {} (recommended: {})?",
            session.tree().path_of(leaf).unwrap_or_default(),
            self.options.style.format(recommended)
        )
    }

    fn leaf_label(&self, session: &Session) -> String {
        session
            .leaves()
            .get(session.cursor())
            .and_then(|&leaf| session.tree().path_of(leaf))
            .unwrap_or_default()
    }
}

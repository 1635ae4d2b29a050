use std::collections::VecDeque;
use std::env;
use std::io;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{AllocationTree, DisplayLine, Summary};
use crate::infrastructure::traits::{Prompter, SessionView};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Prompter replaying a fixed script of lines; `None` once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    lines: VecDeque<String>,
    /// Every prompt shown, in order
    pub prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

/// View recording everything it is asked to show.
#[derive(Debug, Default)]
pub struct RecordingView {
    /// Snapshot per rendered tree: title and lines
    pub trees: Vec<(String, Vec<DisplayLine>)>,
    pub notices: Vec<String>,
    pub summaries: Vec<Summary>,
}

impl SessionView for RecordingView {
    fn show_tree(&mut self, title: &str, tree: &AllocationTree) {
        self.trees.push((title.to_string(), tree.lines()));
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn show_summary(&mut self, summary: &Summary) {
        self.summaries.push(*summary);
    }
}

// test
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_script_when_exhausted_then_returns_none() {
        let mut prompter = ScriptedPrompter::new(["1"]);
        assert_eq!(prompter.read_line("a").unwrap(), Some("1".to_string()));
        assert_eq!(prompter.read_line("b").unwrap(), None);
        assert_eq!(prompter.prompts, vec!["a", "b"]);
    }
}

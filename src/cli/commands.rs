//! Command dispatch: wires settings and services to each subcommand.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::SessionDriver;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, SessionArgs};
use crate::cli::output;
use crate::cli::render::ConsoleView;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{TreeBuilder, WeightConfig};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{SessionView, StdinPrompter};
use crate::infrastructure::InfraError;
use crate::util::path::resolve_against;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = cli.project_dir.clone();
    let settings = Settings::load(Some(project_dir.as_deref().unwrap_or(Path::new("."))))?;
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Run(args)) => run(&container, args, project_dir.as_deref()),
        Some(Commands::Plan(args)) => plan(&container, args, project_dir.as_deref()),
        Some(Commands::Leaves { config }) => {
            leaves(&container, config.as_deref(), project_dir.as_deref())
        }
        Some(Commands::Config { command }) => config_command(&container, command, project_dir.as_deref()),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "budgettree", &mut io::stdout());
            Ok(())
        }
        None => run(&container, &SessionArgs::default(), project_dir.as_deref()),
    }
}

fn weights_path(container: &ServiceContainer, config: Option<&Path>, project_dir: Option<&Path>) -> PathBuf {
    match config {
        Some(path) => path.to_path_buf(),
        None => resolve_against(project_dir, &container.settings.weights_file),
    }
}

fn load_weights(
    container: &ServiceContainer,
    config: Option<&Path>,
    project_dir: Option<&Path>,
) -> CliResult<WeightConfig> {
    let path = weights_path(container, config, project_dir);
    debug!("weights file: {}", path.display());
    Ok(container.weights.load(&path)?)
}

#[instrument(skip(container))]
fn run(container: &ServiceContainer, args: &SessionArgs, project_dir: Option<&Path>) -> CliResult<()> {
    let weights = load_weights(container, args.config.as_deref(), project_dir)?;

    let mut options = container.settings.session_options();
    options.accept_defaults = args.defaults;

    let mut prompter = StdinPrompter;
    let mut view = ConsoleView::new(container.settings.amount_style());
    let mut driver = SessionDriver::new(&mut prompter, &mut view, options);
    driver.start(&weights, args.total, &args.weights)?;
    Ok(())
}

#[instrument(skip(container))]
fn plan(container: &ServiceContainer, args: &SessionArgs, project_dir: Option<&Path>) -> CliResult<()> {
    let total = args
        .total
        .ok_or_else(|| CliError::InvalidArgs("plan requires --total".to_string()))?;
    let weights = load_weights(container, args.config.as_deref(), project_dir)?;

    let settings = &container.settings;
    let tree = args.weights.iter().fold(
        TreeBuilder::new(&weights)
            .with_root_name(settings.root_name.as_str())
            .strict(settings.strict_weights),
        |builder, (name, weight)| builder.with_top_level_weight(name.as_str(), *weight),
    );
    let tree = tree.build(total).map_err(ApplicationError::from)?;

    let mut view = ConsoleView::new(settings.amount_style());
    view.show_tree("Initial distribution", &tree);
    Ok(())
}

#[instrument(skip(container))]
fn leaves(container: &ServiceContainer, config: Option<&Path>, project_dir: Option<&Path>) -> CliResult<()> {
    let weights = load_weights(container, config, project_dir)?;
    let tree = TreeBuilder::new(&weights)
        .with_root_name(container.settings.root_name.as_str())
        .build(0.0)
        .map_err(ApplicationError::from)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for leaf in tree.leaves() {
        if let Some(path) = tree.path_of(leaf) {
            writeln!(out, "{}", path).map_err(|e| InfraError::io("write leaves", e))?;
        }
    }
    Ok(())
}

fn config_command(
    container: &ServiceContainer,
    command: &ConfigCommands,
    project_dir: Option<&Path>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::warning("no global config directory on this platform"),
            }
            let local = local_config_path(project_dir.unwrap_or(Path::new(".")));
            output::info(&format!("local:  {}", local.display()));
        }
    }
    Ok(())
}

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use engine_logging::engine_info;
use xpath_app::cli::Cli;
use xpath_app::platform::ui::TerminalPresenter;
use xpath_app::platform::{load_config, Controller};
use xpath_core::Phase;
use xpath_engine::EngineHandle;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;
    engine_logging::initialize(
        config.log_destination.into(),
        config.level_filter()?,
        &config.log_file,
    );
    engine_info!("Using server {}", config.server_url);

    let engine = EngineHandle::new(config.client_settings())
        .with_context(|| format!("cannot reach server {}", config.server_url))?;

    // With --json stdout carries only the tree; progress goes to stderr.
    let out: Box<dyn Write> = if cli.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let mut controller = Controller::new(engine, TerminalPresenter::new(out, !cli.json));
    let phase = controller.run_job(&cli.request());

    if cli.json && phase == Phase::Completed {
        if let Some(tree) = controller.state().result_tree() {
            let json = serde_json::to_string_pretty(tree).context("failed to encode result")?;
            println!("{json}");
        }
    }

    Ok(if phase == Phase::Completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

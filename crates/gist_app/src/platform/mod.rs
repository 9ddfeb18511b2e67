pub mod app;
pub mod cli;
pub mod config;
pub mod effects;
pub mod render;
pub mod shell;

use anyhow::Context;
use gist_engine::EngineHandle;
use gist_logging::gist_info;

use self::app::Controller;
use self::cli::Cli;
use self::config::{load_file, resolve, CliOverrides};
use self::effects::EffectRunner;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let file = load_file(cli.config.as_deref())?;
    let settings = resolve(
        file,
        |key| std::env::var(key).ok(),
        &CliOverrides {
            token: cli.token,
            base_url: cli.base_url,
            verbose: cli.verbose,
        },
    );
    gist_logging::initialize(
        settings.log_destination,
        settings.log_level,
        std::path::Path::new(gist_logging::DEFAULT_LOG_FILE),
    );
    gist_info!(
        "starting against {} (token {})",
        settings.api.base_url,
        if settings.api.token.is_some() { "set" } else { "unset" }
    );

    // Two fan-out stages, each retried once.
    let attempts = settings.api.max_retries + 1;
    let wait = settings.api.request_timeout * attempts * 2 + settings.api.retry_delay * attempts;

    let engine = EngineHandle::new(settings.api).context("failed to start the engine")?;
    let mut controller = Controller::new(EffectRunner::new(engine), settings.per_page, wait);
    controller.run_command(cli.command)
}

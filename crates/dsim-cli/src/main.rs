//! District simulator CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use dsim_cli::logging::{LogConfig, LogFormat, init_logging};
use dsim_cli::render::Renderer;
use dsim_cli::settings::Settings;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    RunContext, run_config, run_fetch, run_health, run_inspect, run_mapping, run_shell,
    run_simulate, stdout_color,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let settings_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let ctx = RunContext {
        settings: Settings::load_from(&settings_path),
        settings_path: &settings_path,
        api_url: cli.api_url.as_deref(),
        timeout: cli.timeout,
        renderer: Renderer::new(stdout_color(cli.color.color)),
    };

    let outcome = match &cli.command {
        Command::Simulate(args) => run_simulate(&ctx, args),
        Command::Shell(args) => run_shell(&ctx, args),
        Command::Inspect(args) => run_inspect(&ctx, args),
        Command::Mapping(args) => run_mapping(&ctx, args),
        Command::Fetch(args) => run_fetch(&ctx, args),
        Command::Health => run_health(&ctx),
        Command::Config { action } => run_config(&ctx, action),
    };
    let exit_code = match outcome {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

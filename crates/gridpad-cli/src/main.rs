// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use config::Config;
use gridpad_app::{AppCommand, AppState, PAGE_COUNT};
use log::info;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `gridpad --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    let level = logging::resolve_level(config.log_level()?)?;
    let log_path = config.log_file()?;
    if options.check_only {
        return Ok(());
    }

    logging::init(&log_path, level)?;
    info!("loaded config from {}", options.config_path.display());

    let mut state = AppState::with_toolbar(config.toolbar());
    if let Some(page) = options.start_page {
        state.dispatch(AppCommand::GoToPage(page as i64 - 1));
    }
    gridpad_tui::run_app(&mut state)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    start_page: Option<usize>,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        start_page: None,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--page" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--page requires a page number"))?;
                options.start_page = Some(parse_page(value.as_ref())?);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn parse_page(raw: &str) -> Result<usize> {
    let page: usize = raw
        .parse()
        .with_context(|| format!("invalid page {raw:?}; expected 1..={PAGE_COUNT}"))?;
    if page == 0 || page > PAGE_COUNT {
        anyhow::bail!("page {page} out of range; expected 1..={PAGE_COUNT}");
    }
    Ok(page)
}

fn print_help() {
    println!("gridpad");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --page <n>               Open on page n (1-{PAGE_COUNT})");
    println!("  --check                  Validate config and exit");
    println!("  --help                   Show this help");
}

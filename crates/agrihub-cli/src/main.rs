// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use agrihub_app::{AppState, PredictionPayload};
use agrihub_client::Client;
use anyhow::{Context, Result};
use config::Config;
use logging::LogTarget;
use runtime::{DemoRuntime, HttpRuntime};
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

    let target = if options.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    let _log_guard = logging::init(target)?;

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `agrihub --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    if options.check_only
        && let Some(raw) = &options.prediction
    {
        PredictionPayload::parse(raw)
            .and_then(|payload| payload.yield_comparison())
            .context("invalid --prediction payload")?;
    }

    let mut state = AppState::with_tab(config.start_tab()?);
    let typing_delay = config.typing_delay()?;

    if options.demo {
        tracing::info!("starting in demo mode");
        let mut runtime = DemoRuntime::new(typing_delay, options.prediction);
        if options.check_only {
            return Ok(());
        }
        return agrihub_tui::run_app(&mut state, &mut runtime);
    }

    let client = Client::new(config.base_url(), config.timeout()?).with_context(|| {
        format!(
            "invalid [server] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    if options.check_only {
        return Ok(());
    }

    tracing::info!(base_url = client.base_url(), "starting");
    let mut runtime = HttpRuntime::new(
        client,
        config.chat_endpoint()?,
        typing_delay,
        options.prediction,
    );
    agrihub_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    prediction: Option<String>,
    log_stderr: bool,
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
        demo: false,
        check_only: false,
        prediction: None,
        log_stderr: false,
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
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--prediction" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!(
                        "--prediction requires a JSON object like {{\"base_yield\":2000,\"yield_per_acre\":2400,\"crop_name\":\"Rice\"}}"
                    )
                })?;
                options.prediction = Some(value.as_ref().to_owned());
            }
            "--log-stderr" => {
                options.log_stderr = true;
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

fn print_help() {
    println!("agrihub");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Run offline with the reference crop catalogue");
    println!("  --check                  Validate config and startup arguments, then exit");
    println!("  --prediction <json>      Chart a yield prediction payload");
    println!("  --log-stderr             Log to stderr instead of the log file");
    println!("  --help                   Show this help");
}

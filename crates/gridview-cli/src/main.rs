// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use gridview_app::{GridState, ViewBehavior};
use gridview_source::{HttpSource, RecordSource, StaticSource};
use gridview_testkit::PostFaker;
use gridview_tui::UiOptions;
use runtime::SourceRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;

const DEMO_SEED: u64 = 2026;
const DEMO_RECORDS: usize = 100;

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
            "load config {}; run `gridview --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let behavior = config.view_behavior();

    if options.demo {
        let records = PostFaker::new(DEMO_SEED).records(DEMO_RECORDS);
        return launch(StaticSource::new(records), behavior, &config, &options);
    }

    let url = options
        .url
        .as_deref()
        .unwrap_or_else(|| config.source_url());
    let source = HttpSource::new(url, config.source_timeout()?).with_context(|| {
        format!(
            "invalid [source] config in {}; fix url/timeout values or pass --url",
            options.config_path.display()
        )
    })?;
    launch(source, behavior, &config, &options)
}

fn launch<S>(source: S, behavior: ViewBehavior, config: &Config, options: &CliOptions) -> Result<()>
where
    S: RecordSource + Send + Sync + 'static,
{
    if options.check_only {
        println!("ok: {}", source.describe());
        return Ok(());
    }

    let log_path = config.log_path()?;
    logging::init(&log_path)?;
    info!(
        source = %source.describe(),
        config = %options.config_path.display(),
        ?behavior,
        "starting gridview"
    );

    let mut state = GridState::new(behavior);
    let mut runtime = SourceRuntime::new(source);
    let ui_options = UiOptions {
        filter_attribute: config.filter_attribute(),
    };
    gridview_tui::run_app(&mut state, &mut runtime, ui_options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    url: Option<String>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
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
        url: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--url requires an endpoint"))?;
                options.url = Some(value.as_ref().to_owned());
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
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("gridview: browse a JSON record endpoint as a paged table");
    println!("  --config <path>          Use a specific config path");
    println!("  --url <endpoint>         Fetch records from this URL instead of [source].url");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Browse generated records without the network");
    println!("  --check                  Validate config and source, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/gridview-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                url: None,
                print_config_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_url_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--url", "http://127.0.0.1:8080/posts"],
            default_options_path(),
        )?;
        assert_eq!(options.url.as_deref(), Some("http://127.0.0.1:8080/posts"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--url"], default_options_path())
            .expect_err("missing url value should fail");
        assert!(error.to_string().contains("--url requires an endpoint"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_check_and_demo_flags() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--print-config-path",
                "--print-example-config",
                "--check",
                "--demo",
            ],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(options.demo);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}

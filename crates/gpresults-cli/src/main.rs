// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use gpresults_app::{
    FilterName, ResultsBackend, ResultsPage, ScenarioId, ThreadedBackend, ViewCatalog,
};
use gpresults_client::Client;
use runtime::{HtmlEmbedder, await_view, report_view};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

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

    if options.list_views {
        for view in ViewCatalog::standard().list_views() {
            println!("{}\t{}\t{}", view.key, view.kind().as_str(), view.caption);
        }
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `gpresults --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_tracing(config.log_filter());

    let timeout = config.timeout()?;
    let client = Client::new(config.base_url(), timeout).with_context(|| {
        format!(
            "invalid [server] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;

    let scenario = options
        .scenario
        .as_deref()
        .map(ScenarioId::parse_route)
        .transpose()?;

    if options.check_only {
        if let Some(scenario) = scenario {
            client.results_options(scenario).with_context(|| {
                format!("result options for scenario {scenario} are not reachable")
            })?;
        }
        return Ok(());
    }

    let scenario = scenario
        .ok_or_else(|| anyhow!("--scenario is required; run with --help to see usage"))?;
    let embedder = HtmlEmbedder::new(config.plot_dir()?, config.bokeh_js());
    let mut page = ResultsPage::enter(scenario, ThreadedBackend::new(client), embedder);

    let Some(view) = options.view.as_deref() else {
        print_overview(&page);
        return Ok(());
    };

    let key = page.catalog().resolve_slug(view)?.key;
    for (filter, raw) in &options.filters {
        page.set_filter_raw(key, *filter, raw)?;
    }
    page.select_view(key)?;
    info!(view = %key, scenario = %scenario, "waiting for result");
    await_view(&mut page, key, timeout)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report_view(&page, key, &mut out)
}

fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_filter))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();
}

fn print_overview<B: ResultsBackend>(page: &ResultsPage<B, HtmlEmbedder>) {
    println!("scenario {}", page.scenario());
    for button in page.list_result_buttons() {
        println!("  {:<34} {}", button.key.as_str(), button.caption);
    }
    if let Some(error) = page.options_error() {
        println!("filter options unavailable: {error}");
        return;
    }
    for form in page.list_parameter_forms() {
        println!("{}", form.caption);
        for filter in form.filters {
            if filter.options.is_empty() {
                println!("  {}", filter.label);
            } else {
                println!("  {}: {}", filter.label, filter.options.join(", "));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    scenario: Option<String>,
    view: Option<String>,
    filters: Vec<(FilterName, String)>,
    list_views: bool,
    print_config_path: bool,
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
        scenario: None,
        view: None,
        filters: Vec::new(),
        list_views: false,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let flag = arg.as_ref();
        let filter = match flag {
            "--load-zone" => Some(FilterName::LoadZone),
            "--horizon" => Some(FilterName::Horizon),
            "--stage" => Some(FilterName::Stage),
            "--ymax" => Some(FilterName::YAxisMax),
            _ => None,
        };
        if let Some(filter) = filter {
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("{flag} requires a value"))?;
            options.filters.push((filter, value.as_ref().to_owned()));
            continue;
        }

        match flag {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--scenario" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--scenario requires a scenario id"))?;
                options.scenario = Some(value.as_ref().to_owned());
            }
            "--view" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--view requires a view slug; see --list-views"))?;
                options.view = Some(value.as_ref().to_owned());
            }
            "--list-views" => {
                options.list_views = true;
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
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("gpresults");
    println!("  --scenario <id>          Scenario whose results to show");
    println!("  --view <slug>            Fetch one result view (see --list-views)");
    println!("  --load-zone <zone>       Plot filter: load zone");
    println!("  --horizon <horizon>      Plot filter: horizon");
    println!("  --stage <stage>          Plot filter: stage");
    println!("  --ymax <number>          Plot filter: y-axis maximum");
    println!("  --list-views             List result views");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and, with --scenario, the server");
    println!("  --help                   Show this help");
}

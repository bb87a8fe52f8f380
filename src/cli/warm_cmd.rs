//! `warm`: fetch a catalog's critical path (and optionally a route) over HTTP.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use super::{first_positional, flag_value, has_flag, EXIT_CONFIG, EXIT_FAILURE, EXIT_OK};
use crate::catalog::load_graph;
use crate::config;
use crate::fetch::HttpFetcher;
use crate::{Runtime, RuntimeConfig};

const VALUED_FLAGS: &[&str] = &["--locale", "--route", "--base-url"];

/// `warm <catalog> [--locale L] [--route R] [--base-url URL] [--auth]`
pub async fn run_warm(args: &[String]) -> i32 {
    let Some(path) = first_positional(args, VALUED_FLAGS) else {
        eprintln!("Usage: lexiload-cli warm <catalog> [--locale L] [--route R] [--base-url URL] [--auth]");
        return EXIT_CONFIG;
    };
    let graph = match load_graph(Path::new(path)) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Invalid catalog: {}", e);
            return EXIT_CONFIG;
        }
    };

    let mut env = config::load();
    if let Some(locale) = flag_value(args, "--locale") {
        env.preload.locale = locale.to_string();
    }
    if let Some(base_url) = flag_value(args, "--base-url") {
        env.fetcher.base_url = base_url.to_string();
    }

    let fetcher = match HttpFetcher::new(env.fetcher.clone()) {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => {
            eprintln!("Failed to build HTTP client: {}", e);
            return EXIT_CONFIG;
        }
    };

    let runtime = Runtime::new(RuntimeConfig::from(&env), graph, fetcher);
    let orchestrator = runtime.orchestrator;
    orchestrator.set_authenticated(has_flag(args, "--auth"));

    let startup = match orchestrator.start().await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Startup failed: {}", e);
            return EXIT_FAILURE;
        }
    };

    let route = match flag_value(args, "--route") {
        Some(route) => Some(orchestrator.on_route_change(route).await),
        None => None,
    };

    let summary = json!({
        "locale": env.preload.locale,
        "startup": startup,
        "route": route,
        "stats": orchestrator.stats(),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Failed to serialize summary: {}", e);
            return EXIT_FAILURE;
        }
    }

    match route {
        Some(report) if !report.failed.is_empty() => EXIT_FAILURE,
        _ => EXIT_OK,
    }
}

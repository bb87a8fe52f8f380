//! `plan`: print the load plan a catalog produces, without fetching.

use std::path::Path;

use serde::Serialize;

use super::{first_positional, flag_value, has_flag, EXIT_CONFIG, EXIT_OK};
use crate::catalog::{load_graph, NamespaceGraph};
use crate::config;

/// Everything the scheduler would decide for a catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadPlan {
    pub authenticated: bool,
    pub critical_path: Vec<String>,
    pub load_order: Vec<String>,
    pub tiers: Vec<Vec<String>>,
    pub total_estimated_bytes: u64,
    pub route: Option<RoutePlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub route: String,
    pub relevant: Vec<String>,
    pub batches: Vec<Vec<String>>,
}

pub fn build_plan(graph: &NamespaceGraph, route: Option<&str>, authenticated: bool, batch_size: usize) -> LoadPlan {
    let route = route.map(|route| {
        let relevant = graph.relevant_namespaces(route);
        let batches = graph
            .order_by_load(&relevant, authenticated)
            .chunks(batch_size.max(1))
            .map(<[String]>::to_vec)
            .collect();
        RoutePlan {
            route: route.to_string(),
            relevant,
            batches,
        }
    });

    LoadPlan {
        authenticated,
        critical_path: graph.critical_path(authenticated),
        load_order: graph.optimized_load_order(authenticated),
        tiers: graph.tiers(),
        total_estimated_bytes: graph.total_estimated_size(),
        route,
    }
}

/// `plan <catalog> [--route R] [--auth] [--json]`
pub fn run_plan(args: &[String]) -> i32 {
    let Some(path) = first_positional(args, &["--route"]) else {
        eprintln!("Usage: lexiload-cli plan <catalog> [--route ROUTE] [--auth] [--json]");
        return EXIT_CONFIG;
    };
    let graph = match load_graph(Path::new(path)) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Invalid catalog: {}", e);
            return EXIT_CONFIG;
        }
    };

    let batch_size = config::load().preload.batch_size;
    let plan = build_plan(&graph, flag_value(args, "--route"), has_flag(args, "--auth"), batch_size);

    if has_flag(args, "--json") {
        match serde_json::to_string_pretty(&plan) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize plan: {}", e);
                return super::EXIT_FAILURE;
            }
        }
    } else {
        print_plan(&plan);
    }
    EXIT_OK
}

fn print_plan(plan: &LoadPlan) {
    println!("Authenticated:   {}", plan.authenticated);
    println!("Critical path:   {}", plan.critical_path.join(" -> "));
    println!("Load order:      {}", plan.load_order.join(", "));
    println!("Estimated size:  {} bytes", plan.total_estimated_bytes);
    println!("Tiers:");
    for (i, tier) in plan.tiers.iter().enumerate() {
        println!("  {}: {}", i, tier.join(", "));
    }
    if let Some(route) = &plan.route {
        println!("Route {}:", route.route);
        println!("  Relevant: {}", route.relevant.join(", "));
        for (i, batch) in route.batches.iter().enumerate() {
            println!("  Batch {}: {}", i + 1, batch.join(", "));
        }
    }
}

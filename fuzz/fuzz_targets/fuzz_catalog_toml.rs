//! Fuzz target for catalog parsing and graph validation.
//!
//! Arbitrary catalog text must either build a graph or return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lexiload::catalog::Catalog;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(catalog) = Catalog::from_toml(text) {
        if let Ok(graph) = catalog.into_graph() {
            let order = graph.optimized_load_order(true);
            assert_eq!(order.len(), graph.len());
        }
    }
});

//! Fuzz target for route pattern parsing and matching.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lexiload::catalog::RoutePattern;

#[derive(Debug, Arbitrary)]
struct Input {
    pattern: String,
    route: String,
}

fuzz_target!(|input: Input| {
    if let Ok(pattern) = RoutePattern::parse(&input.pattern) {
        let _ = pattern.matches(&input.route);
        // A pattern always matches its own literal prefix.
        let literal = pattern.as_str().trim_end_matches('*');
        assert!(pattern.matches(literal));
    }
});

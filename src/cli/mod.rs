//! CLI module for lexiload commands.
//!
//! ## Usage
//!
//! ```bash
//! lexiload-cli plan catalog.toml --route /admin/users --auth
//! lexiload-cli warm catalog.toml --locale en-US
//! lexiload-cli config validate
//! ```

pub mod config_cmd;
pub mod plan_cmd;
pub mod warm_cmd;

pub use plan_cmd::{build_plan, run_plan, LoadPlan};
pub use warm_cmd::run_warm;

/// Command succeeded.
pub const EXIT_OK: i32 = 0;
/// Command ran but failed.
pub const EXIT_FAILURE: i32 = 1;
/// Bad arguments, catalog or environment.
pub const EXIT_CONFIG: i32 = 2;

/// Value following `--name`, if present.
pub fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// First argument that is neither a flag nor a flag's value.
///
/// `valued` lists the flags that consume the following argument.
pub fn first_positional<'a>(args: &'a [String], valued: &[&str]) -> Option<&'a str> {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if valued.contains(&arg) {
            i += 2;
        } else if arg.starts_with("--") {
            i += 1;
        } else {
            return Some(arg);
        }
    }
    None
}

//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; the route table dispatches to the planner.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{format_generate_summary, format_status_json, format_status_text};
pub use route::CliContext;

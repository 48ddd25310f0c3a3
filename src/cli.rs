//! CLI domain: parse, route and error output only.
//! No domain orchestration; the route table dispatches to the pipeline in `run`.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use route::RunContext;

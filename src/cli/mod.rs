pub mod commands;
pub mod ui;
pub mod util;

pub use util::{load_config, parse_context_pair, read_json, write_json};

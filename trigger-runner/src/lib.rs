pub mod args;
mod error;
pub mod plugin;

pub use args::{Args, parse_header};
pub use error::RunnerError;
pub use plugin::{TriggerFn, TriggerPlugin};

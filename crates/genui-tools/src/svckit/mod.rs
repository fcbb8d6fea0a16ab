//! Service Kit - Tool Adapters
//!
//! The three lookups the decision graph can dispatch to, each implementing
//! `genui_core::Tool`.

mod github_repo;
mod invoice_parser;
mod weather_data;

pub use github_repo::{GITHUB_REPO, GithubConfig, GithubRepoTool, REPO_FETCH_FAILED};
pub use invoice_parser::{INVOICE_PARSER, InvoiceParserTool};
pub use weather_data::{WEATHER_DATA, WeatherConfig, WeatherDataTool};

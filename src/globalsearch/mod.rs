//! Client and parser for the CUNY GlobalSearch class search tool.
//!
//! GlobalSearch is a server-rendered form flow: the main page lists terms and
//! institutions, the subject page lists careers and subjects for a chosen
//! school and term, and the results page lists courses and their sections.

pub mod errors;
pub mod middleware;
pub mod models;
pub mod navigator;
pub mod parser;
mod section;

pub use errors::{NavigationError, ParseError};
pub use navigator::{ClassQuery, ClassSearch, FormChoice, Navigator, NavigatorOptions};

/// Search tool controller; every page in the flow is served from this URL.
pub const GLOBALSEARCH_URL: &str =
    "https://globalsearch.cuny.edu/CFGlobalSearchTool/CFSearchToolController";

/// Origin sent on form POSTs.
pub const GLOBALSEARCH_ORIGIN: &str = "https://globalsearch.cuny.edu";

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod fmt;
pub mod globalsearch;
pub mod logging;
pub mod normalize;
pub mod notify;
pub mod scraper;
pub mod utils;

pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod git;
pub mod history;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod ui;

pub use error::{Result, SemrelError};

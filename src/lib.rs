#![forbid(unsafe_code)]

pub mod app;
pub mod catalog;
pub mod cell;
pub mod cli;
pub mod discovery;
pub mod error;
pub mod formats;
pub mod ingest;
pub mod logging;
pub mod query;
pub mod render;

#![forbid(unsafe_code)]

pub mod build;
pub mod cli;
pub mod date;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod legend;
pub mod logging;
pub mod registry;
pub mod week;

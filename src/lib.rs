//! Example driver and sample-data manager for mdciao contact analysis.

pub mod app;
pub mod archive;
pub mod clt;
pub mod collaborators;
pub mod config;
pub mod datasets;
pub mod download;
pub mod error;
pub mod helpers;
pub mod output;
pub mod resolver;
pub mod samples;
pub mod staging;

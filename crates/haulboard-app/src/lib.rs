//! Application service layer - planning use cases, config, reporting

pub mod app;
pub mod config;
pub mod report;
pub mod repository;

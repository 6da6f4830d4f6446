//! Planning board domain: models, repository contracts and the load-planning core

pub mod model;
pub mod repository;
pub mod service;

//! Storage layer abstraction trait definition

mod domain_config_repository;

pub use domain_config_repository::DomainConfigRepository;

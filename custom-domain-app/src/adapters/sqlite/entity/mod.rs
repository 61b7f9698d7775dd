//! `SeaORM` entities.

pub mod domain_config;

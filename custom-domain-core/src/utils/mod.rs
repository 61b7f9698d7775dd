//! 工具函数

pub mod domain_validation;

pub use domain_validation::validate_domain;

//! Utility modules.

/// Timestamp deserialization helpers shared by clients.
pub mod datetime;

/// Log sanitization utilities to prevent sensitive data exposure.
pub mod log_sanitizer;

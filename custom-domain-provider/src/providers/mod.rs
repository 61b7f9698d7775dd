//! Hosting and email client implementations

/// Shared utilities used by client implementations.
pub mod common;

#[cfg(feature = "resend")]
mod resend;
#[cfg(feature = "vercel")]
mod vercel;

#[cfg(feature = "resend")]
pub use resend::ResendClient;
#[cfg(feature = "vercel")]
pub use vercel::VercelClient;

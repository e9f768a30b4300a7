//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): transport and response errors
//! - [`LoadState`](loadstate::LoadState): request lifecycle states

pub mod context;
pub mod loadstate;
pub mod neterror;

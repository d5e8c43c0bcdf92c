//! Core Module - shared types
//!
//! - `types.rs`: conversation data types (Message, MessageRole)

pub mod types;

// ============================================================================
// Types (types.rs)
// ============================================================================

// Message & Role
pub use types::{Message, MessageRole};

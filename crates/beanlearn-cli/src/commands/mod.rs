//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config and ledger loading)
//! - `stats` - Ledger summary
//! - `features` - Feature table output
//! - `training` - Training data export
//! - `annotate` - Inferred postings and payees for imported transactions

pub mod annotate;
pub mod core;
pub mod features;
pub mod stats;
pub mod training;

// Re-export command functions for main.rs
pub use annotate::*;
pub use core::*;
pub use features::*;
pub use stats::*;
pub use training::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

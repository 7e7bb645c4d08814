//! Name-based selection of modules.
//!
//! - [`PatternFilter`] picks the modules to inspect
//! - [`SystemPrefixSet`] picks the references to leave alone

pub mod pattern;
pub mod prefix;

pub use pattern::{NamePattern, PatternFilter};
pub use prefix::{SystemPrefixSet, BUILTIN_SYSTEM_PREFIXES};

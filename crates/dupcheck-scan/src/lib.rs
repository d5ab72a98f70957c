//! Analysis over loaded packages.
//!
//! Provides the package index (membership lookup), the cross-package
//! duplication scanner, reverse dependency lookup, folder classification and
//! report rendering.

pub mod classify;
pub mod index;
pub mod refs;
pub mod report;
pub mod scan;

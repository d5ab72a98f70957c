//! Core types for dupcheck, the cross-package asset duplication analyzer.
//!
//! Provides the package manifest model ([`manifest::Package`]), build-report
//! loading, manifest discovery on disk, and configuration.

pub mod config;
pub mod loader;
pub mod manifest;
pub mod storage;

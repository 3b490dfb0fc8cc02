//! # Analyzer Module
//!
//! Analysis engines for infrastructure manifests.

pub mod hardening;

//! Error types and error handling for the compiler.
//!
//! This module defines the single error type shared by every phase:
//!
//! - Error structures with source position information
//! - Front-end variants (tokenizing and parsing)
//! - Constraint variants raised by semantic analysis
//! - Error names and human-readable tips for reporting

pub mod errors;

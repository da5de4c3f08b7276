//! ui
//!
//! Diagnostic output for hosts embedding the lane engine.
//!
//! # Modules
//!
//! - [`output`] - Verbosity levels and debug/warning messages
//!
//! # Design
//!
//! The library never prints on its own initiative: every message goes
//! through [`output`] and is filtered by the [`output::Verbosity`] the host
//! configured.

pub mod output;

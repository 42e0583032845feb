//! # entrypoint-finder
//!
//! A build-time helper that discovers runnable main classes in compiled
//! output directories and resolves classes or resources across classpath
//! contexts.
//!
//! ## Architecture
//!
//! - **classfile**: narrow class-file inspection (constant pool + method table)
//! - **scan**: directory traversal and entry-point discovery
//! - **context**: the loading-context capability contract and identity handles
//! - **classpath**: classpath-backed contexts over directories and jars
//! - **resolve**: deduplicated first-success class resolution and resource
//!   locator union across candidate contexts
//! - **cli**: command-line argument definitions

pub mod classfile;
pub mod classpath;
pub mod cli;
pub mod context;
pub mod resolve;
pub mod scan;

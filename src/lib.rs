//! Entropy: a small imperative language whose values decay every time they
//! are read.
//!
//! Source text goes through [`grammar::parse`] into a concrete
//! [`tree::SyntaxTree`], then [`translator::translate`] turns the tree into a
//! Rust program linked against [`runtime`], and [`toolchain`] builds that
//! program with cargo.

pub mod cli;
pub mod config;
pub mod error;
pub mod grammar;
pub mod runtime;
pub mod toolchain;
pub mod translator;
pub mod tree;

pub use error::EntropyError;

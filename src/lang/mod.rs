//! # DotBox values
//!
//! This module defines the data a DotBox document compiles to. Values are
//! produced by the compiler and serialized by the command-line front end.
//!
//! ## Conventions
//!
//! - Mappings keep keys in first-insertion order.
//! - Serialization is untagged: a [`value::Value`] serializes as the JSON
//!   object, array, number, string or boolean it represents.

pub mod value;

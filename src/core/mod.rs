//! Core library components.
//!
//! This module contains the reusable logic for field encryption: rules and
//! paths, the document transformer, the serializer wrapper, encryption
//! backends and configuration handling.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod document;
pub mod path;
pub mod registry;
pub mod runtime;
pub mod serializer;
pub mod setup;
pub mod transform;

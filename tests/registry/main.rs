//! Integration tests for Layer 1: Model Registry
//!
//! Tests for loading models, cross-file validation, field validators,
//! external downloads, and writing models to disk.

mod downloads;
mod files;
mod identifiers;
mod models;
mod validators;

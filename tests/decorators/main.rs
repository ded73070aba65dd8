//! Integration tests for Layer 3: Decorator Commands
//!
//! Tests for target matching, command application, validation, migration,
//! and the YAML form of command sets.

mod fixtures;
mod matching;
mod migration;
mod validation;
mod yaml;

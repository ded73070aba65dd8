//! Integration tests for Layer 2: Instances
//!
//! Tests for resource validation, construction, and JSON serialization.

mod factory;
mod fixtures;
mod scenario;
mod serializer;
mod validation;

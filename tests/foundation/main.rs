//! Integration tests for Layer 0: Foundation
//!
//! Tests for namespaces, fully-qualified names, primitives, and errors.

mod errors;
mod namespaces;

//! Shared fixtures and cross-component tests.

pub(crate) mod support;

mod retrieval;

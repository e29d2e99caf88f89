//! Unit tests for the task bounded context.

pub(crate) mod support;

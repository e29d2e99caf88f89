//! Unit tests for entity records and their task adapters.

//! Property test suite entry point.

mod sweep_properties;

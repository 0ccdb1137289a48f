//! Integration test modules.

mod route_completion_test;
mod store_backends_test;

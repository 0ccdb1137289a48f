//! Unit test modules.

mod ranking_test;
mod rule_records_test;
mod scoring_engine_test;

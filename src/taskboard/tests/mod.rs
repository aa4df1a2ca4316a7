//! Unit and service tests for the taskboard engine.

mod block_service_tests;
mod board_service_tests;
mod report_tests;
mod support;

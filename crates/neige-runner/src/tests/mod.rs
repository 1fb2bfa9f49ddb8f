//! Test suites for the runner.

mod support;

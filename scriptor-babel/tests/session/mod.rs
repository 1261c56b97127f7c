//! Session workflow tests

mod workflow;

//! Markdown format tests
//!
//! Tests for the Markdown ↔ rich tree converter.

mod blank_lines;
mod header;
mod properties;
mod round_trip;
mod table;

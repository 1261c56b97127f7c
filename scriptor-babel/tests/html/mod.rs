//! Editing-surface HTML tests

mod surface;

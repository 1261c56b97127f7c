//! Line diff tests over fixture documents

mod review;

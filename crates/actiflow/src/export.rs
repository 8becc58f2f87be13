//! Export of rendered diagrams.

pub mod svg;

//! Actiflow Core Types and Definitions
//!
//! This crate provides the foundational types shared by the actiflow
//! ingestion, synthesis and layout crates. It includes:
//!
//! - **Identifiers**: Interned actor and element names ([`identifier::Id`])
//! - **Geometry**: Integer rectangles ([`geometry`] module)
//! - **Rows**: Imported activity rows and action-type choices ([`row`] module)
//! - **Semantic**: Nodes, control flows, partitions and store descriptors ([`semantic`] module)

pub mod geometry;
pub mod identifier;
pub mod row;
pub mod semantic;

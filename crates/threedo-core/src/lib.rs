//! Threedo Core Types and Definitions
//!
//! This crate provides the foundational types shared by the threedo parser
//! and converter. It includes:
//!
//! - **Flavors**: Typed, offset-addressed model records ([`flavor::Flavor`])
//! - **Graph**: The offset arena holding the live flavor set ([`graph::FlavorGraph`])
//! - **Files**: Interning tables for referenced files ([`files::FileTables`])
//! - **Plane**: Split-plane coefficients for BSP records ([`plane`] module)
//! - **Angle**: Fixed-point angle quantization ([`angle`] module)

pub mod angle;
pub mod files;
pub mod flavor;
pub mod graph;
pub mod plane;

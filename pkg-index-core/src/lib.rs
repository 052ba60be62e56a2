#![doc = "pkg-index-core: core logic library for pkg-index."]

//! This crate contains all data models and pipeline logic for pkg-index:
//! grouping bucket object keys into a package index, rendering the static
//! HTML site, archiving it and driving a deploy through the [`contract`]
//! service traits. Transport clients (object storage, deploy API) live in
//! the CLI crate; this crate only defines their contracts.
//!
//! # Usage
//! Add this as a dependency for all shared pipeline, rendering, config and
//! publish code.

pub mod archive;
pub mod config;
pub mod contract;
pub mod index;
pub mod publish;
pub mod render;

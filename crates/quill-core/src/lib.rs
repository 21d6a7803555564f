//! Core routines shared by the quill decoder crates
//!
//! This crate provides the plumbing the format crates are built on
//!
//! It currently contains
//!
//! - A bounds checked bytestream reader with big endian aware reads
//! - Decoder options shared by everything that decodes images
//! - The pixel buffer type handed back to the asset pipeline
pub mod bytestream;
pub mod options;
pub mod pixel;

//! PPTX (Office Open XML) package reader.
//!
//! Parses .pptx files, which are ZIP archives of XML parts, into a
//! [`slidemd_core::Deck`] with per-slide shapes, notes and relationships.

pub mod parser;
pub mod rels;
pub mod shapes;
mod xml;

pub use parser::PptxParser;

// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering-side caches for [typeline] text.
//!
//! The layout crate produces abstract draw operations; this crate turns
//! them into something a renderer can draw fast: glyph bitmaps rasterized
//! once and packed into shared atlas pages, refcounted so regions are
//! reused the moment no prepared text needs them, and grouped into batches
//! that each sample a single page.
//!
//! [typeline]: typeline

mod backend;
mod cache;
mod engine;
mod error;

pub mod atlas;

#[cfg(test)]
mod tests;

pub use atlas::{AtlasAllocator, AtlasConfig, AtlasEntry, AtlasRegion, EntryId, GLYPH_PADDING, GlyphKey};
pub use backend::{CpuBackend, Pixmap, RenderBackend};
pub use cache::GlyphCache;
pub use engine::{DrawBatch, EngineStats, GlyphEngine, GlyphQuad, PreparedText};
pub use error::{Error, Result};

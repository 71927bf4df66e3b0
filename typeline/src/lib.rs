// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text layout with incremental editing support.
//!
//! Typeline turns a mutable string plus font and wrap configuration into a
//! stable, queryable sequence of positioned glyphs and substring clusters.
//! The companion crate `typeline_draw` consumes the draw operations produced
//! here and caches glyph bitmaps in texture atlases.
//!
//! Outline rasterization and complex script shaping are *not* implemented in
//! this crate; they are reached through the [`RasterFace`] and [`Shaper`]
//! traits so that any font engine can be plugged in underneath.

mod error;
mod fixed;
mod resolve;
mod shape;

pub mod engine;
pub mod font;
pub mod layout;
pub mod text;

#[cfg(test)]
mod tests;

pub use engine::{
    Bitmap, GlyphMetrics, ImageKind, Library, LineMetrics, RasterFace, ShapedGlyph, Shaper,
};
pub use error::{Error, Result};
pub use fixed::F26Dot6;
pub use font::{Direction, Font, FontId, FontStyle, Script};
pub use layout::cluster::{SubString, SubStringFlags};
pub use layout::data::{Alignment, GlyphPosition, LayoutConfig, Rect};
pub use layout::draw::{DrawOperation, GlyphRef};
pub use text::{TextId, TextObject, TextState};

// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font handles, fallback chains, and cache invalidation.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;

use crate::engine::{Bitmap, GlyphMetrics, Library, LineMetrics, RasterFace, ShapedGlyph, Shaper};
use crate::shape::cache::PositionCache;
use crate::text::TextState;

/// Process-unique identity of a font.
///
/// Identity, not value: two fonts opened from the same data still get
/// distinct ids, because cached glyph bitmaps must never collide across
/// faces with different size or style state.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct FontId(pub(crate) u64);

impl FontId {
    /// Raw numeric value, usable as a map key by renderers.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

bitflags::bitflags! {
    /// Style flags applied to a font.
    ///
    /// `BOLD` and `ITALIC` change rasterization and therefore bump the
    /// font's generation; `UNDERLINE` and `STRIKETHROUGH` only add
    /// decoration draw operations during layout.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
    pub struct FontStyle: u32 {
        /// Synthetic emboldening.
        const BOLD = 1 << 0;
        /// Synthetic obliquing.
        const ITALIC = 1 << 1;
        /// Underline decoration.
        const UNDERLINE = 1 << 2;
        /// Strikethrough decoration.
        const STRIKETHROUGH = 1 << 3;
    }
}

/// Direction of text flow.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Direction {
    /// Horizontal, left to right.
    #[default]
    LeftToRight,
    /// Horizontal, right to left.
    RightToLeft,
    /// Vertical, top to bottom.
    TopToBottom,
    /// Vertical, bottom to top.
    BottomToTop,
}

impl Direction {
    /// `true` for the two horizontal directions.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }

    /// `true` when glyphs are laid out in reverse of logical order.
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::RightToLeft | Self::BottomToTop)
    }
}

/// Four-byte ISO 15924 script tag passed through to the shaping engine.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Script(pub [u8; 4]);

impl Script {
    /// The common/undetermined script.
    pub const COMMON: Self = Self(*b"Zyyy");
    /// Latin.
    pub const LATIN: Self = Self(*b"Latn");
}

impl Default for Script {
    fn default() -> Self {
        Self::COMMON
    }
}

/// A shared handle to a font.
///
/// Cloning is cheap and clones share all state, including caches and the
/// generation counter. Fonts are single-threaded by construction (`Rc`
/// interior) per the crate's concurrency contract.
#[derive(Clone)]
pub struct Font {
    id: FontId,
    inner: Rc<RefCell<FontInner>>,
}

pub(crate) struct FontInner {
    library: Library,
    face: Box<dyn RasterFace>,
    shaper: Option<Box<dyn Shaper>>,
    style: FontStyle,
    size: f32,
    direction: Direction,
    script: Script,
    fallbacks: Vec<Font>,
    /// Bumped whenever a property invalidates previously rasterized glyphs.
    generation: u64,
    /// Local codepoint -> glyph identifier cache; `0` means "not in face".
    glyph_ids: HashMap<char, u32>,
    /// Glyph identifier -> metrics cache.
    metrics: HashMap<u32, GlyphMetrics>,
    /// Ring cache of previously computed glyph-position sequences.
    positions: PositionCache,
    /// Weak dirty tokens of every TextObject referencing this font.
    watchers: Vec<Weak<Cell<TextState>>>,
}

impl Drop for FontInner {
    fn drop(&mut self) {
        self.library.unregister_font();
    }
}

impl Font {
    /// Opens a font over an external face object.
    pub fn new(library: &Library, face: Box<dyn RasterFace>, size: f32) -> Self {
        let id = library.register_font();
        let mut face = face;
        face.set_size(size);
        Self {
            id,
            inner: Rc::new(RefCell::new(FontInner {
                library: library.clone(),
                face,
                shaper: None,
                style: FontStyle::default(),
                size,
                direction: Direction::default(),
                script: Script::default(),
                fallbacks: Vec::new(),
                generation: 0,
                glyph_ids: HashMap::new(),
                metrics: HashMap::new(),
                positions: PositionCache::default(),
                watchers: Vec::new(),
            })),
        }
    }

    /// Returns this font's identity.
    pub fn id(&self) -> FontId {
        self.id
    }

    /// Attaches (or detaches) an external shaping engine for this face.
    pub fn set_shaper(&self, shaper: Option<Box<dyn Shaper>>) {
        self.inner.borrow_mut().shaper = shaper;
        self.invalidate_positions();
    }

    /// Current size in pixels.
    pub fn size(&self) -> f32 {
        self.inner.borrow().size
    }

    /// Changes the size, invalidating every cached glyph for this font.
    pub fn set_size(&self, size: f32) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.size == size {
                return;
            }
            inner.size = size;
            inner.face.set_size(size);
        }
        self.bump_generation();
    }

    /// Current style flags.
    pub fn style(&self) -> FontStyle {
        self.inner.borrow().style
    }

    /// Changes style flags.
    ///
    /// Raster-affecting flag changes bump the generation; pure decoration
    /// changes only mark referencing text objects layout-dirty.
    pub fn set_style(&self, style: FontStyle) {
        const RASTER_FLAGS: FontStyle = FontStyle::BOLD.union(FontStyle::ITALIC);
        let raster_changed = {
            let mut inner = self.inner.borrow_mut();
            if inner.style == style {
                return;
            }
            let changed = (inner.style ^ style).intersects(RASTER_FLAGS);
            inner.style = style;
            changed
        };
        if raster_changed {
            self.bump_generation();
        } else {
            self.notify_watchers();
        }
    }

    /// Default direction for text objects using this font.
    pub fn direction(&self) -> Direction {
        self.inner.borrow().direction
    }

    /// Sets the default direction.
    pub fn set_direction(&self, direction: Direction) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.direction == direction {
                return;
            }
            inner.direction = direction;
        }
        self.notify_watchers();
    }

    /// Default script tag for text objects using this font.
    pub fn script(&self) -> Script {
        self.inner.borrow().script
    }

    /// Sets the default script tag.
    pub fn set_script(&self, script: Script) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.script == script {
                return;
            }
            inner.script = script;
        }
        self.notify_watchers();
    }

    /// Current generation. Renderer-side caches compare this against the
    /// generation they were filled at.
    pub fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }

    /// Appends a fallback font consulted when this font lacks a glyph.
    ///
    /// Fallback graphs may legally contain cycles; resolution guards
    /// against revisiting a font within one lookup.
    pub fn add_fallback(&self, fallback: &Font) {
        self.inner.borrow_mut().fallbacks.push(fallback.clone());
        self.invalidate_positions();
    }

    /// Removes every occurrence of `fallback` from the chain.
    pub fn remove_fallback(&self, fallback: &Font) {
        self.inner
            .borrow_mut()
            .fallbacks
            .retain(|f| f.id != fallback.id);
        self.invalidate_positions();
    }

    /// Clears the fallback chain.
    pub fn clear_fallbacks(&self) {
        self.inner.borrow_mut().fallbacks.clear();
        self.invalidate_positions();
    }

    /// Vertical metrics of the primary face.
    pub fn line_metrics(&self) -> LineMetrics {
        self.inner.borrow().face.line_metrics()
    }

    /// Metrics for a glyph of this font, cached after the first query.
    pub fn glyph_metrics(&self, glyph_id: u32) -> Option<GlyphMetrics> {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        if let Some(m) = inner.metrics.get(&glyph_id) {
            return Some(*m);
        }
        let m = inner.face.glyph_metrics(glyph_id)?;
        inner.metrics.insert(glyph_id, m);
        Some(m)
    }

    /// Rasterizes a glyph through the external engine. Uncached; bitmap
    /// caching is the renderer's job.
    pub fn rasterize(&self, glyph_id: u32) -> Option<Bitmap> {
        self.inner.borrow().face.rasterize(glyph_id)
    }

    pub(crate) fn glyph_index_cached(&self, ch: char) -> u32 {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        match inner.glyph_ids.get(&ch) {
            Some(id) => *id,
            None => {
                let id = inner.face.glyph_index(ch);
                inner.glyph_ids.insert(ch, id);
                id
            }
        }
    }

    pub(crate) fn kerning(&self, left: u32, right: u32) -> crate::fixed::F26Dot6 {
        self.inner.borrow().face.kerning(left, right)
    }

    pub(crate) fn fallback_chain(&self) -> Vec<Font> {
        self.inner.borrow().fallbacks.clone()
    }

    pub(crate) fn shape_with_shaper(
        &self,
        text: &str,
        direction: Direction,
        script: Script,
    ) -> Option<Vec<ShapedGlyph>> {
        let inner = self.inner.borrow();
        inner
            .shaper
            .as_ref()
            .map(|s| s.shape(text, direction, script))
    }

    pub(crate) fn with_position_cache<R>(&self, f: impl FnOnce(&mut PositionCache) -> R) -> R {
        f(&mut self.inner.borrow_mut().positions)
    }

    /// Registers a text object's dirty token. The font does not own the
    /// token; dead entries are pruned on the next invalidation walk.
    pub(crate) fn register_watcher(&self, token: Weak<Cell<TextState>>) {
        self.inner.borrow_mut().watchers.push(token);
    }

    /// Bumps the generation and drops everything derived from raster state.
    fn bump_generation(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.glyph_ids.clear();
            inner.metrics.clear();
            inner.positions.clear();
            log::debug!(
                "font {:?} generation -> {} (caches cleared)",
                self.id,
                inner.generation
            );
        }
        self.notify_watchers();
    }

    /// Drops cached resolutions and positions without invalidating bitmaps.
    /// Used for fallback-chain edits: previously rasterized glyphs remain
    /// valid, but missing codepoints may now resolve differently.
    fn invalidate_positions(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.glyph_ids.clear();
            inner.positions.clear();
        }
        self.notify_watchers();
    }

    /// Walks the watcher set once, marking live text objects layout-dirty.
    fn notify_watchers(&self) {
        self.inner.borrow_mut().watchers.retain(|w| match w.upgrade() {
            Some(token) => {
                token.set(TextState::LayoutDirty);
                true
            }
            None => false,
        });
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Font {}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Font")
            .field("id", &self.id)
            .field("size", &inner.size)
            .field("style", &inner.style)
            .field("generation", &inner.generation)
            .field("fallbacks", &inner.fallbacks.len())
            .finish()
    }
}

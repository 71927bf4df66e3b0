// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutable text object: string content, configuration, and the derived
//! clusters and draw operations.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::font::{Direction, Font, Script};
use crate::layout::cluster::{self, SubString};
use crate::layout::data::{Alignment, LayoutConfig};
use crate::layout::draw::DrawOperation;
use crate::layout::{self, LayoutOutput};

/// Process-unique identity of a text object. Rendering engines key their
/// per-text cached state on this.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TextId(u64);

impl TextId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Dirty state of a text object.
///
/// `Clean -> LayoutDirty` on any mutation, `LayoutDirty -> EngineDirty`
/// when the layout pass runs, `EngineDirty -> Clean` when a rendering
/// engine consumes the draw operations. Both passes are lazy: many edits
/// between queries collapse into a single layout.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TextState {
    /// Layout and engine state are both current.
    Clean,
    /// The string or configuration changed since the last layout.
    LayoutDirty,
    /// Layout is current but the engine has not consumed it.
    EngineDirty,
}

/// A mutable, owning run of text.
///
/// Owns its string, configuration, and the derived cluster and
/// draw-operation arrays. References (does not own) a [`Font`]; the font
/// marks the text object dirty when its properties change.
#[derive(Debug)]
pub struct TextObject {
    id: TextId,
    text: String,
    font: Font,
    config: LayoutConfig,
    state: Rc<Cell<TextState>>,
    output: LayoutOutput,
    layout_serial: u64,
}

impl TextObject {
    /// Creates a text object over `font` with initial content.
    pub fn new(font: &Font, text: &str) -> Self {
        let state = Rc::new(Cell::new(TextState::LayoutDirty));
        font.register_watcher(Rc::downgrade(&state));
        Self {
            id: TextId::next(),
            text: text.to_owned(),
            font: font.clone(),
            config: LayoutConfig::default(),
            state,
            output: LayoutOutput::default(),
            layout_serial: 0,
        }
    }

    /// This text object's identity.
    pub fn id(&self) -> TextId {
        self.id
    }

    /// Current string content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The referenced font.
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Current dirty state.
    pub fn state(&self) -> TextState {
        self.state.get()
    }

    /// Serial of the last successful layout. Bumped once per layout pass;
    /// engines use it to detect stale prepared state.
    pub fn layout_serial(&self) -> u64 {
        self.layout_serial
    }

    /// Switches the font. The old font's watcher entry dies with the
    /// replaced dirty token.
    pub fn set_font(&mut self, font: &Font) {
        if self.font == *font {
            return;
        }
        self.font = font.clone();
        self.state = Rc::new(Cell::new(TextState::LayoutDirty));
        font.register_watcher(Rc::downgrade(&self.state));
    }

    // --- mutation ---------------------------------------------------------

    /// Replaces the whole string.
    pub fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
            self.mark_dirty();
        }
    }

    /// Inserts `s` at `offset`. The offset must be a UTF-8 boundary.
    pub fn insert(&mut self, offset: usize, s: &str) -> Result<()> {
        self.check_boundary(offset)?;
        self.text.insert_str(offset, s);
        self.mark_dirty();
        Ok(())
    }

    /// Deletes `len` bytes at `offset`. Both ends must be UTF-8 boundaries.
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<()> {
        self.check_range(offset, len)?;
        self.text.drain(offset..offset + len);
        self.mark_dirty();
        Ok(())
    }

    /// Replaces `len` bytes at `offset` with `s`.
    pub fn replace(&mut self, offset: usize, len: usize, s: &str) -> Result<()> {
        self.check_range(offset, len)?;
        self.text.drain(offset..offset + len);
        self.text.insert_str(offset, s);
        self.mark_dirty();
        Ok(())
    }

    /// Sets the wrap width in pixels; `0` wraps only at newlines.
    pub fn set_wrap_width(&mut self, width: u32) {
        if self.config.wrap_width != width {
            self.config.wrap_width = width;
            self.mark_dirty();
        }
    }

    /// Current wrap width.
    pub fn wrap_width(&self) -> u32 {
        self.config.wrap_width
    }

    /// Sets per-line alignment.
    pub fn set_alignment(&mut self, align: Alignment) {
        if self.config.align != align {
            self.config.align = align;
            self.mark_dirty();
        }
    }

    /// Controls whether trailing whitespace counts towards line advances
    /// (needed to place a caret after a trailing space while editing).
    pub fn set_visible_whitespace(&mut self, visible: bool) {
        if self.config.visible_whitespace != visible {
            self.config.visible_whitespace = visible;
            self.mark_dirty();
        }
    }

    /// Overrides the font's default direction for this text object.
    pub fn set_direction(&mut self, direction: Option<Direction>) {
        if self.config.direction != direction {
            self.config.direction = direction;
            self.mark_dirty();
        }
    }

    /// Overrides the font's default script for this text object.
    pub fn set_script(&mut self, script: Option<Script>) {
        if self.config.script != script {
            self.config.script = script;
            self.mark_dirty();
        }
    }

    // --- queries ----------------------------------------------------------

    /// All clusters of the current layout, sorted by byte offset.
    pub fn clusters(&mut self) -> &[SubString] {
        self.ensure_layout();
        &self.output.clusters
    }

    /// The cluster covering `offset`; boundary sentinels at the exact ends.
    pub fn substring_for_offset(&mut self, offset: usize) -> SubString {
        self.ensure_layout();
        let text_len = self.text.len();
        let index = cluster::cluster_for_offset(&self.output.clusters, text_len, offset);
        self.output.clusters[index]
    }

    /// The cluster nearest to a point in layout space.
    pub fn substring_for_point(&mut self, x: i32, y: i32) -> SubString {
        self.ensure_layout();
        let horizontal = self.direction().is_horizontal();
        let index = cluster::cluster_for_point(&self.output.clusters, horizontal, x, y);
        self.output.clusters[index]
    }

    /// Clusters of one line, in offset order.
    pub fn substrings_for_line(&mut self, line: usize) -> Result<&[SubString]> {
        self.ensure_layout();
        let line_count = self.output.line_first.len();
        if line >= line_count {
            return Err(Error::LineOutOfRange { line, line_count });
        }
        let start = self.output.line_first[line] as usize;
        let end = self
            .output
            .line_first
            .get(line + 1)
            .map_or(self.output.clusters.len(), |&i| i as usize);
        Ok(&self.output.clusters[start..end])
    }

    /// The cluster after `sub`, clamped at the text end (the end sentinel
    /// is its own successor).
    pub fn next_substring(&mut self, sub: &SubString) -> SubString {
        self.ensure_layout();
        let index = cluster::cluster_for_offset(&self.output.clusters, self.text.len(), sub.offset);
        let next = (index + 1).min(self.output.clusters.len() - 1);
        self.output.clusters[next]
    }

    /// The cluster before `sub`, clamped at the text start.
    pub fn previous_substring(&mut self, sub: &SubString) -> SubString {
        self.ensure_layout();
        let index = cluster::cluster_for_offset(&self.output.clusters, self.text.len(), sub.offset);
        self.output.clusters[index.saturating_sub(1)]
    }

    /// Number of laid-out lines. Zero for empty text.
    pub fn line_count(&mut self) -> usize {
        self.ensure_layout();
        self.output.lines.len()
    }

    /// Extent of the laid-out text in pixels.
    pub fn size(&mut self) -> (i32, i32) {
        self.ensure_layout();
        (self.output.width, self.output.height)
    }

    /// The ordered draw operations of the current layout.
    pub fn draw_operations(&mut self) -> &[DrawOperation] {
        self.ensure_layout();
        &self.output.ops
    }

    /// Called by rendering engines after consuming the draw operations.
    /// A no-op if a mutation raced in since the layout pass.
    pub fn mark_engine_clean(&mut self) {
        if self.state.get() == TextState::EngineDirty {
            self.state.set(TextState::Clean);
        }
    }

    /// Runs the layout pass if the text or configuration changed.
    pub fn ensure_layout(&mut self) {
        if self.state.get() != TextState::LayoutDirty {
            return;
        }
        // Built into a fresh output and swapped in wholesale; the previous
        // layout stays valid if anything goes wrong before this returns.
        self.output = layout::layout_text(&self.font, &self.text, &self.config);
        self.layout_serial += 1;
        self.state.set(TextState::EngineDirty);
    }

    fn direction(&self) -> Direction {
        self.config.direction.unwrap_or_else(|| self.font.direction())
    }

    fn mark_dirty(&mut self) {
        self.state.set(TextState::LayoutDirty);
    }

    fn check_boundary(&self, offset: usize) -> Result<()> {
        if offset > self.text.len() {
            return Err(Error::OutOfBounds {
                offset,
                len: 0,
                text_len: self.text.len(),
            });
        }
        if !self.text.is_char_boundary(offset) {
            return Err(Error::NotCharBoundary { offset });
        }
        Ok(())
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<()> {
        let end = offset.checked_add(len).ok_or(Error::OutOfBounds {
            offset,
            len,
            text_len: self.text.len(),
        })?;
        if end > self.text.len() {
            return Err(Error::OutOfBounds {
                offset,
                len,
                text_len: self.text.len(),
            });
        }
        self.check_boundary(offset)?;
        if !self.text.is_char_boundary(end) {
            return Err(Error::NotCharBoundary { offset: end });
        }
        Ok(())
    }
}

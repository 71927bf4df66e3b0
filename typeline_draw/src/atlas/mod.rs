// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph bitmap atlas allocation.
//!
//! Glyph bitmaps are packed into fixed-size atlas pages so a renderer can
//! draw whole runs of text from a handful of textures. Pages are chained
//! lazily: when a bitmap fits no existing page a fresh one is opened.
//! Released regions go back to their page's free list and are reused for
//! later bitmaps of the exact same size.

pub(crate) mod key;
mod page;
mod region;

pub use key::GlyphKey;
pub use region::{AtlasEntry, AtlasRegion, EntryId};

pub(crate) use region::EntryArena;

use page::{AtlasPage, PageRect};

use crate::error::{Error, Result};

/// Padding in pixels on each side of a packed glyph, preventing texture
/// bleeding between neighbors when sampling with filtering.
pub const GLYPH_PADDING: u16 = 1;

/// Atlas page dimensions.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AtlasConfig {
    /// Width of every atlas page in pixels.
    pub page_width: u16,
    /// Height of every atlas page in pixels.
    pub page_height: u16,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            page_width: 1024,
            page_height: 1024,
        }
    }
}

/// Rectangle allocator over a chain of fixed-size atlas pages.
pub struct AtlasAllocator {
    config: AtlasConfig,
    pages: Vec<AtlasPage>,
}

impl AtlasAllocator {
    /// Creates an allocator with no pages; the first allocation opens one.
    pub fn new(config: AtlasConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
        }
    }

    /// Number of pages opened so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Configured page width.
    pub fn page_width(&self) -> u16 {
        self.config.page_width
    }

    /// Configured page height.
    pub fn page_height(&self) -> u16 {
        self.config.page_height
    }

    /// Allocates a region for a `width` x `height` glyph bitmap, trying
    /// every existing page before opening a new one.
    pub fn allocate(&mut self, width: u16, height: u16) -> Result<AtlasRegion> {
        let padded_w = u32::from(width) + 2 * u32::from(GLYPH_PADDING);
        let padded_h = u32::from(height) + 2 * u32::from(GLYPH_PADDING);
        if padded_w > u32::from(self.config.page_width)
            || padded_h > u32::from(self.config.page_height)
        {
            return Err(Error::GlyphTooLarge {
                width: padded_w,
                height: padded_h,
                page_width: self.config.page_width,
                page_height: self.config.page_height,
            });
        }
        let padded_w = padded_w as u16;
        let padded_h = padded_h as u16;

        for (index, page) in self.pages.iter_mut().enumerate() {
            if let Some(rect) = page.allocate(padded_w, padded_h) {
                return Ok(Self::region(index as u32, rect, width, height));
            }
        }

        let mut page = AtlasPage::new(self.config.page_width, self.config.page_height);
        let rect = page.allocate(padded_w, padded_h);
        let index = self.pages.len() as u32;
        self.pages.push(page);
        log::debug!(
            "opened atlas page {index} ({}x{})",
            self.config.page_width,
            self.config.page_height
        );
        match rect {
            Some(rect) => Ok(Self::region(index, rect, width, height)),
            // Unreachable given the size check above, but the error keeps
            // the contract without panicking.
            None => Err(Error::GlyphTooLarge {
                width: u32::from(padded_w),
                height: u32::from(padded_h),
                page_width: self.config.page_width,
                page_height: self.config.page_height,
            }),
        }
    }

    /// Returns a region to its page's free list.
    pub fn release(&mut self, region: AtlasRegion) {
        let Some(page) = self.pages.get_mut(region.page as usize) else {
            return;
        };
        page.release(PageRect {
            x: region.x - GLYPH_PADDING,
            y: region.y - GLYPH_PADDING,
            width: region.width + 2 * GLYPH_PADDING,
            height: region.height + 2 * GLYPH_PADDING,
        });
    }

    fn region(page: u32, rect: PageRect, width: u16, height: u16) -> AtlasRegion {
        AtlasRegion {
            page,
            x: rect.x + GLYPH_PADDING,
            y: rect.y + GLYPH_PADDING,
            width,
            height,
        }
    }
}

impl core::fmt::Debug for AtlasAllocator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AtlasAllocator")
            .field("pages", &self.pages.len())
            .field("config", &self.config)
            .finish()
    }
}

// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-page shelf packing with exact-size free-list reuse.

/// A padded rectangle within one page, as handed out by the packer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) struct PageRect {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) width: u16,
    pub(crate) height: u16,
}

impl PageRect {
    fn area(&self) -> u32 {
        u32::from(self.width) * u32::from(self.height)
    }
}

/// One horizontal shelf: glyphs of similar height packed left to right.
struct Shelf {
    y: u16,
    height: u16,
    cursor: u16,
}

/// A fixed-size atlas page.
///
/// Allocation strategy, in order: reuse a released rectangle of the exact
/// same size, then append to an existing shelf tall enough to hold the
/// glyph, then open a new shelf below the last one. Released rectangles are
/// kept sorted smallest-area-first so reuse always picks the tightest exact
/// match and the scan can stop early.
pub(crate) struct AtlasPage {
    width: u16,
    height: u16,
    shelves: Vec<Shelf>,
    next_shelf_y: u16,
    free: Vec<PageRect>,
}

impl AtlasPage {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            shelves: Vec::new(),
            next_shelf_y: 0,
            free: Vec::new(),
        }
    }

    /// Allocates a `width` x `height` rectangle (padded dimensions).
    pub(crate) fn allocate(&mut self, width: u16, height: u16) -> Option<PageRect> {
        let area = u32::from(width) * u32::from(height);
        for (i, rect) in self.free.iter().enumerate() {
            if rect.area() > area {
                break;
            }
            if rect.width == width && rect.height == height {
                log::trace!("atlas free-list reuse at ({}, {})", rect.x, rect.y);
                return Some(self.free.remove(i));
            }
        }

        for shelf in &mut self.shelves {
            if height <= shelf.height && u32::from(shelf.cursor) + u32::from(width) <= u32::from(self.width) {
                let rect = PageRect {
                    x: shelf.cursor,
                    y: shelf.y,
                    width,
                    height,
                };
                shelf.cursor += width;
                return Some(rect);
            }
        }

        if width <= self.width && u32::from(self.next_shelf_y) + u32::from(height) <= u32::from(self.height) {
            let y = self.next_shelf_y;
            self.next_shelf_y += height;
            self.shelves.push(Shelf {
                y,
                height,
                cursor: width,
            });
            return Some(PageRect {
                x: 0,
                y,
                width,
                height,
            });
        }

        None
    }

    /// Returns a previously allocated rectangle to the free list, keeping
    /// the list sorted by area.
    pub(crate) fn release(&mut self, rect: PageRect) {
        let at = self.free.partition_point(|r| r.area() < rect.area());
        self.free.insert(at, rect);
    }

    #[cfg(test)]
    pub(crate) fn free_list_len(&self) -> usize {
        self.free.len()
    }
}

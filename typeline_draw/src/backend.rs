// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render backend boundary and the CPU reference backend.

use typeline::{Bitmap, ImageKind};

/// Texture storage driven by the glyph engine.
///
/// Calls are synchronous; an implementation over a GPU queue may stall on
/// submission. Pages are identified by creation order, matching the
/// allocator's page indices.
pub trait RenderBackend {
    /// Creates one atlas page of the given dimensions.
    fn create_page(&mut self, width: u16, height: u16);

    /// Uploads a glyph bitmap at `(x, y)` within `page`.
    fn upload(&mut self, page: u32, x: u16, y: u16, bitmap: &Bitmap);
}

/// An RGBA8 image owned by [`CpuBackend`].
#[derive(Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u16,
    height: u16,
    data: Vec<u8>,
}

impl Pixmap {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            data: vec![0; usize::from(width) * usize::from(height) * 4],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Tightly packed RGBA8 rows.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u16, y: u16) -> [u8; 4] {
        let i = (usize::from(y) * usize::from(self.width) + usize::from(x)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    fn write(&mut self, x: u16, y: u16, rgba: [u8; 4]) {
        let i = (usize::from(y) * usize::from(self.width) + usize::from(x)) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }
}

impl core::fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pixmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Software backend storing every page as an RGBA8 [`Pixmap`].
///
/// Alpha bitmaps are expanded to white-with-coverage on upload so all pages
/// share one pixel layout; a blitter tints at draw time.
#[derive(Default, Debug)]
pub struct CpuBackend {
    pages: Vec<Pixmap>,
}

impl CpuBackend {
    /// Creates a backend with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// The page pixmaps, in creation order.
    pub fn pages(&self) -> &[Pixmap] {
        &self.pages
    }
}

impl RenderBackend for CpuBackend {
    fn create_page(&mut self, width: u16, height: u16) {
        self.pages.push(Pixmap::new(width, height));
    }

    fn upload(&mut self, page: u32, x: u16, y: u16, bitmap: &Bitmap) {
        let Some(pixmap) = self.pages.get_mut(page as usize) else {
            return;
        };
        let bpp = bitmap.kind.bytes_per_pixel();
        for row in 0..bitmap.height {
            for col in 0..bitmap.width {
                let i = (usize::from(row) * usize::from(bitmap.width) + usize::from(col)) * bpp;
                let rgba = match bitmap.kind {
                    ImageKind::Alpha => {
                        let a = bitmap.data[i];
                        [0xFF, 0xFF, 0xFF, a]
                    }
                    ImageKind::Color | ImageKind::Subpixel => [
                        bitmap.data[i],
                        bitmap.data[i + 1],
                        bitmap.data[i + 2],
                        bitmap.data[i + 3],
                    ],
                };
                pixmap.write(x + col, y + row, rgba);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_upload_expands_to_white_coverage() {
        let mut backend = CpuBackend::new();
        backend.create_page(8, 8);
        backend.upload(
            0,
            2,
            3,
            &Bitmap {
                width: 2,
                height: 1,
                left: 0,
                top: 0,
                kind: ImageKind::Alpha,
                data: vec![0x40, 0x80],
            },
        );
        let page = &backend.pages()[0];
        assert_eq!(page.pixel(2, 3), [0xFF, 0xFF, 0xFF, 0x40]);
        assert_eq!(page.pixel(3, 3), [0xFF, 0xFF, 0xFF, 0x80]);
        assert_eq!(page.pixel(4, 3), [0, 0, 0, 0]);
    }
}

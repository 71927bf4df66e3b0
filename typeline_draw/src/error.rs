// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors produced while preparing text for rendering.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// A glyph bitmap exceeds the atlas page dimensions.
    ///
    /// The page size is fixed at engine construction, so retrying cannot
    /// succeed; the caller must rebuild the engine with larger pages or
    /// render the glyph outside the atlas.
    #[error(
        "glyph of {width}x{height} px does not fit an atlas page of {page_width}x{page_height} px"
    )]
    GlyphTooLarge {
        /// Padded glyph width in pixels.
        width: u32,
        /// Padded glyph height in pixels.
        height: u32,
        /// Configured page width.
        page_width: u16,
        /// Configured page height.
        page_height: u16,
    },
}

/// Alias for a `Result` with the error type [`enum@Error`].
pub type Result<T> = core::result::Result<T, Error>;

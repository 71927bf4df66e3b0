// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for layout and editing operations.

/// Errors produced by layout passes and text mutations.
///
/// A failed mutation or layout pass never leaves a [`TextObject`] in a
/// half-updated state: the previously laid-out clusters and draw operations
/// remain valid and queryable.
///
/// [`TextObject`]: crate::TextObject
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A byte offset passed to an editing operation does not fall on a UTF-8
    /// character boundary. Boundary responsibility sits with the caller.
    #[error("byte offset {offset} is not a UTF-8 character boundary")]
    NotCharBoundary {
        /// The offending offset.
        offset: usize,
    },

    /// A byte offset or range lies outside the text.
    #[error("byte range at {offset} of length {len} exceeds text length {text_len}")]
    OutOfBounds {
        /// Start of the requested range.
        offset: usize,
        /// Length of the requested range.
        len: usize,
        /// Length of the text at the time of the call.
        text_len: usize,
    },

    /// A line index beyond the laid-out line count.
    #[error("line index {line} out of range ({line_count} lines)")]
    LineOutOfRange {
        /// The requested line.
        line: usize,
        /// Number of lines in the current layout.
        line_count: usize,
    },
}

/// Alias for results returned by this crate.
pub type Result<T> = core::result::Result<T, Error>;

// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas, cache, and engine tests over a deterministic mock raster face.

pub(crate) mod utils;

mod test_cache;
mod test_engine;

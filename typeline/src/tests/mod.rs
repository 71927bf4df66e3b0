// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout and editing tests over a deterministic mock raster face.

mod utils;

mod test_fallback;

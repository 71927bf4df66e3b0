// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use typeline::ImageKind;

use super::utils::test_env;
use crate::atlas::{AtlasAllocator, AtlasConfig, GlyphKey};
use crate::cache::GlyphCache;

fn small_allocator() -> AtlasAllocator {
    AtlasAllocator::new(AtlasConfig {
        page_width: 64,
        page_height: 64,
    })
}

#[test]
fn entry_lives_until_last_release() {
    let (_lib, font) = test_env();
    let mut allocator = small_allocator();
    let mut cache = GlyphCache::new();

    let region = allocator.allocate(6, 10).unwrap();
    let id = cache.insert(&font, 42, region, ImageKind::Alpha);
    cache.retain(id);
    cache.retain(id);

    cache.release(&mut allocator, id);
    assert_eq!(cache.len(), 1, "one reference still outstanding");
    assert!(cache.lookup(GlyphKey::new(font.id(), 42)).is_some());

    cache.release(&mut allocator, id);
    assert!(cache.is_empty());
    assert!(cache.lookup(GlyphKey::new(font.id(), 42)).is_none());

    // The freed region is reusable at the exact same spot.
    assert_eq!(allocator.allocate(6, 10).unwrap(), region);
}

#[test]
fn lookup_counts_hits_and_misses() {
    let (_lib, font) = test_env();
    let mut allocator = small_allocator();
    let mut cache = GlyphCache::new();

    assert!(cache.get(&mut allocator, &font, 42).is_none());
    let region = allocator.allocate(6, 10).unwrap();
    cache.insert(&font, 42, region, ImageKind::Alpha);
    assert!(cache.get(&mut allocator, &font, 42).is_some());

    assert_eq!((cache.hits(), cache.misses()), (1, 1));
    cache.clear_stats();
    assert_eq!((cache.hits(), cache.misses()), (0, 0));
}

#[test]
fn generation_change_drops_the_whole_bucket() {
    let (_lib, font) = test_env();
    let mut allocator = small_allocator();
    let mut cache = GlyphCache::new();

    let first = allocator.allocate(6, 10).unwrap();
    let a = cache.insert(&font, 1, first, ImageKind::Alpha);
    let second = allocator.allocate(6, 10).unwrap();
    cache.insert(&font, 2, second, ImageKind::Alpha);
    cache.retain(a);
    assert_eq!(cache.len(), 2);

    font.set_size(24.0);
    assert!(cache.get(&mut allocator, &font, 1).is_none());
    assert!(cache.is_empty(), "refcounts do not survive a generation clear");

    // Both regions went back to the allocator.
    let reused = [allocator.allocate(6, 10).unwrap(), allocator.allocate(6, 10).unwrap()];
    assert!(reused.contains(&first));
    assert!(reused.contains(&second));

    // Releasing the handle that outlived the clear is a harmless no-op.
    cache.release(&mut allocator, a);
    assert!(cache.is_empty());
}

#[test]
fn buckets_are_independent_per_font() {
    let (lib, font_a) = test_env();
    let font_b = typeline::Font::new(
        &lib,
        Box::new(super::utils::DrawFace::ascii()),
        16.0,
    );
    let mut allocator = small_allocator();
    let mut cache = GlyphCache::new();

    let ra = allocator.allocate(6, 10).unwrap();
    cache.insert(&font_a, 1, ra, ImageKind::Alpha);
    let rb = allocator.allocate(6, 10).unwrap();
    cache.insert(&font_b, 1, rb, ImageKind::Alpha);

    font_a.set_size(24.0);
    assert!(cache.get(&mut allocator, &font_a, 1).is_none());
    assert!(cache.get(&mut allocator, &font_b, 1).is_some());
    assert_eq!(cache.len(), 1);
}

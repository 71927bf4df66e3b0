// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use typeline::{Font, FontStyle, TextObject, TextState};

use super::utils::{DrawFace, RecordingBackend, test_env};
use crate::atlas::AtlasConfig;
use crate::engine::{DrawBatch, GlyphEngine};
use crate::error::Error;

fn recording_engine() -> GlyphEngine<RecordingBackend> {
    GlyphEngine::new(RecordingBackend::default())
}

#[test]
fn prepare_uploads_each_distinct_glyph_once() {
    let (_lib, font) = test_env();
    let mut engine = recording_engine();
    let mut text = TextObject::new(&font, "abab");

    let prepared = engine.prepare(&mut text).unwrap();
    let [DrawBatch::Glyphs { page: 0, quads, .. }] = prepared.batches() else {
        panic!("expected one glyph batch, got {:?}", prepared.batches());
    };
    assert_eq!(quads.len(), 4, "every occurrence draws");

    assert_eq!(engine.backend().uploads.len(), 2, "distinct glyphs upload");
    assert_eq!(engine.backend().pages.len(), 1);
    assert_eq!(engine.cache().len(), 2);
    assert_eq!(text.state(), TextState::Clean);
}

#[test]
fn unchanged_text_reuses_prepared_state() {
    let (_lib, font) = test_env();
    let mut engine = recording_engine();
    let mut text = TextObject::new(&font, "ab");

    engine.prepare(&mut text).unwrap();
    let serial = text.layout_serial();
    engine.prepare(&mut text).unwrap();

    assert_eq!(text.layout_serial(), serial);
    assert_eq!(engine.backend().uploads.len(), 2, "no re-upload");
}

#[test]
fn edit_reprepares_with_cached_glyphs() {
    let (_lib, font) = test_env();
    let mut engine = recording_engine();
    let mut text = TextObject::new(&font, "ab");
    engine.prepare(&mut text).unwrap();

    text.insert(2, "a").unwrap();
    engine.prepare(&mut text).unwrap();

    // 'a' and 'b' were already resident; nothing new uploads.
    assert_eq!(engine.backend().uploads.len(), 2);
    assert_eq!(engine.cache().len(), 2);
    assert_eq!(engine.stats().cache_hits, 2);
}

#[test]
fn texts_share_glyphs_until_the_last_discard() {
    // Scenario E: two texts over the same glyphs hold one region each.
    let (_lib, font) = test_env();
    let mut engine = recording_engine();
    let mut a = TextObject::new(&font, "ab");
    let mut b = TextObject::new(&font, "ab");

    engine.prepare(&mut a).unwrap();
    engine.prepare(&mut b).unwrap();
    assert_eq!(engine.backend().uploads.len(), 2, "second text hits the cache");

    engine.discard(a.id());
    assert_eq!(engine.cache().len(), 2, "b still references both glyphs");

    engine.discard(b.id());
    assert_eq!(engine.cache().len(), 0);

    // Freed regions are reused for the next text's equally sized bitmaps.
    let mut c = TextObject::new(&font, "cd");
    engine.prepare(&mut c).unwrap();
    assert_eq!(engine.stats().pages, 1);
    let uploads = &engine.backend().uploads;
    let first: Vec<(u16, u16)> = uploads[..2].iter().map(|u| (u.x, u.y)).collect();
    let last: Vec<(u16, u16)> = uploads[2..].iter().map(|u| (u.x, u.y)).collect();
    for at in &last {
        assert!(first.contains(at), "upload at {at:?} should reuse a freed region");
    }
}

#[test]
fn underline_fill_batches_before_glyphs() {
    let (_lib, font) = test_env();
    font.set_style(FontStyle::UNDERLINE);
    let mut engine = recording_engine();
    let mut text = TextObject::new(&font, "ab");

    let prepared = engine.prepare(&mut text).unwrap();
    let batches = prepared.batches();
    assert_eq!(batches.len(), 2);
    assert!(matches!(&batches[0], DrawBatch::Fill { rects } if rects.len() == 1));
    assert!(matches!(&batches[1], DrawBatch::Glyphs { .. }));
}

#[test]
fn raster_failure_skips_the_glyph() {
    let library = typeline::Library::init();
    let face = DrawFace::failing();
    let calls = face.raster_calls();
    let font = Font::new(&library, Box::new(face), 16.0);
    let mut engine = recording_engine();
    let mut text = TextObject::new(&font, "ab");

    let prepared = engine.prepare(&mut text).unwrap();
    assert!(prepared.batches().is_empty());
    assert_eq!(calls.get(), 2);
    assert_eq!(engine.cache().len(), 0);
    assert!(engine.backend().uploads.is_empty());
}

#[test]
fn oversized_glyph_fails_prepare() {
    let library = typeline::Library::init();
    let font = Font::new(&library, Box::new(DrawFace::with_ink(100, 100)), 16.0);
    let mut engine = GlyphEngine::with_config(
        RecordingBackend::default(),
        AtlasConfig {
            page_width: 64,
            page_height: 64,
        },
    );
    let mut text = TextObject::new(&font, "a");

    assert!(matches!(
        engine.prepare(&mut text),
        Err(Error::GlyphTooLarge { .. })
    ));
    assert_ne!(text.state(), TextState::Clean, "a failed pass stays dirty");
}

#[test]
fn failed_build_releases_partial_entries() {
    // 'a' allocates first (larger area); the oversized 'b' then fails the
    // build, which must roll back the entry 'a' already claimed.
    let library = typeline::Library::init();
    let font = Font::new(&library, Box::new(DrawFace::with_wide_glyph('b', 40, 1)), 16.0);
    let mut engine = GlyphEngine::with_config(
        RecordingBackend::default(),
        AtlasConfig {
            page_width: 32,
            page_height: 32,
        },
    );
    let mut text = TextObject::new(&font, "ab");

    assert!(matches!(
        engine.prepare(&mut text),
        Err(Error::GlyphTooLarge { .. })
    ));
    assert!(engine.cache().is_empty(), "no refcount-0 residue");
    assert!(engine.prepared(text.id()).is_none());
    assert_eq!(engine.backend().uploads.len(), 1);

    // With the oversized glyph gone, the freed region is reused.
    text.set_text("a");
    engine.prepare(&mut text).unwrap();
    assert_eq!(engine.cache().len(), 1);
    let uploads = &engine.backend().uploads;
    assert_eq!((uploads[1].x, uploads[1].y), (uploads[0].x, uploads[0].y));
}

#[test]
fn overflow_spills_to_a_second_page() {
    // 6x10 ink pads to 8x12; a 16x16 page holds exactly two glyphs.
    let (_lib, font) = test_env();
    let mut engine = GlyphEngine::with_config(
        RecordingBackend::default(),
        AtlasConfig {
            page_width: 16,
            page_height: 16,
        },
    );
    let mut text = TextObject::new(&font, "abcd");

    engine.prepare(&mut text).unwrap();
    assert_eq!(engine.stats().pages, 2);
    assert_eq!(engine.backend().pages.len(), 2);
    let on_second = engine
        .backend()
        .uploads
        .iter()
        .filter(|u| u.page == 1)
        .count();
    assert_eq!(on_second, 2);
}

#[test]
fn generation_change_reuploads_into_freed_regions() {
    let (_lib, font) = test_env();
    let mut engine = recording_engine();
    let mut text = TextObject::new(&font, "ab");
    engine.prepare(&mut text).unwrap();

    font.set_size(24.0);
    assert_eq!(text.state(), TextState::LayoutDirty);
    engine.prepare(&mut text).unwrap();

    assert_eq!(engine.cache().len(), 2, "fresh entries only");
    assert_eq!(engine.backend().uploads.len(), 4);
    assert_eq!(engine.stats().pages, 1, "freed regions were reused");
}

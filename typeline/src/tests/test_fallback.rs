// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::utils::{TestFace, test_env};
use crate::engine::Library;
use crate::font::{Direction, Font, Script};
use crate::layout::draw::DrawOperation;
use crate::shape;
use crate::text::TextObject;

const CHECK: char = '\u{2713}';

fn check_font(library: &Library) -> Font {
    Font::new(
        library,
        Box::new(TestFace::with_coverage(|ch| ch == CHECK)),
        16.0,
    )
}

/// Fonts of every Copy operation, in paint order.
fn op_fonts(text: &mut TextObject) -> Vec<Font> {
    text.draw_operations()
        .iter()
        .filter_map(|op| match op {
            DrawOperation::Copy { glyph, .. } => Some(glyph.font.clone()),
            DrawOperation::Fill { .. } => None,
        })
        .collect()
}

#[test]
fn missing_glyph_resolves_through_fallback() {
    // Scenario D: the check mark lives only in the fallback face.
    let (library, primary) = test_env();
    let fallback = check_font(&library);
    primary.add_fallback(&fallback);

    let mut text = TextObject::new(&primary, "a\u{2713}b");
    let fonts = op_fonts(&mut text);
    assert_eq!(fonts.len(), 3);
    assert_eq!(fonts[0], primary);
    assert_eq!(fonts[1], fallback);
    assert_eq!(fonts[2], primary);
}

#[test]
fn unresolvable_glyph_renders_tofu_from_primary() {
    let (_lib, primary) = test_env();
    let mut text = TextObject::new(&primary, "\u{2713}");
    let ops = text.draw_operations();
    match &ops[0] {
        DrawOperation::Copy { glyph, .. } => {
            assert_eq!(glyph.font, primary);
            assert_eq!(glyph.glyph_id, 0, "notdef glyph");
        }
        other => panic!("expected a glyph copy, got {other:?}"),
    }
}

#[test]
fn fallback_chain_searches_depth_first() {
    let (library, primary) = test_env();
    let empty = Font::new(&library, Box::new(TestFace::with_coverage(|_| false)), 16.0);
    let target = check_font(&library);
    // primary -> empty -> target
    empty.add_fallback(&target);
    primary.add_fallback(&empty);

    let mut text = TextObject::new(&primary, "\u{2713}");
    assert_eq!(op_fonts(&mut text), vec![target]);
}

#[test]
fn cyclic_fallback_graph_terminates() {
    let (library, a) = test_env();
    let b = Font::new(&library, Box::new(TestFace::with_coverage(|_| false)), 16.0);
    a.add_fallback(&b);
    b.add_fallback(&a);
    b.add_fallback(&b);

    // No font covers the check mark; resolution must still finish (tofu).
    let mut text = TextObject::new(&a, "\u{2713}\u{2713}");
    let fonts = op_fonts(&mut text);
    assert_eq!(fonts, vec![a.clone(), a]);
}

#[test]
fn adding_a_fallback_relayouts_existing_text() {
    let (library, primary) = test_env();
    let mut text = TextObject::new(&primary, "\u{2713}");
    assert_eq!(op_fonts(&mut text), vec![primary.clone()]);

    let fallback = check_font(&library);
    primary.add_fallback(&fallback);
    assert_eq!(op_fonts(&mut text), vec![fallback]);
}

#[test]
fn position_cache_returns_the_stored_run() {
    let (_lib, font) = test_env();
    let dir = Direction::LeftToRight;
    let script = Script::COMMON;

    let first = shape::positions(&font, "hello", dir, script);
    let second = shape::positions(&font, "hello", dir, script);
    assert!(std::rc::Rc::ptr_eq(&first, &second), "second call is a hit");

    // Same bytes under another direction is a distinct key.
    let vertical = shape::positions(&font, "hello", Direction::TopToBottom, script);
    assert!(!std::rc::Rc::ptr_eq(&first, &vertical));
}

#[test]
fn position_cache_evicts_round_robin() {
    let (_lib, font) = test_env();
    let dir = Direction::LeftToRight;
    let script = Script::COMMON;

    let first = shape::positions(&font, "run-0", dir, script);
    // Fill the remaining seven slots, then one more to evict "run-0".
    for i in 1..=8 {
        shape::positions(&font, &format!("run-{i}"), dir, script);
    }
    let again = shape::positions(&font, "run-0", dir, script);
    assert!(!std::rc::Rc::ptr_eq(&first, &again), "slot was recycled");
}

#[test]
fn glyph_index_lookups_are_cached_per_font() {
    let library = Library::init();
    let face = TestFace::ascii();
    let counters = face.counters();
    let font = Font::new(&library, Box::new(face), 16.0);

    let mut text = TextObject::new(&font, "aaaa");
    text.ensure_layout();
    assert_eq!(counters.glyph_index_calls.get(), 1);

    // A generation bump drops the codepoint cache.
    font.set_size(24.0);
    text.ensure_layout();
    assert_eq!(counters.glyph_index_calls.get(), 2);
}

//! Integration tests — the layout engine, staff positioning, and the
//! end-to-end spacing pass.

use engrave::layout::{ledger_line_count, staff_y, stem_up_for};
use engrave::{
    layout_score, parse_description, parse_pitch, ClefType, ElementLayout, IdSource, LayoutParams,
    Score,
};
use pretty_assertions::assert_eq;

fn parse(json: &str) -> Score {
    let mut ids = IdSource::new();
    parse_description(json, &mut ids).expect("description should parse")
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ─── Staff positions ────────────────────────────────────────────────

#[test]
fn staff_positions_per_clef() {
    let c4 = parse_pitch("C4");
    assert_eq!(c4.staff_position(ClefType::Treble), 0);
    assert_eq!(c4.staff_position(ClefType::Bass), 12);
    assert_eq!(c4.staff_position(ClefType::Alto), 6);
    assert_eq!(c4.staff_position(ClefType::Tenor), 8);

    assert_eq!(parse_pitch("G4").staff_position(ClefType::Treble), 4);
    assert_eq!(parse_pitch("C5").staff_position(ClefType::Treble), 7);
    assert_eq!(parse_pitch("B3").staff_position(ClefType::Treble), -1);
}

#[test]
fn enharmonic_pitches_share_a_staff_position() {
    assert_eq!(
        parse_pitch("C#4").staff_position(ClefType::Treble),
        parse_pitch("C4").staff_position(ClefType::Treble)
    );
    assert_eq!(
        parse_pitch("F#5").staff_position(ClefType::Treble),
        parse_pitch("F5").staff_position(ClefType::Treble)
    );
}

#[test]
fn percussion_clef_pins_everything_to_center() {
    for s in ["C1", "C4", "G7"] {
        assert_eq!(parse_pitch(s).staff_position(ClefType::Percussion), 4);
    }
}

#[test]
fn midi_numbers() {
    assert_eq!(parse_pitch("C4").midi(), 60);
    assert_eq!(parse_pitch("A4").midi(), 69);
}

// ─── Vertical rules ─────────────────────────────────────────────────

#[test]
fn staff_y_runs_downward_from_top_line() {
    let params = LayoutParams::default(); // staff_space = 10
    assert_close(staff_y(8, &params), 0.0); // top line
    assert_close(staff_y(4, &params), 20.0); // middle line
    assert_close(staff_y(0, &params), 40.0); // bottom line
    assert_close(staff_y(-2, &params), 50.0); // below the staff
}

#[test]
fn stem_direction_splits_at_middle_line() {
    assert!(stem_up_for(0));
    assert!(stem_up_for(4));
    assert!(!stem_up_for(5));
    assert!(!stem_up_for(8));
}

#[test]
fn ledger_line_counts() {
    // Inside the staff: none
    for pos in 0..=8 {
        assert_eq!(ledger_line_count(pos), 0, "position {pos}");
    }
    // Below
    assert_eq!(ledger_line_count(-1), 1);
    assert_eq!(ledger_line_count(-2), 2);
    assert_eq!(ledger_line_count(-3), 2);
    assert_eq!(ledger_line_count(-4), 3);
    // Above
    assert_eq!(ledger_line_count(9), 1);
    assert_eq!(ledger_line_count(10), 2);
    assert_eq!(ledger_line_count(11), 2);
}

// ─── Header ─────────────────────────────────────────────────────────

#[test]
fn header_width_scales_with_key_signature() {
    let params = LayoutParams::default();
    let c_major = parse(r#"{"keySignature": "C", "measures": []}"#);
    let d_major = parse(r#"{"keySignature": "D", "measures": []}"#);

    let base = layout_score(&c_major, &params).header_width;
    let with_sharps = layout_score(&d_major, &params).header_width;

    // D major adds two accidental glyphs
    assert_close(with_sharps - base, 2.0 * params.accidental_width * params.staff_space);

    // Composition: clef + gaps + time signature + measure gap
    let expected_base = (params.clef_width
        + params.key_signature_gap
        + params.time_signature_gap
        + params.time_signature_width
        + params.measure_gap)
        * params.staff_space;
    assert_close(base, expected_base);
}

#[test]
fn header_width_scales_linearly_with_staff_space() {
    let score = parse(r#"{"keySignature": "A", "measures": []}"#);
    let at_10 = layout_score(&score, &LayoutParams::with_staff_space(10.0));
    let at_15 = layout_score(&score, &LayoutParams::with_staff_space(15.0));
    assert_close(at_15.header_width, at_10.header_width * 1.5);
    assert_close(at_15.staff_height, 60.0);
}

// ─── Element layout ─────────────────────────────────────────────────

#[test]
fn end_to_end_four_eighths() {
    let score = parse(
        r#"{"timeSignature": "4/4", "measures": [{"elements": [
            {"type": "note", "pitch": "C4", "duration": 0.5},
            {"type": "note", "pitch": "D4", "duration": 0.5},
            {"type": "note", "pitch": "E4", "duration": 0.5},
            {"type": "note", "pitch": "F4", "duration": 0.5}
        ]}]}"#,
    );
    let layout = layout_score(&score, &LayoutParams::default());

    assert_eq!(layout.measures.len(), 1);
    let measure = &layout.measures[0];
    assert_eq!(measure.elements.len(), 4);

    let notes: Vec<_> = measure
        .elements
        .iter()
        .map(|e| match e {
            ElementLayout::Note(n) => n,
            other => panic!("expected note layout, got {other:?}"),
        })
        .collect();

    // Two beam groups of two, per quarter beat
    assert_eq!(notes[0].beam_group, notes[1].beam_group);
    assert_eq!(notes[2].beam_group, notes[3].beam_group);
    assert!(notes[0].beam_group.is_some());
    assert!(notes[2].beam_group.is_some());
    assert_ne!(notes[0].beam_group, notes[2].beam_group);

    // Beamed notes carry no flags
    assert!(notes.iter().all(|n| n.flag_count == 0));

    // C4..F4 all sit at or below the middle line: stems up, no ledgers
    assert!(notes.iter().all(|n| n.stem_up));
    assert!(notes.iter().all(|n| n.ledger_line_count == 0));

    // X strictly increases left to right
    for pair in notes.windows(2) {
        assert!(pair[0].x < pair[1].x, "{} < {}", pair[0].x, pair[1].x);
    }

    // First note starts one measure gap past the header
    let params = LayoutParams::default();
    assert_close(
        notes[0].x,
        layout.header_width + params.measure_gap * params.staff_space,
    );
    assert_close(measure.end_x, layout.total_width);
    assert_close(measure.width, measure.end_x - measure.start_x);
}

#[test]
fn lone_eighth_gets_a_flag() {
    let score = parse(
        r#"{"measures": [{"elements": [
            {"type": "note", "pitch": "C4", "duration": 1.0},
            {"type": "note", "pitch": "D4", "duration": 0.5},
            {"type": "note", "pitch": "E4", "duration": 1.0}
        ]}]}"#,
    );
    let layout = layout_score(&score, &LayoutParams::default());
    match &layout.measures[0].elements[1] {
        ElementLayout::Note(n) => {
            assert_eq!(n.beam_group, None);
            assert_eq!(n.flag_count, 1);
        }
        other => panic!("expected note layout, got {other:?}"),
    }
}

#[test]
fn longer_durations_claim_more_width() {
    let score = parse(
        r#"{"measures": [{"elements": [
            {"type": "note", "pitch": "C4", "duration": 0.5},
            {"type": "note", "pitch": "D4", "duration": 1.0},
            {"type": "note", "pitch": "E4", "duration": 2.0},
            {"type": "note", "pitch": "F4", "duration": 1.0}
        ]}]}"#,
    );
    let layout = layout_score(&score, &LayoutParams::default());
    let xs: Vec<f64> = layout.measures[0].elements.iter().map(|e| e.x()).collect();

    let eighth_advance = xs[1] - xs[0];
    let quarter_advance = xs[2] - xs[1];
    let half_advance = xs[3] - xs[2];
    assert!(eighth_advance < quarter_advance);
    assert!(quarter_advance < half_advance);
    // Sub-linear growth: doubling the duration less than doubles the room
    assert!(half_advance < 2.0 * quarter_advance);
}

#[test]
fn elements_lay_out_in_onset_order() {
    // Voice 2 is listed after voice 1 but starts at beat 0
    let score = parse(
        r#"{"measures": [{"elements": [
            {"type": "note", "pitch": "C5", "duration": 2.0, "voice": 1},
            {"type": "note", "pitch": "E5", "duration": 2.0, "voice": 1},
            {"type": "note", "pitch": "C3", "duration": 4.0, "voice": 2}
        ]}]}"#,
    );
    let layout = layout_score(&score, &LayoutParams::default());
    let ids: Vec<u64> = layout.measures[0].elements.iter().map(|e| e.id().0).collect();

    // Onset order: voice-1 C5 (0.0), voice-2 C3 (0.0), voice-1 E5 (2.0)
    assert_eq!(ids, vec![0, 2, 1]);
}

#[test]
fn chord_second_adjustment_offsets_one_head() {
    let score = parse(
        r#"{"measures": [{"elements": [
            {"type": "chord", "pitches": ["C4", "D4", "G4"], "duration": 1.0}
        ]}]}"#,
    );
    let params = LayoutParams::default();
    let layout = layout_score(&score, &params);

    let chord = match &layout.measures[0].elements[0] {
        ElementLayout::Chord(c) => c,
        other => panic!("expected chord layout, got {other:?}"),
    };

    // Average position (0+1+4)/3 is below the middle line: stem up
    assert!(chord.stem_up);
    assert_eq!(chord.notes.len(), 3);

    // Heads are sorted bottom-up; C4-D4 is the colliding second
    let offsets: Vec<f64> = chord.notes.iter().map(|n| n.x_offset).collect();
    let shifted: Vec<&f64> = offsets.iter().filter(|o| **o != 0.0).collect();
    assert_eq!(shifted.len(), 1, "exactly one head shifts, got {offsets:?}");

    // Stem up: the shift goes left, one notehead width
    assert_close(chord.notes[1].x_offset, -params.notehead_width * params.staff_space);
    assert_close(chord.notes[0].x_offset, 0.0);
    assert_close(chord.notes[2].x_offset, 0.0);
}

#[test]
fn stacked_seconds_alternate_offsets() {
    // C4-D4-E4: adjacent seconds; offsets must alternate, never two in
    // a row
    let score = parse(
        r#"{"measures": [{"elements": [
            {"type": "chord", "pitches": ["C4", "D4", "E4"], "duration": 1.0}
        ]}]}"#,
    );
    let layout = layout_score(&score, &LayoutParams::default());
    let chord = match &layout.measures[0].elements[0] {
        ElementLayout::Chord(c) => c,
        other => panic!("expected chord layout, got {other:?}"),
    };

    assert_eq!(chord.notes[0].x_offset, 0.0);
    assert!(chord.notes[1].x_offset != 0.0);
    assert_eq!(chord.notes[2].x_offset, 0.0);
}

#[test]
fn high_chord_stems_down_and_offsets_right() {
    let score = parse(
        r#"{"measures": [{"elements": [
            {"type": "chord", "pitches": ["C5", "D5", "F5"], "duration": 1.0}
        ]}]}"#,
    );
    let params = LayoutParams::default();
    let layout = layout_score(&score, &params);
    let chord = match &layout.measures[0].elements[0] {
        ElementLayout::Chord(c) => c,
        other => panic!("expected chord layout, got {other:?}"),
    };

    assert!(!chord.stem_up);
    assert_close(chord.notes[1].x_offset, params.notehead_width * params.staff_space);
}

#[test]
fn rests_center_on_the_staff() {
    let score = parse(
        r#"{"measures": [{"elements": [
            {"type": "note", "pitch": "C6", "duration": 1.0},
            {"type": "rest", "duration": 1.0}
        ]}]}"#,
    );
    let params = LayoutParams::default();
    let layout = layout_score(&score, &params);
    match &layout.measures[0].elements[1] {
        ElementLayout::Rest(r) => assert_close(r.y, staff_y(4, &params)),
        other => panic!("expected rest layout, got {other:?}"),
    }
}

#[test]
fn ledger_lines_above_and_below() {
    let score = parse(
        r#"{"measures": [{"elements": [
            {"type": "note", "pitch": "A3", "duration": 1.0},
            {"type": "note", "pitch": "C6", "duration": 1.0}
        ]}]}"#,
    );
    let layout = layout_score(&score, &LayoutParams::default());
    let counts: Vec<u32> = layout.measures[0]
        .elements
        .iter()
        .map(|e| match e {
            ElementLayout::Note(n) => n.ledger_line_count,
            other => panic!("expected note layout, got {other:?}"),
        })
        .collect();

    // A3 is position -2 (below), C6 is position 14 (above)
    assert_eq!(counts, vec![2, 4]);
}

// ─── Degenerate input ───────────────────────────────────────────────

#[test]
fn empty_score_still_lays_out() {
    let score = parse(r#"{"measures": []}"#);
    let layout = layout_score(&score, &LayoutParams::default());
    assert!(layout.measures.is_empty());
    assert_close(layout.total_width, layout.header_width);
}

#[test]
fn empty_measure_still_lays_out() {
    let score = parse(r#"{"measures": [{"elements": []}]}"#);
    let params = LayoutParams::default();
    let layout = layout_score(&score, &params);
    assert_eq!(layout.measures.len(), 1);
    assert_close(
        layout.measures[0].width,
        2.0 * params.measure_gap * params.staff_space,
    );
}

#[test]
fn zero_duration_element_claims_no_width() {
    let score = parse(
        r#"{"measures": [{"elements": [
            {"type": "note", "pitch": "C4", "duration": 0.0},
            {"type": "note", "pitch": "D4", "duration": 1.0}
        ]}]}"#,
    );
    let layout = layout_score(&score, &LayoutParams::default());
    let xs: Vec<f64> = layout.measures[0].elements.iter().map(|e| e.x()).collect();
    assert_close(xs[1] - xs[0], 0.0);
}

#[test]
#[should_panic(expected = "staff-space unit must be positive")]
fn negative_staff_space_is_a_programmer_error() {
    let score = parse(r#"{"measures": []}"#);
    layout_score(&score, &LayoutParams::with_staff_space(-1.0));
}

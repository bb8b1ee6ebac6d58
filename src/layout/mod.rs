//! Layout engine — walks a score's measures and elements in order and
//! computes absolute geometry: horizontal positions, staff positions,
//! stem directions, ledger-line counts, and beam-group membership.
//!
//! The output `LayoutResult` is renderer-agnostic: a drawing surface
//! can render it without any music-theoretic reasoning. Layout is a
//! pure function of the score and the parameters; the score is never
//! mutated.

mod elements;
mod params;

pub use elements::{
    ledger_line_count, staff_y, stem_up_for, ChordLayout, ChordNoteLayout, ElementLayout,
    NoteLayout, RestLayout,
};
pub use params::LayoutParams;

use serde::{Deserialize, Serialize};

use crate::beam::assign_beam_groups;
use crate::model::*;

/// Fully resolved layout for a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub measures: Vec<MeasureLayout>,
    /// X past the last barline
    pub total_width: f64,
    /// Height of the five-line staff (four staff spaces)
    pub staff_height: f64,
    /// Width of the clef/key/time header before the first measure
    pub header_width: f64,
}

/// Resolved layout for one measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureLayout {
    pub number: i32,
    /// Elements in onset order
    pub elements: Vec<ElementLayout>,
    pub start_x: f64,
    /// Barline X
    pub end_x: f64,
    pub width: f64,
    pub barline: BarlineType,
}

/// Compute the full layout for a score at the given parameters.
///
/// Pure and total for structurally valid scores: malformed leaves have
/// already been defaulted by the parser, and degenerate input (empty
/// measures, zero durations) lays out as zero-width geometry rather
/// than failing. A non-positive staff-space unit is a programmer error
/// and panics.
pub fn layout_score(score: &Score, params: &LayoutParams) -> LayoutResult {
    assert!(
        params.staff_space > 0.0,
        "staff-space unit must be positive, got {}",
        params.staff_space
    );

    let header_width = header_width(score, params);

    let mut measures = Vec::with_capacity(score.measures.len());
    let mut x = header_width;
    for measure in &score.measures {
        let ml = layout_measure(measure, x, score, params);
        x = ml.end_x;
        measures.push(ml);
    }

    LayoutResult {
        measures,
        total_width: x,
        staff_height: 4.0 * params.staff_space,
        header_width,
    }
}

/// Header width: clef, key-signature accidentals, and time signature
/// with their gaps, scaled by the staff-space unit. This is the X
/// offset of the first measure.
pub fn header_width(score: &Score, params: &LayoutParams) -> f64 {
    let accidentals = score.key_signature.accidental_count() as f64;
    (params.clef_width
        + params.key_signature_gap
        + accidentals * params.accidental_width
        + params.time_signature_gap
        + params.time_signature_width
        + params.measure_gap)
        * params.staff_space
}

/// Horizontal room an element claims: spacing grows logarithmically
/// with duration, so long notes get visibly more space without linear
/// blow-up. Zero-duration elements claim nothing.
pub fn element_width(duration: f64, params: &LayoutParams) -> f64 {
    if duration <= 0.0 {
        return 0.0;
    }
    params.min_note_spacing * params.staff_space * ((duration + 1.0).log2() / 2.0 + 0.5)
}

fn layout_measure(
    measure: &Measure,
    start_x: f64,
    score: &Score,
    params: &LayoutParams,
) -> MeasureLayout {
    let gap = params.measure_gap * params.staff_space;

    // Elements are laid out in onset order regardless of insertion
    // order (multi-voice descriptions interleave).
    let mut ordered: Vec<MusicElement> = measure.elements.clone();
    ordered.sort_by(|a, b| {
        a.onset()
            .partial_cmp(&b.onset())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let beam_groups = assign_beam_groups(&ordered, &score.time_signature);

    let mut elements = Vec::with_capacity(ordered.len());
    let mut x = start_x + gap;

    for (i, element) in ordered.iter().enumerate() {
        let laid_out = match element {
            MusicElement::Note(note) => ElementLayout::Note(elements::layout_note(
                note,
                x,
                score.clef,
                beam_groups.get(&i).copied(),
                params,
            )),
            MusicElement::Chord(chord) => {
                ElementLayout::Chord(elements::layout_chord(chord, x, score.clef, params))
            }
            MusicElement::Rest(rest) => {
                ElementLayout::Rest(elements::layout_rest(rest, x, params))
            }
        };
        elements.push(laid_out);
        x += element_width(element.duration(), params);
    }

    // Trailing gap; this offset is the barline X
    let end_x = x + gap;

    MeasureLayout {
        number: measure.number,
        elements,
        start_x,
        end_x,
        width: end_x - start_x,
        barline: measure.barline,
    }
}

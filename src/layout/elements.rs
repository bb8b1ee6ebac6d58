//! Per-element layout: note, chord, and rest geometry rules.

use serde::{Deserialize, Serialize};

use super::params::LayoutParams;
use crate::model::*;

/// Top staff line sits at position 8, bottom at 0 in the rendering
/// frame; the middle line is position 4.
const TOP_LINE_POSITION: i32 = 8;
const MIDDLE_LINE_POSITION: i32 = 4;

/// Resolved geometry for one element. Mirrors `MusicElement` as a
/// closed variant set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ElementLayout {
    Note(NoteLayout),
    Chord(ChordLayout),
    Rest(RestLayout),
}

impl ElementLayout {
    pub fn id(&self) -> ElementId {
        match self {
            ElementLayout::Note(n) => n.id,
            ElementLayout::Chord(c) => c.id,
            ElementLayout::Rest(r) => r.id,
        }
    }

    pub fn x(&self) -> f64 {
        match self {
            ElementLayout::Note(n) => n.x,
            ElementLayout::Chord(c) => c.x,
            ElementLayout::Rest(r) => r.x,
        }
    }
}

/// Resolved geometry for a single note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteLayout {
    pub id: ElementId,
    pub x: f64,
    /// Y of the notehead center; Y grows downward
    pub y: f64,
    pub staff_position: i32,
    pub stem_up: bool,
    pub ledger_line_count: u32,
    /// Flags the note carries when it is not beamed
    pub flag_count: u32,
    pub duration: f64,
    pub dotted: bool,
    pub tied: bool,
    pub slurred: bool,
    pub beam_group: Option<u32>,
    pub accidental: Option<Accidental>,
    pub articulations: Vec<Articulation>,
    pub dynamic: Option<Dynamic>,
    pub ornament: Option<Ornament>,
    pub state: NoteState,
}

/// One notehead inside a chord.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordNoteLayout {
    pub id: ElementId,
    pub y: f64,
    pub staff_position: i32,
    /// Horizontal shift applied to avoid second-interval collisions;
    /// zero for unshifted heads
    pub x_offset: f64,
    pub ledger_line_count: u32,
    pub accidental: Option<Accidental>,
    pub state: NoteState,
}

/// Resolved geometry for a chord: one stem, several noteheads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordLayout {
    pub id: ElementId,
    pub x: f64,
    pub duration: f64,
    pub stem_up: bool,
    /// Noteheads sorted bottom-up by staff position
    pub notes: Vec<ChordNoteLayout>,
}

/// Resolved geometry for a rest. Rests always sit at the staff center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestLayout {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub duration: f64,
    pub is_whole_measure: bool,
}

/// Notehead-center Y for a staff position. Position 8 is the top staff
/// line, 0 the bottom; Y grows downward from the top line.
pub fn staff_y(staff_position: i32, params: &LayoutParams) -> f64 {
    (TOP_LINE_POSITION - staff_position) as f64 * params.staff_space / 2.0
}

/// Stems point up for notes on or below the middle line.
pub fn stem_up_for(staff_position: i32) -> bool {
    staff_position <= MIDDLE_LINE_POSITION
}

/// Ledger lines needed for a staff position: none inside 0..=8, then
/// one per two diatonic steps beyond.
pub fn ledger_line_count(staff_position: i32) -> u32 {
    let distance = if staff_position < 0 {
        -staff_position
    } else if staff_position > TOP_LINE_POSITION {
        staff_position - TOP_LINE_POSITION
    } else {
        return 0;
    };
    // ceil((distance + 1) / 2) in integers
    ((distance + 2) / 2) as u32
}

pub(super) fn layout_note(
    note: &Note,
    x: f64,
    clef: ClefType,
    beam_group: Option<u32>,
    params: &LayoutParams,
) -> NoteLayout {
    let position = note.pitch.staff_position(clef);
    NoteLayout {
        id: note.id,
        x,
        y: staff_y(position, params),
        staff_position: position,
        stem_up: stem_up_for(position),
        ledger_line_count: ledger_line_count(position),
        flag_count: if beam_group.is_none() { number_of_flags(note.duration) } else { 0 },
        duration: note.duration,
        dotted: note.dotted,
        tied: note.tied,
        slurred: note.slurred,
        beam_group,
        accidental: note.accidental,
        articulations: note.articulations.clone(),
        dynamic: note.dynamic,
        ornament: note.ornament,
        state: note.state,
    }
}

pub(super) fn layout_chord(chord: &Chord, x: f64, clef: ClefType, params: &LayoutParams) -> ChordLayout {
    let mut heads: Vec<ChordNoteLayout> = chord
        .notes
        .iter()
        .map(|note| {
            let position = note.pitch.staff_position(clef);
            ChordNoteLayout {
                id: note.id,
                y: staff_y(position, params),
                staff_position: position,
                x_offset: 0.0,
                ledger_line_count: ledger_line_count(position),
                accidental: note.accidental,
                state: note.state,
            }
        })
        .collect();

    heads.sort_by_key(|h| h.staff_position);

    // One stem for the whole chord, decided by the average position
    let stem_up = if heads.is_empty() {
        true
    } else {
        let avg: f64 =
            heads.iter().map(|h| h.staff_position as f64).sum::<f64>() / heads.len() as f64;
        avg <= MIDDLE_LINE_POSITION as f64
    };

    // Second-adjustment: adjacent heads one diatonic step apart collide,
    // so alternate heads shift one notehead width to the side opposite
    // the stem. Never two shifted heads in a row.
    let offset = if stem_up {
        -(params.notehead_width * params.staff_space)
    } else {
        params.notehead_width * params.staff_space
    };
    let mut prev_offset = false;
    for i in 1..heads.len() {
        let interval = heads[i].staff_position - heads[i - 1].staff_position;
        if interval == 1 && !prev_offset {
            heads[i].x_offset = offset;
            prev_offset = true;
        } else {
            prev_offset = false;
        }
    }

    ChordLayout {
        id: chord.id,
        x,
        duration: chord.duration,
        stem_up,
        notes: heads,
    }
}

pub(super) fn layout_rest(rest: &Rest, x: f64, params: &LayoutParams) -> RestLayout {
    RestLayout {
        id: rest.id,
        x,
        y: staff_y(MIDDLE_LINE_POSITION, params),
        duration: rest.duration,
        is_whole_measure: rest.is_whole_measure,
    }
}

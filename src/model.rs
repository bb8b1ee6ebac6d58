//! Data model for a symbolic musical score.
//!
//! These structures capture the musical information the layout engine
//! needs: pitches, durations, measures, and the element variants that
//! compose them. Behavior is limited to derived queries (MIDI number,
//! diatonic staff position); all geometry lives in `layout`.

use serde::{Deserialize, Serialize};

/// The twelve chromatic note names, C through B with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    /// Chromatic semitone offset from C (0..=11).
    pub fn semitone(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::CSharp => 1,
            NoteName::D => 2,
            NoteName::DSharp => 3,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::FSharp => 6,
            NoteName::G => 7,
            NoteName::GSharp => 8,
            NoteName::A => 9,
            NoteName::ASharp => 10,
            NoteName::B => 11,
        }
    }

    /// Diatonic letter-class index (C=0 .. B=6), enharmonic-aware:
    /// C and C♯ share class 0, so they occupy the same staff step and
    /// differ only by the accidental glyph.
    pub fn diatonic_step(self) -> i32 {
        match self {
            NoteName::C | NoteName::CSharp => 0,
            NoteName::D | NoteName::DSharp => 1,
            NoteName::E => 2,
            NoteName::F | NoteName::FSharp => 3,
            NoteName::G | NoteName::GSharp => 4,
            NoteName::A | NoteName::ASharp => 5,
            NoteName::B => 6,
        }
    }
}

/// Pitch of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pitch {
    /// Chromatic note name
    pub name: NoteName,
    /// Octave number (middle C = C4)
    pub octave: i32,
    /// Additional chromatic alteration in semitones, -2..=2
    pub alteration: i32,
}

impl Pitch {
    pub fn new(name: NoteName, octave: i32) -> Self {
        Self { name, octave, alteration: 0 }
    }

    /// Convert pitch to MIDI note number. Middle C (C4) = 60.
    pub fn midi(&self) -> i32 {
        (self.octave + 1) * 12 + self.name.semitone() + self.alteration
    }

    /// Vertical staff position in diatonic steps, relative to the clef.
    ///
    /// Position 0 is C4 under a treble clef (first ledger line below the
    /// staff); each unit is one line-or-space step. A percussion clef
    /// pins everything to the staff center.
    pub fn staff_position(&self, clef: ClefType) -> i32 {
        if clef == ClefType::Percussion {
            return 4;
        }
        (self.octave - 4) * 7 + self.name.diatonic_step() + clef.offset()
    }
}

/// Clef governing the pitch-to-staff mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClefType {
    Treble,
    Bass,
    Alto,
    Tenor,
    Percussion,
}

impl ClefType {
    /// Staff-position offset added when placing a pitch under this clef.
    pub fn offset(self) -> i32 {
        match self {
            ClefType::Treble => 0,
            ClefType::Bass => 12,
            ClefType::Alto => 6,
            ClefType::Tenor => 8,
            // Percussion is position-pinned, not offset
            ClefType::Percussion => 0,
        }
    }

    /// Parse a clef name; unknown names fall back to treble.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "bass" => ClefType::Bass,
            "alto" => ClefType::Alto,
            "tenor" => ClefType::Tenor,
            "percussion" => ClefType::Percussion,
            _ => ClefType::Treble,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClefType::Treble => "treble",
            ClefType::Bass => "bass",
            ClefType::Alto => "alto",
            ClefType::Tenor => "tenor",
            ClefType::Percussion => "percussion",
        }
    }
}

/// Key signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignature {
    /// Number of sharps (positive) or flats (negative)
    pub fifths: i32,
    /// Key name as written in the description (e.g., "G", "Bb", "Am")
    pub name: String,
}

impl KeySignature {
    /// Parse a key name into a signature; unknown names fall back to
    /// C major. Accepts the 15 standard major keys and their relative
    /// minors (suffix "m" or "min").
    pub fn from_name(name: &str) -> Self {
        let trimmed = name.trim();
        let (root, minor) = match trimmed.strip_suffix("min").or_else(|| trimmed.strip_suffix('m'))
        {
            Some(r) if !r.is_empty() => (r, true),
            _ => (trimmed, false),
        };

        let major_fifths = |r: &str| -> Option<i32> {
            Some(match r {
                "C" => 0,
                "G" => 1,
                "D" => 2,
                "A" => 3,
                "E" => 4,
                "B" => 5,
                "F#" => 6,
                "C#" => 7,
                "F" => -1,
                "Bb" => -2,
                "Eb" => -3,
                "Ab" => -4,
                "Db" => -5,
                "Gb" => -6,
                "Cb" => -7,
                _ => return None,
            })
        };

        let fifths = if minor {
            // Relative minor sits three fifths flatward of its name-major
            major_fifths(root).map(|f| f - 3)
        } else {
            major_fifths(root)
        };

        match fifths {
            Some(f) if (-7..=7).contains(&f) => Self { fifths: f, name: trimmed.to_string() },
            _ => Self::default(),
        }
    }

    /// Number of accidental glyphs the signature draws.
    pub fn accidental_count(&self) -> u32 {
        self.fifths.unsigned_abs()
    }
}

impl Default for KeySignature {
    fn default() -> Self {
        Self { fifths: 0, name: "C".to_string() }
    }
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: i32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_type: i32,
}

impl TimeSignature {
    pub fn new(beats: i32, beat_type: i32) -> Self {
        Self { beats, beat_type }
    }

    /// Parse an "N/D" string; malformed input falls back to 4/4.
    pub fn from_str_lossy(s: &str) -> Self {
        let mut parts = s.splitn(2, '/');
        let beats = parts.next().and_then(|p| p.trim().parse().ok());
        let beat_type = parts.next().and_then(|p| p.trim().parse().ok());
        match (beats, beat_type) {
            (Some(b), Some(t)) if b > 0 && t > 0 => Self { beats: b, beat_type: t },
            _ => Self::default(),
        }
    }

    /// Compound meters (6/8, 9/8, 12/8) group beams by the dotted
    /// quarter instead of the quarter beat.
    pub fn is_compound(&self) -> bool {
        matches!(self.beats, 6 | 9 | 12) && self.beat_type == 8
    }

    /// Measure length in quarter-note beats.
    pub fn beats_per_measure(&self) -> f64 {
        self.beats as f64 * 4.0 / self.beat_type as f64
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self { beats: 4, beat_type: 4 }
    }
}

// ─── Duration queries ────────────────────────────────────────────────
//
// Durations are plain f64 quarter-note beat units: whole = 4.0,
// half = 2.0, quarter = 1.0, eighth = 0.5, down to 64th = 0.0625.

/// Whole notes are the only stemless duration.
pub fn needs_stem(duration: f64) -> bool {
    duration < 4.0
}

/// Sub-beat durations carry flags or beams.
pub fn should_beam(duration: f64) -> bool {
    duration < 1.0
}

/// Number of flags (or beam lines) for a duration.
pub fn number_of_flags(duration: f64) -> u32 {
    if duration >= 1.0 {
        0
    } else if duration >= 0.5 {
        1
    } else if duration >= 0.25 {
        2
    } else if duration >= 0.125 {
        3
    } else if duration >= 0.0625 {
        4
    } else {
        5
    }
}

/// Duration of a dotted note: each dot adds half of the previous
/// addition, so `base * (2 - 2^-dots)`.
pub fn dotted_duration(base: f64, dots: u32) -> f64 {
    base * (2.0 - 0.5f64.powi(dots as i32))
}

// ─── Element annotations ─────────────────────────────────────────────

/// Accidental glyph attached to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accidental {
    Sharp,
    Flat,
    Natural,
    DoubleSharp,
    DoubleFlat,
}

impl Accidental {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sharp" | "#" => Some(Accidental::Sharp),
            "flat" | "b" => Some(Accidental::Flat),
            "natural" => Some(Accidental::Natural),
            "double-sharp" | "##" | "x" => Some(Accidental::DoubleSharp),
            "double-flat" | "bb" => Some(Accidental::DoubleFlat),
            _ => None,
        }
    }
}

/// Articulation mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Articulation {
    Staccato,
    Accent,
    Tenuto,
    Marcato,
    Fermata,
}

impl Articulation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "staccato" => Some(Articulation::Staccato),
            "accent" => Some(Articulation::Accent),
            "tenuto" => Some(Articulation::Tenuto),
            "marcato" => Some(Articulation::Marcato),
            "fermata" => Some(Articulation::Fermata),
            _ => None,
        }
    }
}

/// Dynamic marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dynamic {
    Pianissimo,
    Piano,
    MezzoPiano,
    MezzoForte,
    Forte,
    Fortissimo,
}

impl Dynamic {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pp" => Some(Dynamic::Pianissimo),
            "p" => Some(Dynamic::Piano),
            "mp" => Some(Dynamic::MezzoPiano),
            "mf" => Some(Dynamic::MezzoForte),
            "f" => Some(Dynamic::Forte),
            "ff" => Some(Dynamic::Fortissimo),
            _ => None,
        }
    }
}

/// Ornament attached to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ornament {
    Trill,
    Mordent,
    Turn,
    GraceNote,
}

impl Ornament {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "trill" => Some(Ornament::Trill),
            "mordent" => Some(Ornament::Mordent),
            "turn" => Some(Ornament::Turn),
            "grace" => Some(Ornament::GraceNote),
            _ => None,
        }
    }
}

/// Interactive state of an element (used by exercise/quiz callers to
/// tint noteheads; the engine only carries it through).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteState {
    Normal,
    Selected,
    Correct,
    Incorrect,
}

impl NoteState {
    pub fn from_name(name: &str) -> Self {
        match name {
            "selected" => NoteState::Selected,
            "correct" => NoteState::Correct,
            "incorrect" => NoteState::Incorrect,
            _ => NoteState::Normal,
        }
    }
}

/// Barline closing a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarlineType {
    Single,
    Double,
    Final,
    RepeatStart,
    RepeatEnd,
}

impl BarlineType {
    /// Parse a barline name; unknown names fall back to single.
    pub fn from_name(name: &str) -> Self {
        match name {
            "double" => BarlineType::Double,
            "final" => BarlineType::Final,
            "repeat-start" => BarlineType::RepeatStart,
            "repeat-end" => BarlineType::RepeatEnd,
            _ => BarlineType::Single,
        }
    }
}

// ─── Elements ────────────────────────────────────────────────────────

/// Stable identifier for a score element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Monotonic element-ID generator, injected into score construction so
/// IDs are deterministic per score rather than process-global.
#[derive(Debug, Default)]
pub struct IdSource {
    next: u64,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> ElementId {
        let id = ElementId(self.next);
        self.next += 1;
        id
    }
}

/// A single pitched note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: ElementId,
    pub pitch: Pitch,
    /// Base duration in quarter-note beats (before the dot)
    pub duration: f64,
    /// Intended onset within the measure, in beats
    pub onset: f64,
    pub accidental: Option<Accidental>,
    pub dotted: bool,
    pub tied: bool,
    pub slurred: bool,
    /// Beam group membership, if the beaming engine assigned one
    pub beam_group: Option<u32>,
    pub articulations: Vec<Articulation>,
    pub dynamic: Option<Dynamic>,
    pub ornament: Option<Ornament>,
    pub voice: i32,
    pub state: NoteState,
    /// Caller-writable cached X; the layout engine never fills this.
    /// Resolved positions live in `LayoutResult`.
    pub x: Option<f64>,
}

impl Note {
    /// Effective spacing duration, dot included.
    pub fn effective_duration(&self) -> f64 {
        if self.dotted {
            dotted_duration(self.duration, 1)
        } else {
            self.duration
        }
    }
}

/// Several notes sharing one onset, stem, and duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub id: ElementId,
    pub duration: f64,
    pub onset: f64,
    pub notes: Vec<Note>,
    pub x: Option<f64>,
}

/// A rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub id: ElementId,
    pub duration: f64,
    pub onset: f64,
    pub is_whole_measure: bool,
    pub x: Option<f64>,
}

/// One entry in a measure. Closed variant set: every consumer
/// pattern-matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MusicElement {
    Note(Note),
    Chord(Chord),
    Rest(Rest),
}

impl MusicElement {
    pub fn id(&self) -> ElementId {
        match self {
            MusicElement::Note(n) => n.id,
            MusicElement::Chord(c) => c.id,
            MusicElement::Rest(r) => r.id,
        }
    }

    pub fn onset(&self) -> f64 {
        match self {
            MusicElement::Note(n) => n.onset,
            MusicElement::Chord(c) => c.onset,
            MusicElement::Rest(r) => r.onset,
        }
    }

    /// Effective duration in beats, dot-aware for notes.
    pub fn duration(&self) -> f64 {
        match self {
            MusicElement::Note(n) => n.effective_duration(),
            MusicElement::Chord(c) => c.duration,
            MusicElement::Rest(r) => r.duration,
        }
    }
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Measure number
    pub number: i32,
    /// Elements ordered by intended onset time within the measure
    pub elements: Vec<MusicElement>,
    /// Barline closing the measure
    pub barline: BarlineType,
}

/// A complete symbolic score. Immutable once constructed for layout
/// purposes; layout produces a parallel `LayoutResult` without touching
/// the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub id: String,
    pub title: String,
    pub measures: Vec<Measure>,
    pub clef: ClefType,
    pub key_signature: KeySignature,
    pub time_signature: TimeSignature,
    /// Quarter-note beats per minute, if specified
    pub tempo: Option<f64>,
}

impl Score {
    pub fn measure_count(&self) -> usize {
        self.measures.len()
    }

    pub fn element_count(&self) -> usize {
        self.measures.iter().map(|m| m.elements.len()).sum()
    }
}

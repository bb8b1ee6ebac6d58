//! Score-description parser — converts the JSON interchange document
//! into the `Score` data model.
//!
//! The format is a thin declarative description (see `ScoreDescription`);
//! malformed leaf values never fail the parse, they fall back to
//! defaults: C4 for pitches, treble clef, C major, single barlines.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::*;

// ─── Interchange document ────────────────────────────────────────────

/// Top-level score description as exchanged with the surrounding
/// application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDescription {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub clef: Option<String>,
    #[serde(default)]
    pub key_signature: Option<String>,
    #[serde(default)]
    pub time_signature: Option<String>,
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub measures: Vec<MeasureDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureDescription {
    #[serde(default)]
    pub number: Option<i32>,
    #[serde(default)]
    pub barline: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescription {
    /// "note", "chord", or "rest"
    #[serde(rename = "type")]
    pub kind: String,
    /// Duration in quarter-note beats
    #[serde(default)]
    pub duration: Option<f64>,
    /// Pitch string for notes, e.g. "F#5", "Bb3"
    #[serde(default)]
    pub pitch: Option<String>,
    /// Pitch strings for chords
    #[serde(default)]
    pub pitches: Option<Vec<String>>,
    #[serde(default)]
    pub accidental: Option<String>,
    #[serde(default)]
    pub dotted: bool,
    #[serde(default)]
    pub tied: bool,
    #[serde(default)]
    pub slurred: bool,
    #[serde(default)]
    pub articulations: Vec<String>,
    #[serde(default)]
    pub dynamic: Option<String>,
    #[serde(default)]
    pub ornament: Option<String>,
    #[serde(default)]
    pub voice: Option<i32>,
    #[serde(default)]
    pub state: Option<String>,
    /// Rests only: spans the whole measure
    #[serde(default)]
    pub whole_measure: bool,
}

// ─── Parsing ─────────────────────────────────────────────────────────

/// Parse a JSON score description into a `Score`.
///
/// Element IDs are drawn from the caller's `IdSource` so repeated
/// parses are deterministic.
pub fn parse_description(json: &str, ids: &mut IdSource) -> Result<Score, String> {
    let desc: ScoreDescription =
        serde_json::from_str(json).map_err(|e| format!("Score description parse error: {e}"))?;
    Ok(build_score(&desc, ids))
}

/// Convert an already-deserialized description into a `Score`.
pub fn build_score(desc: &ScoreDescription, ids: &mut IdSource) -> Score {
    let clef = ClefType::from_name(desc.clef.as_deref().unwrap_or("treble"));
    let key_signature = KeySignature::from_name(desc.key_signature.as_deref().unwrap_or("C"));
    let time_signature = TimeSignature::from_str_lossy(desc.time_signature.as_deref().unwrap_or("4/4"));

    let measures = desc
        .measures
        .iter()
        .enumerate()
        .map(|(i, md)| build_measure(md, i, &time_signature, ids))
        .collect();

    Score {
        id: desc.id.clone(),
        title: desc.title.clone(),
        measures,
        clef,
        key_signature,
        time_signature,
        tempo: desc.tempo.filter(|t| *t > 0.0),
    }
}

fn build_measure(
    md: &MeasureDescription,
    index: usize,
    time: &TimeSignature,
    ids: &mut IdSource,
) -> Measure {
    // Per-voice running time, so interleaved voices get correct onsets
    let mut voice_times: HashMap<i32, f64> = HashMap::new();
    let mut elements = Vec::with_capacity(md.elements.len());

    for ed in &md.elements {
        let voice = ed.voice.unwrap_or(1);
        let current = voice_times.entry(voice).or_insert(0.0);
        let onset = *current;

        let element = build_element(ed, onset, voice, time, ids);
        *current += element.duration();
        elements.push(element);
    }

    Measure {
        number: md.number.unwrap_or(index as i32 + 1),
        elements,
        barline: BarlineType::from_name(md.barline.as_deref().unwrap_or("single")),
    }
}

fn build_element(
    ed: &ElementDescription,
    onset: f64,
    voice: i32,
    time: &TimeSignature,
    ids: &mut IdSource,
) -> MusicElement {
    match ed.kind.as_str() {
        "chord" => {
            let duration = ed.duration.unwrap_or(1.0).max(0.0);
            let notes = ed
                .pitches
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(|p| build_note(ed, p, duration, onset, voice, ids))
                .collect();
            MusicElement::Chord(Chord {
                id: ids.next_id(),
                duration,
                onset,
                notes,
                x: None,
            })
        }
        "rest" => {
            let duration = match ed.duration {
                Some(d) if d > 0.0 => d,
                _ if ed.whole_measure => time.beats_per_measure(),
                Some(d) => d.max(0.0),
                None => time.beats_per_measure(),
            };
            MusicElement::Rest(Rest {
                id: ids.next_id(),
                duration,
                onset,
                is_whole_measure: ed.whole_measure,
                x: None,
            })
        }
        // Anything else is treated as a plain note
        _ => {
            let duration = ed.duration.unwrap_or(1.0).max(0.0);
            let pitch = ed.pitch.as_deref().unwrap_or("C4");
            MusicElement::Note(build_note(ed, pitch, duration, onset, voice, ids))
        }
    }
}

fn build_note(
    ed: &ElementDescription,
    pitch: &str,
    duration: f64,
    onset: f64,
    voice: i32,
    ids: &mut IdSource,
) -> Note {
    Note {
        id: ids.next_id(),
        pitch: parse_pitch(pitch),
        duration,
        onset,
        accidental: ed.accidental.as_deref().and_then(Accidental::from_name),
        dotted: ed.dotted,
        tied: ed.tied,
        slurred: ed.slurred,
        beam_group: None,
        articulations: ed
            .articulations
            .iter()
            .filter_map(|a| Articulation::from_name(a))
            .collect(),
        dynamic: ed.dynamic.as_deref().and_then(Dynamic::from_name),
        ornament: ed.ornament.as_deref().and_then(Ornament::from_name),
        voice,
        state: NoteState::from_name(ed.state.as_deref().unwrap_or("normal")),
        x: None,
    }
}

// ─── Pitch strings ───────────────────────────────────────────────────

/// Parse a pitch string of the form `<letter>[accidental]<octave>`,
/// e.g. "F#5", "Bb3", "C4". Malformed strings fall back to C4.
pub fn parse_pitch(s: &str) -> Pitch {
    parse_pitch_opt(s).unwrap_or(Pitch::new(NoteName::C, 4))
}

fn parse_pitch_opt(s: &str) -> Option<Pitch> {
    let s = s.trim();
    let mut chars = s.chars();

    let name = match chars.next()?.to_ascii_uppercase() {
        'C' => NoteName::C,
        'D' => NoteName::D,
        'E' => NoteName::E,
        'F' => NoteName::F,
        'G' => NoteName::G,
        'A' => NoteName::A,
        'B' => NoteName::B,
        _ => return None,
    };

    let rest: &str = chars.as_str();
    let (alteration, octave_str) = if let Some(r) = rest.strip_prefix("##") {
        (2, r)
    } else if let Some(r) = rest.strip_prefix('x') {
        (2, r)
    } else if let Some(r) = rest.strip_prefix('#') {
        (1, r)
    } else if let Some(r) = rest.strip_prefix("bb") {
        (-2, r)
    } else if let Some(r) = rest.strip_prefix('b') {
        (-1, r)
    } else {
        (0, rest)
    };

    let octave: i32 = octave_str.parse().ok()?;
    Some(Pitch { name, octave, alteration })
}

/// Render a pitch back into its string form (e.g. "F#5"). The letter
/// comes from the diatonic class, so sharp note names and explicit
/// alterations both end up as accidental characters.
pub fn pitch_to_string(pitch: &Pitch) -> String {
    let letter = match pitch.name.diatonic_step() {
        0 => 'C',
        1 => 'D',
        2 => 'E',
        3 => 'F',
        4 => 'G',
        5 => 'A',
        _ => 'B',
    };
    let letter_semitone = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        _ => 11,
    };
    let total_alter = pitch.name.semitone() - letter_semitone + pitch.alteration;
    let accidental = match total_alter {
        2 => "##",
        1 => "#",
        -1 => "b",
        -2 => "bb",
        _ => "",
    };
    format!("{letter}{accidental}{}", pitch.octave)
}

// ─── Round-trip ──────────────────────────────────────────────────────

/// Re-emit a `Score` as the interchange description it was built from
/// (modulo formatting: pitch strings are normalized).
pub fn score_to_description(score: &Score) -> ScoreDescription {
    ScoreDescription {
        id: score.id.clone(),
        title: score.title.clone(),
        clef: Some(score.clef.name().to_string()),
        key_signature: Some(score.key_signature.name.clone()),
        time_signature: Some(format!(
            "{}/{}",
            score.time_signature.beats, score.time_signature.beat_type
        )),
        tempo: score.tempo,
        measures: score.measures.iter().map(describe_measure).collect(),
    }
}

fn describe_measure(measure: &Measure) -> MeasureDescription {
    MeasureDescription {
        number: Some(measure.number),
        barline: Some(
            match measure.barline {
                BarlineType::Single => "single",
                BarlineType::Double => "double",
                BarlineType::Final => "final",
                BarlineType::RepeatStart => "repeat-start",
                BarlineType::RepeatEnd => "repeat-end",
            }
            .to_string(),
        ),
        elements: measure.elements.iter().map(describe_element).collect(),
    }
}

fn describe_element(element: &MusicElement) -> ElementDescription {
    let mut ed = ElementDescription {
        kind: String::new(),
        duration: None,
        pitch: None,
        pitches: None,
        accidental: None,
        dotted: false,
        tied: false,
        slurred: false,
        articulations: Vec::new(),
        dynamic: None,
        ornament: None,
        voice: None,
        state: None,
        whole_measure: false,
    };

    match element {
        MusicElement::Note(n) => {
            ed.kind = "note".to_string();
            ed.duration = Some(n.duration);
            ed.pitch = Some(pitch_to_string(&n.pitch));
            ed.accidental = n.accidental.map(|a| {
                match a {
                    Accidental::Sharp => "sharp",
                    Accidental::Flat => "flat",
                    Accidental::Natural => "natural",
                    Accidental::DoubleSharp => "double-sharp",
                    Accidental::DoubleFlat => "double-flat",
                }
                .to_string()
            });
            ed.dotted = n.dotted;
            ed.tied = n.tied;
            ed.slurred = n.slurred;
            ed.articulations = n
                .articulations
                .iter()
                .map(|a| {
                    match a {
                        Articulation::Staccato => "staccato",
                        Articulation::Accent => "accent",
                        Articulation::Tenuto => "tenuto",
                        Articulation::Marcato => "marcato",
                        Articulation::Fermata => "fermata",
                    }
                    .to_string()
                })
                .collect();
            ed.dynamic = n.dynamic.map(|d| {
                match d {
                    Dynamic::Pianissimo => "pp",
                    Dynamic::Piano => "p",
                    Dynamic::MezzoPiano => "mp",
                    Dynamic::MezzoForte => "mf",
                    Dynamic::Forte => "f",
                    Dynamic::Fortissimo => "ff",
                }
                .to_string()
            });
            ed.ornament = n.ornament.map(|o| {
                match o {
                    Ornament::Trill => "trill",
                    Ornament::Mordent => "mordent",
                    Ornament::Turn => "turn",
                    Ornament::GraceNote => "grace",
                }
                .to_string()
            });
            ed.voice = Some(n.voice);
            ed.state = Some(
                match n.state {
                    NoteState::Normal => "normal",
                    NoteState::Selected => "selected",
                    NoteState::Correct => "correct",
                    NoteState::Incorrect => "incorrect",
                }
                .to_string(),
            );
        }
        MusicElement::Chord(c) => {
            ed.kind = "chord".to_string();
            ed.duration = Some(c.duration);
            ed.pitches = Some(c.notes.iter().map(|n| pitch_to_string(&n.pitch)).collect());
        }
        MusicElement::Rest(r) => {
            ed.kind = "rest".to_string();
            ed.duration = Some(r.duration);
            ed.whole_measure = r.is_whole_measure;
        }
    }

    ed
}

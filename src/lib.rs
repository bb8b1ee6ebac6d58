//! engrave — music notation typesetting engine.
//!
//! Converts a symbolic score description (pitches, durations, measures,
//! articulations) into fully resolved layout geometry — coordinates,
//! stem directions, beam groups, ledger-line counts, and Bézier control
//! points for ties and slurs — that any 2D drawing surface can render
//! without further music-theoretic reasoning.
//!
//! # Example
//! ```no_run
//! use engrave::{parse_description, layout_score, IdSource, LayoutParams};
//!
//! let json = std::fs::read_to_string("score.json").unwrap();
//! let mut ids = IdSource::new();
//! let score = parse_description(&json, &mut ids).unwrap();
//! let layout = layout_score(&score, &LayoutParams::default());
//! println!("Total width: {}", layout.total_width);
//! ```

pub mod beam;
pub mod curve;
pub mod layout;
pub mod model;
pub mod parser;

pub use beam::{assign_beam_groups, beats_per_beam_group};
pub use curve::{
    curve_between, slur_over, tie_between, CurveAnchor, CurveDirection, CurveKind, CurvePath,
    Point,
};
pub use layout::{layout_score, ElementLayout, LayoutParams, LayoutResult, MeasureLayout};
pub use model::*;
pub use parser::{parse_description, parse_pitch, pitch_to_string, score_to_description};

/// Convert a parsed score back to its JSON description.
/// Useful for passing data across FFI boundaries and for round-trips.
pub fn score_to_json(score: &Score) -> Result<String, String> {
    serde_json::to_string_pretty(&score_to_description(score))
        .map_err(|e| format!("JSON serialization error: {e}"))
}

/// Serialize a layout result to JSON for a rendering collaborator on
/// the other side of an FFI boundary.
pub fn layout_to_json(layout: &LayoutResult) -> Result<String, String> {
    serde_json::to_string_pretty(layout).map_err(|e| format!("JSON serialization error: {e}"))
}

/// Parse a score description and lay it out in one step.
pub fn layout_description(json: &str, params: &LayoutParams) -> Result<LayoutResult, String> {
    let mut ids = IdSource::new();
    let score = parse_description(json, &mut ids)?;
    Ok(layout_score(&score, params))
}

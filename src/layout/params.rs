//! Layout parameters. A single staff-space scalar controls all
//! proportions; every other field is a multiple of it.

use serde::{Deserialize, Serialize};

/// Geometry knobs for a layout pass.
///
/// `staff_space` is the distance between adjacent staff lines in output
/// units; everything else is expressed in staff spaces so a caller can
/// rescale the whole engraving by changing one number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Staff-space unit in output units. Must be positive.
    pub staff_space: f64,

    // ── Note geometry (staff-space multiples) ──
    pub notehead_width: f64,
    pub stem_length: f64,
    pub stem_width: f64,
    pub beam_spacing: f64,
    pub beam_thickness: f64,
    pub ledger_line_extension: f64,
    pub ledger_line_thickness: f64,

    // ── Barlines ──
    pub barline_thin: f64,
    pub barline_thick: f64,

    // ── Header ──
    pub clef_width: f64,
    pub key_signature_gap: f64,
    /// Width of one key-signature accidental glyph
    pub accidental_width: f64,
    pub time_signature_gap: f64,
    /// Width of the time-signature glyph pair
    pub time_signature_width: f64,

    // ── Spacing ──
    pub accidental_gap: f64,
    pub dot_gap: f64,
    pub measure_gap: f64,
    pub min_note_spacing: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            staff_space: 10.0,
            notehead_width: 1.1,
            stem_length: 3.0,
            stem_width: 0.12,
            beam_spacing: 0.3,
            beam_thickness: 0.4,
            ledger_line_extension: 0.5,
            ledger_line_thickness: 0.08,
            barline_thin: 0.1,
            barline_thick: 0.3,
            clef_width: 3.2,
            key_signature_gap: 0.4,
            accidental_width: 1.0,
            time_signature_gap: 0.4,
            time_signature_width: 2.4,
            accidental_gap: 0.4,
            dot_gap: 0.4,
            measure_gap: 1.4,
            min_note_spacing: 5.5,
        }
    }
}

impl LayoutParams {
    /// A parameter set at a given staff-space unit, default proportions.
    pub fn with_staff_space(staff_space: f64) -> Self {
        Self { staff_space, ..Self::default() }
    }
}

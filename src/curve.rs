//! Tie, slur, and phrase-mark geometry.
//!
//! Curves are tapered double-Bézier regions: an outer cubic and an
//! inner cubic offset by half the curve thickness, closed into a filled
//! path. That gives the characteristic thicker-in-the-middle engraving
//! look instead of a constant-width stroke. Only geometry is produced
//! here; the rendering collaborator fills the path.

use serde::{Deserialize, Serialize};

use crate::layout::{LayoutParams, NoteLayout};

/// Curve thickness as a fraction of the staff space.
const THICKNESS_FACTOR: f64 = 0.15;
/// Spans shorter than two staff spaces render nothing.
const MIN_SPAN_STAFF_SPACES: f64 = 2.0;
/// Endpoint nudge away from the notehead, in staff spaces.
const ANCHOR_NUDGE: f64 = 0.3;

/// What the curve means; each kind has a fixed apex-height factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    Tie,
    Slur,
    Phrase,
}

impl CurveKind {
    /// Apex height in staff spaces.
    pub fn height_factor(self) -> f64 {
        match self {
            CurveKind::Tie => 0.4,
            CurveKind::Slur => 0.6,
            CurveKind::Phrase => 0.8,
        }
    }
}

/// Bowing direction. Y grows downward, so an `Up` curve has its apex at
/// a smaller Y than its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveDirection {
    Up,
    Down,
}

impl CurveDirection {
    fn y_sign(self) -> f64 {
        match self {
            CurveDirection::Up => -1.0,
            CurveDirection::Down => 1.0,
        }
    }

    /// Ties and slurs bow away from the stems they connect.
    pub fn away_from_stems(stem_up: bool) -> Self {
        if stem_up {
            CurveDirection::Down
        } else {
            CurveDirection::Up
        }
    }
}

/// A 2D point in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A cubic Bézier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

/// A note-layout anchor a curve connects to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveAnchor {
    pub x: f64,
    pub y: f64,
    pub stem_up: bool,
}

impl CurveAnchor {
    pub fn from_note(note: &NoteLayout) -> Self {
        Self { x: note.x, y: note.y, stem_up: note.stem_up }
    }
}

/// The renderable curve: outer and inner Béziers forming a closed
/// tapered region, plus the apex for collision checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePath {
    pub kind: CurveKind,
    pub direction: CurveDirection,
    /// Outer edge of the region, start → end
    pub outer: CubicBezier,
    /// Inner edge, end → start, closing the filled path
    pub inner: CubicBezier,
    /// Path midpoint offset by the full curve height
    pub apex: Point,
    pub thickness: f64,
}

/// Build the curve between two endpoint anchors.
///
/// Returns `None` when the horizontal span is under two staff spaces;
/// the renderer must skip drawing such curves. Control points sit at
/// 1/3 and 2/3 of the span, lifted `height * 1.5` from the endpoints;
/// the inner curve's control points sit half a thickness lower, so the
/// region tapers to the shared endpoints.
pub fn curve_between(
    start: Point,
    end: Point,
    kind: CurveKind,
    direction: CurveDirection,
    params: &LayoutParams,
) -> Option<CurvePath> {
    let ss = params.staff_space;
    let span = end.x - start.x;
    if span < MIN_SPAN_STAFF_SPACES * ss {
        return None;
    }

    let y_sign = direction.y_sign();
    let height = kind.height_factor() * ss;
    let thickness = THICKNESS_FACTOR * ss;
    let half = thickness / 2.0;

    let c1x = start.x + span / 3.0;
    let c2x = start.x + span * 2.0 / 3.0;
    let lift = y_sign * height * 1.5;

    let outer = CubicBezier {
        start,
        control1: Point::new(c1x, start.y + lift + y_sign * half),
        control2: Point::new(c2x, end.y + lift + y_sign * half),
        end,
    };
    let inner = CubicBezier {
        start: end,
        control1: Point::new(c2x, end.y + lift - y_sign * half),
        control2: Point::new(c1x, start.y + lift - y_sign * half),
        end: start,
    };

    let apex = Point::new(
        (start.x + end.x) / 2.0,
        (start.y + end.y) / 2.0 + y_sign * height,
    );

    Some(CurvePath { kind, direction, outer, inner, apex, thickness })
}

/// Tie between two notes of the same pitch.
///
/// Anchors sit just past the notehead edges: right edge of the first
/// head plus half a staff space, left edge of the second minus the
/// same; both ends share one Y, nudged away from the stem side.
pub fn tie_between(from: &NoteLayout, to: &NoteLayout, params: &LayoutParams) -> Option<CurvePath> {
    let ss = params.staff_space;
    let half_head = params.notehead_width * ss / 2.0;

    let direction = CurveDirection::away_from_stems(from.stem_up);
    let y = from.y + direction.y_sign() * ANCHOR_NUDGE * ss;

    let start = Point::new(from.x + half_head + 0.5 * ss, y);
    let end = Point::new(to.x - half_head - 0.5 * ss, y);

    curve_between(start, end, CurveKind::Tie, direction, params)
}

/// Slur or phrase mark over two or more notes.
///
/// Direction defaults to the opposite of the prevailing stem direction.
/// For more than two notes the endpoint Y is the extreme Y among all
/// connected anchors (highest for an up-curve, lowest for a down-curve)
/// so the curve clears the intermediate notes.
pub fn slur_over(
    anchors: &[CurveAnchor],
    kind: CurveKind,
    params: &LayoutParams,
) -> Option<CurvePath> {
    let (first, last) = match (anchors.first(), anchors.last()) {
        (Some(f), Some(l)) if anchors.len() >= 2 => (f, l),
        _ => return None,
    };

    let stems_up = anchors.iter().filter(|a| a.stem_up).count();
    let prevailing_up = stems_up * 2 >= anchors.len();
    let direction = CurveDirection::away_from_stems(prevailing_up);

    let nudge = direction.y_sign() * ANCHOR_NUDGE * params.staff_space;

    let (start_y, end_y) = if anchors.len() > 2 {
        let extreme = match direction {
            CurveDirection::Up => anchors.iter().map(|a| a.y).fold(f64::INFINITY, f64::min),
            CurveDirection::Down => anchors.iter().map(|a| a.y).fold(f64::NEG_INFINITY, f64::max),
        };
        (extreme, extreme)
    } else {
        (first.y, last.y)
    };

    curve_between(
        Point::new(first.x, start_y + nudge),
        Point::new(last.x, end_y + nudge),
        kind,
        direction,
        params,
    )
}

//! Beaming engine — partitions a measure's elements into beam groups
//! without letting any group cross a beat boundary.

use std::collections::BTreeMap;

use crate::model::{should_beam, MusicElement, TimeSignature};

const BEAT_EPSILON: f64 = 1e-9;

/// Beats per beam group: compound meters (6/8, 9/8, 12/8) beam by the
/// dotted quarter (1.5 beats), everything else by the quarter beat.
pub fn beats_per_beam_group(time: &TimeSignature) -> f64 {
    if time.is_compound() {
        1.5
    } else {
        1.0
    }
}

/// Assign beam groups to a measure's elements.
///
/// Walks the elements left to right accumulating beat time. A plain
/// note with a sub-beat duration is beam-eligible; rests, chords, and
/// longer notes close any open group. A group also closes at every
/// beat-group boundary — boundary integrity outranks keeping groups
/// maximal, so four eighths in 4/4 beam as two pairs, never a four.
/// Groups with fewer than two members are discarded, so a lone eighth
/// note keeps its flag.
///
/// Returns element index → group id for every element that landed in a
/// surviving group.
pub fn assign_beam_groups(
    elements: &[MusicElement],
    time: &TimeSignature,
) -> BTreeMap<usize, u32> {
    let group_span = beats_per_beam_group(time);

    let mut group_members: Vec<Vec<usize>> = Vec::new();
    // Open group: (index into group_members, beat window it started in)
    let mut open_group: Option<(usize, i64)> = None;
    let mut current_beat = 0.0f64;

    for (i, element) in elements.iter().enumerate() {
        let duration = element.duration();

        let eligible = matches!(element, MusicElement::Note(n) if should_beam(n.duration));

        if eligible {
            // Epsilon keeps exact boundary landings (0.5 + 0.5 == 1.0)
            // inside the window they close.
            let window = ((current_beat + BEAT_EPSILON) / group_span).floor() as i64;
            let beat_in_group = current_beat - window as f64 * group_span;
            let crosses = beat_in_group + duration > group_span + BEAT_EPSILON;

            let start_new = match open_group {
                None => true,
                Some((_, open_window)) => open_window != window || crosses,
            };

            if start_new {
                group_members.push(Vec::new());
                open_group = Some((group_members.len() - 1, window));
            }
            if let Some((g, _)) = open_group {
                group_members[g].push(i);
            }
        } else {
            open_group = None;
        }

        current_beat += duration;
    }

    let mut assignments: BTreeMap<usize, u32> = BTreeMap::new();
    let mut next_id = 0u32;
    for members in &group_members {
        if members.len() < 2 {
            continue;
        }
        for &idx in members {
            assignments.insert(idx, next_id);
        }
        next_id += 1;
    }

    assignments
}

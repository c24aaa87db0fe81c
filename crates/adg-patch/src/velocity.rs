//! Velocity layer ranges for multi-velocity zones.

use adg_vocab::{CROSSFADE_MAX, CROSSFADE_MIN, MAX, MIN, MIDI_MAX, VELOCITY_RANGE};
use adg_xml::{Document, NodeId};

use crate::{missing, set_child_value, set_optional_value, PatchError, ZoneRange};

/// Split the velocity axis between layers recorded at `velocities`
/// (strictly ascending).
///
/// Boundaries sit at the floor midpoint of neighbouring layers: the lower
/// layer ends on the midpoint, the upper one starts right above it. The first
/// layer starts at 1 and the last one ends at 127, so the ranges cover
/// 1..=127 without gaps or overlaps. Velocities too close to 0 to leave the
/// first layer a non-empty range are rejected.
pub fn velocity_ranges(velocities: &[u8]) -> Result<Vec<ZoneRange>, PatchError> {
    if let Some(bad) = velocities.iter().find(|v| **v > MIDI_MAX) {
        return Err(PatchError::Validation(format!(
            "velocity must be 0-127, got {bad}"
        )));
    }
    if velocities.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(PatchError::Validation(format!(
            "velocity layers must be strictly ascending, got {velocities:?}"
        )));
    }

    let midpoint = |a: u8, b: u8| ((u16::from(a) + u16::from(b)) / 2) as u8;
    let last = velocities.len().saturating_sub(1);
    let ranges = velocities
        .iter()
        .enumerate()
        .map(|(i, &velocity)| {
            let min = if i == 0 {
                1
            } else {
                midpoint(velocities[i - 1], velocity) + 1
            };
            let max = if i == last {
                MIDI_MAX
            } else {
                midpoint(velocity, velocities[i + 1])
            };
            ZoneRange::new(min, max)
        })
        .collect::<Vec<_>>();
    if let Some(first) = ranges.first().filter(|range| range.max < range.min) {
        return Err(PatchError::Validation(format!(
            "velocity layers {velocities:?} leave the first layer empty ({first})"
        )));
    }
    Ok(ranges)
}

/// Write `range` into the zone's `VelocityRange`, crossfades included.
pub fn set_velocity_range(
    doc: &mut Document,
    part: NodeId,
    range: ZoneRange,
) -> Result<(), PatchError> {
    let block = doc
        .child_element(part, VELOCITY_RANGE)
        .ok_or_else(|| missing(doc, part, VELOCITY_RANGE))?;
    set_child_value(doc, block, MIN, range.min)?;
    set_child_value(doc, block, MAX, range.max)?;
    set_optional_value(doc, block, CROSSFADE_MIN, range.min)?;
    set_optional_value(doc, block, CROSSFADE_MAX, range.max)?;
    Ok(())
}

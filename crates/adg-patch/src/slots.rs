//! Ordered slot assignment over repeated elements (pads, zones).
//!
//! Builders hand over a list of optional values; the n-th value goes to the
//! n-th target in canonical order. `None` leaves its target untouched, extra
//! values are ignored and missing values leave the trailing targets alone.

use std::cmp::Reverse;

use adg_vocab::{RECEIVING_NOTE, RECEIVING_NOTE_PATH, ZONE_SETTINGS};
use adg_xml::{Document, NodeId};
use tracing::debug;

use crate::{int_value, require, PatchError};

/// Plain function reading the sort key of a target.
pub type KeyFn = fn(&Document, NodeId) -> Result<i64, PatchError>;

/// Canonical order of the targets.
#[derive(Debug, Clone, Copy)]
pub enum SlotOrder<K> {
    /// Highest key first (drum pads: pad 1 plays the highest note).
    Descending(K),
    /// Lowest key first.
    Ascending(K),
    /// Document order (freshly built sampler zones).
    Document,
}

/// Sort key of a drum pad: its `ZoneSettings/ReceivingNote`.
///
/// The pad's own `ZoneSettings` wins over those of racks nested in its chain.
pub fn receiving_note(doc: &Document, pad: NodeId) -> Result<i64, PatchError> {
    let note = receiving_note_element(doc, pad)?;
    int_value(doc, note)
}

pub(crate) fn receiving_note_element(doc: &Document, pad: NodeId) -> Result<NodeId, PatchError> {
    let own = doc
        .child_element(pad, ZONE_SETTINGS)
        .and_then(|zone| doc.child_element(zone, RECEIVING_NOTE));
    match own {
        Some(note) => Ok(note),
        None => require(doc, pad, RECEIVING_NOTE_PATH),
    }
}

/// Collect the elements matching `target` below `scope` in canonical order.
///
/// Every key is read before anything is returned, so a target without a
/// key fails the whole call. Equal keys keep document order.
pub fn ordered_targets<K>(
    doc: &Document,
    scope: NodeId,
    target: &str,
    order: &SlotOrder<K>,
) -> Result<Vec<NodeId>, PatchError>
where
    K: Fn(&Document, NodeId) -> Result<i64, PatchError>,
{
    let targets = doc.select(scope, target)?;
    let (key, descending) = match order {
        SlotOrder::Document => return Ok(targets),
        SlotOrder::Descending(key) => (key, true),
        SlotOrder::Ascending(key) => (key, false),
    };
    let mut keyed = targets
        .into_iter()
        .map(|id| key(doc, id).map(|k| (k, id)))
        .collect::<Result<Vec<_>, _>>()?;
    if descending {
        keyed.sort_by_key(|(k, _)| Reverse(*k));
    } else {
        keyed.sort_by_key(|(k, _)| *k);
    }
    Ok(keyed.into_iter().map(|(_, id)| id).collect())
}

/// Zip the ordered targets with `values` and run `writer` for each present
/// value. Returns how many targets the writer reported as modified.
pub fn assign_slots<T, K, W>(
    doc: &mut Document,
    scope: NodeId,
    target: &str,
    order: SlotOrder<K>,
    values: &[Option<T>],
    mut writer: W,
) -> Result<usize, PatchError>
where
    K: Fn(&Document, NodeId) -> Result<i64, PatchError>,
    W: FnMut(&mut Document, NodeId, &T) -> Result<bool, PatchError>,
{
    let targets = ordered_targets(doc, scope, target, &order)?;
    if values.len() > targets.len() {
        debug!(
            target,
            values = values.len(),
            targets = targets.len(),
            "more values than targets, ignoring the rest"
        );
    }
    let mut modified = 0;
    for (index, (node, value)) in targets.iter().zip(values).enumerate() {
        let Some(value) = value else {
            continue;
        };
        if writer(doc, *node, value)? {
            modified += 1;
        } else {
            debug!(slot = index, "writer left target unchanged");
        }
    }
    Ok(modified)
}

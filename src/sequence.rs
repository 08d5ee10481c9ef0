use jiff::{SignedDuration, Timestamp, tz::Offset};

use crate::{period::Period, timestamp::Stamp, timezone::TimeZone};

/// Returns every firing point of a `period` task inside the half-open
/// window `[t1, t2)`, formatted in the supported timestamp layout.
///
/// The first firing point is anchored at or near `t1` according to the
/// period's anchor rule. Every subsequent firing point is produced by
/// stepping in the absolute frame and then reconciling the stepped instant
/// against the UTC offset that was in effect at the anchor, so that the
/// local wall-clock hour in `tz` stays stable across daylight saving time
/// transitions. The result is strictly increasing and possibly empty; an
/// empty window is not an error.
pub fn matching_timestamps(
    period: Period,
    t1: Stamp,
    t2: Stamp,
    tz: &TimeZone,
) -> anyhow::Result<Vec<String>> {
    let points = firing_points(period, t1.get(), t2.get(), tz)?;
    Ok(points.into_iter().map(|ts| Stamp::from(ts).to_string()).collect())
}

/// Generates the firing points as instants.
///
/// The window's upper bound is exclusive and is checked against the
/// *uncorrected* cursor. Offset reconciliation only ever moves a candidate
/// by the anchor-vs-candidate offset differential, and it must not pull a
/// candidate that already overshot `t2` back inside the window.
pub(crate) fn firing_points(
    period: Period,
    t1: Timestamp,
    t2: Timestamp,
    tz: &TimeZone,
) -> anyhow::Result<Vec<Timestamp>> {
    let anchor = period.anchor(t1)?;
    let anchor_offset = tz.offset_at(anchor);

    let mut points = vec![];
    let mut cursor = anchor;
    while cursor < t2 {
        let point = if period.pins_wall_clock() {
            reconcile(cursor, anchor_offset, tz)
        } else {
            cursor
        };
        points.push(point);
        cursor = period.step(cursor)?;
    }
    Ok(points)
}

/// Cancels the offset drift a candidate picked up relative to the anchor.
///
/// If the UTC offset in effect at `candidate` differs from the offset that
/// was in effect at the anchor, the candidate is shifted by the differential
/// so that its wall-clock reading in `tz` matches what it would have been
/// had the offset never changed. The shift targets the net differential
/// between the two instants, so it holds even if several transitions
/// elapsed between them.
fn reconcile(
    candidate: Timestamp,
    anchor_offset: Offset,
    tz: &TimeZone,
) -> Timestamp {
    let offset = tz.offset_at(candidate);
    if offset == anchor_offset {
        return candidate;
    }
    let drift = SignedDuration::from_secs(i64::from(
        anchor_offset.seconds() - offset.seconds(),
    ));
    candidate
        .saturating_add(drift)
        .expect("duration arithmetic never exceeds hour units")
}

use crate::types::{Distance, UNREACHABLE, Weight, WideDistance};

/// [`UNREACHABLE`] in the wide representation used during a run.
pub const WIDE_UNREACHABLE: WideDistance = UNREACHABLE as WideDistance;

/// Computes the candidate distance obtained by following an edge of `weight`
/// out of a vertex at distance `source`.
///
/// Returns `None` when `source` is [`WIDE_UNREACHABLE`]: an unreached vertex
/// never relaxes anything. A sum that falls below `WideDistance::MIN` is
/// pinned there instead of wrapping.
pub fn relaxed_distance(source: WideDistance, weight: Weight) -> Option<WideDistance> {
    if source == WIDE_UNREACHABLE {
        return None;
    }

    Some(
        source
            .checked_add(WideDistance::from(weight))
            .unwrap_or(WideDistance::MIN),
    )
}

/// The Bellman-Ford relaxation predicate.
///
/// Returns the improved distance for a target currently at `target` if the
/// edge `source --weight--> target` offers a strictly shorter path. A negative
/// edge whose sum falls below `WideDistance::MIN` always counts as an
/// improvement, so a cycle driven that low is still seen as improving.
pub fn relax(source: WideDistance, weight: Weight, target: WideDistance) -> Option<WideDistance> {
    if source == WIDE_UNREACHABLE {
        return None;
    }

    match source.checked_add(WideDistance::from(weight)) {
        Some(candidate) => (candidate < target).then_some(candidate),
        None if weight < 0 => Some(WideDistance::MIN),
        None => None,
    }
}

/// Narrows a run distance to the reported [`Distance`].
///
/// Anything below `Distance::MIN` is clamped to it. Sums at or above
/// [`UNREACHABLE`] never relax a target, so the upper end needs no clamp.
pub fn narrow(distance: WideDistance) -> Distance {
    distance.clamp(WideDistance::from(Distance::MIN), WIDE_UNREACHABLE) as Distance
}

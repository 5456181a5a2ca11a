//! Tour optimization: reorder and orient strokes to cut pen-up travel.
//!
//! Uses a nearest-neighbor greedy heuristic on stroke endpoints. Each
//! candidate is scored by the closer of its two endpoints to the end of
//! the tour so far, and reversed when its end is the closer one.
//!
//! Runs once per pass (contours and hatching separately), so the two
//! visual passes stay apart in the final drawing order.

use crate::types::Polyline;

/// Reorder and orient polylines to shorten total travel distance.
///
/// The first non-empty polyline starts the tour unchanged. Each step
/// appends the unvisited polyline with the nearest endpoint to the
/// tour's last point. Ties go to the earliest candidate in input order,
/// and a candidate whose endpoints are equally close keeps its direction.
///
/// Empty polylines are filtered out. O(n²) in the number of polylines.
#[must_use = "returns the optimized stroke ordering"]
pub fn optimize_path_order(polylines: Vec<Polyline>) -> Vec<Polyline> {
    let mut pool: Vec<Option<Polyline>> = polylines
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(Some)
        .collect();

    let Some(first) = pool.first_mut().and_then(Option::take) else {
        return Vec::new();
    };

    let mut tour = Vec::with_capacity(pool.len());
    let mut current_end = first.last().copied();
    tour.push(first);

    while let Some(end) = current_end {
        let mut best: Option<(usize, bool)> = None;
        let mut best_dist = f64::INFINITY;

        for (j, candidate) in pool.iter().enumerate() {
            let Some(candidate) = candidate else {
                continue;
            };
            let (Some(&start), Some(&finish)) = (candidate.first(), candidate.last()) else {
                continue;
            };

            let dist_forward = end.distance_squared(start);
            let dist_reverse = end.distance_squared(finish);
            let (dist, reversed) = if dist_forward <= dist_reverse {
                (dist_forward, false)
            } else {
                (dist_reverse, true)
            };

            if dist < best_dist {
                best_dist = dist;
                best = Some((j, reversed));
            }
        }

        let Some(next) = best.and_then(|(j, reversed)| {
            let polyline = pool.get_mut(j)?.take()?;
            Some(if reversed {
                polyline.reversed()
            } else {
                polyline
            })
        }) else {
            break;
        };

        current_end = next.last().copied();
        tour.push(next);
    }

    tour
}

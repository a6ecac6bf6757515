//! Greedy nearest-neighbor ordering of a day's stops

use tracing::debug;

use crate::Result;
use crate::geo;
use crate::models::Coordinate;

/// Order `locations` into an open visiting path.
///
/// Starts at the location closest to `start`, or at index 0 when no start is
/// given, then keeps stepping to the closest unvisited location. Equal
/// distances resolve to the lowest input index, so the same input always
/// yields the same order. The path never returns to its first stop.
///
/// Returns a permutation of `0..locations.len()`.
pub fn nearest_neighbor_route(
    locations: &[Coordinate],
    start: Option<&Coordinate>,
) -> Result<Vec<usize>> {
    for location in locations {
        location.validate()?;
    }

    match locations.len() {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![0]),
        _ => {}
    }

    let mut current = match start {
        Some(start) => closest(start, locations, |_| true)?.unwrap_or(0),
        None => 0,
    };

    let mut visited = vec![false; locations.len()];
    let mut route = Vec::with_capacity(locations.len());
    visited[current] = true;
    route.push(current);

    while route.len() < locations.len() {
        let Some(next) = closest(&locations[current], locations, |i| !visited[i])? else {
            break;
        };
        visited[next] = true;
        route.push(next);
        current = next;
    }

    debug!("Ordered {} locations starting at index {}", route.len(), route[0]);
    Ok(route)
}

/// Index of the candidate nearest to `from`; strict comparison keeps the lowest index on ties
fn closest(
    from: &Coordinate,
    locations: &[Coordinate],
    candidate: impl Fn(usize) -> bool,
) -> Result<Option<usize>> {
    let mut best: Option<(usize, f64)> = None;
    for (i, location) in locations.iter().enumerate() {
        if !candidate(i) {
            continue;
        }
        let d = geo::distance(from, location)?;
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }
    Ok(best.map(|(i, _)| i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlannerError;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn assert_permutation(route: &[usize], n: usize) {
        let mut sorted = route.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_and_single() {
        assert!(nearest_neighbor_route(&[], None).unwrap().is_empty());
        assert_eq!(nearest_neighbor_route(&[coord(49.28, -123.12)], None).unwrap(), vec![0]);
    }

    #[test]
    fn test_visits_closer_location_first() {
        let locations = [coord(49.28, -123.12), coord(50.0, -119.5), coord(49.29, -123.10)];
        assert_eq!(nearest_neighbor_route(&locations, None).unwrap(), vec![0, 2, 1]);

        let locations = [coord(49.28, -123.12), coord(49.29, -123.10), coord(50.0, -119.5)];
        assert_eq!(nearest_neighbor_route(&locations, None).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_start_picks_closest_location() {
        let locations = [coord(49.28, -123.12), coord(49.29, -123.10), coord(50.0, -119.5)];
        let start = coord(49.9, -119.4);
        let route = nearest_neighbor_route(&locations, Some(&start)).unwrap();
        assert_eq!(route, vec![2, 1, 0]);
    }

    #[test]
    fn test_ties_break_on_lowest_index() {
        // Indices 1 and 2 are the same point, 3 is a mirror of it around 0
        let locations = [
            coord(10.0, 10.0),
            coord(10.0, 10.5),
            coord(10.0, 10.5),
            coord(10.0, 9.5),
        ];
        let route = nearest_neighbor_route(&locations, None).unwrap();
        assert_eq!(route[..3], [0, 1, 2]);
        assert_permutation(&route, 4);
    }

    #[test]
    fn test_route_is_deterministic_permutation() {
        let locations: Vec<Coordinate> = (0..25_u32)
            .map(|i| {
                let i = f64::from(i);
                coord(49.0 + (i * 0.37) % 1.0, -123.0 + (i * 0.53) % 1.0)
            })
            .collect();

        let first = nearest_neighbor_route(&locations, None).unwrap();
        let second = nearest_neighbor_route(&locations, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), locations.len());
        assert_eq!(first[0], 0);
        assert_permutation(&first, locations.len());
    }

    #[test]
    fn test_invalid_location_rejected() {
        let locations = [
            coord(10.0, 10.0),
            Coordinate {
                latitude: 100.0,
                longitude: 0.0,
            },
        ];
        let result = nearest_neighbor_route(&locations, None);
        assert!(matches!(result, Err(PlannerError::InvalidCoordinate { .. })));
    }
}

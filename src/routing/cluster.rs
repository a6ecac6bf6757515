//! Seed-radius proximity clustering for coarse day grouping

use serde::Serialize;
use tracing::debug;

use crate::geo;
use crate::models::LocatedVenue;
use crate::{PlannerError, Result};

/// Venues judged close to a common seed venue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Seed first, then joiners in input order
    pub members: Vec<LocatedVenue>,
}

impl Cluster {
    #[must_use]
    pub fn seed(&self) -> &LocatedVenue {
        &self.members[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Partition `venues` into clusters around successive seeds.
///
/// The first unassigned venue seeds a cluster and every later unassigned
/// venue within `max_distance_km` of that seed joins it. Distances are always
/// measured to the seed, never to a centroid or to other members, so two
/// nearby venues may land in different clusters. A venue without a position
/// never joins a cluster and becomes a singleton when it is picked as a seed.
pub fn cluster_by_proximity(
    venues: &[LocatedVenue],
    max_distance_km: f64,
) -> Result<Vec<Cluster>> {
    if !max_distance_km.is_finite() || max_distance_km < 0.0 {
        return Err(PlannerError::validation(format!(
            "cluster radius must be a non-negative distance, got {max_distance_km}"
        )));
    }

    let mut assigned = vec![false; venues.len()];
    let mut clusters = Vec::new();

    for seed_index in 0..venues.len() {
        if assigned[seed_index] {
            continue;
        }
        assigned[seed_index] = true;
        let seed = &venues[seed_index];
        let mut members = vec![seed.clone()];

        if let Some(anchor) = &seed.coordinate {
            for candidate_index in seed_index + 1..venues.len() {
                if assigned[candidate_index] {
                    continue;
                }
                let Some(position) = &venues[candidate_index].coordinate else {
                    continue;
                };
                if geo::distance(anchor, position)? <= max_distance_km {
                    assigned[candidate_index] = true;
                    members.push(venues[candidate_index].clone());
                }
            }
        }

        clusters.push(Cluster { members });
    }

    debug!(
        "Grouped {} venues into {} clusters within {}km",
        venues.len(),
        clusters.len(),
        max_distance_km
    );
    Ok(clusters)
}

//! Route optimisation: visiting order, proximity grouping and leg timing

pub mod cluster;
pub mod live;
pub mod nearest_neighbor;
pub mod travel_time;

pub use cluster::{Cluster, cluster_by_proximity};
pub use live::{LegEstimate, LegTimer, MeasuredLeg, OsrmClient, RouteProvider};
pub use nearest_neighbor::nearest_neighbor_route;
pub use travel_time::{TravelMode, estimate};

//! Great-circle distance between coordinates

use haversine::Units;

use crate::Result;
use crate::models::Coordinate;

/// Surface distance in kilometres between two validated coordinates.
///
/// Uses the haversine great-circle model, so a degree of longitude shrinks
/// with latitude as it does on the ground.
pub fn distance(a: &Coordinate, b: &Coordinate) -> Result<f64> {
    a.validate()?;
    b.validate()?;
    if a == b {
        return Ok(0.0);
    }
    let km = haversine::distance((*a).into(), (*b).into(), Units::Kilometers);
    Ok(km.max(0.0))
}

/// Sum of consecutive leg distances along `path`
pub fn path_length(path: &[Coordinate]) -> Result<f64> {
    path.windows(2)
        .map(|leg| distance(&leg[0], &leg[1]))
        .sum()
}

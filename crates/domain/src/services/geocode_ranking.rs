//! Filtering, ranking and selection of geocoding candidates.

use geo::{coord, Centroid, HaversineDistance, Intersects, MultiPoint, Point, Rect};
use std::cmp::Ordering;

use crate::models::{Address, AddressCandidate, BoundingBox, Coordinates};

fn to_point(c: Coordinates) -> Point<f64> {
    Point::new(c.lng, c.lat)
}

/// Great-circle distance in metres.
pub fn haversine_distance(a: Coordinates, b: Coordinates) -> f64 {
    to_point(a).haversine_distance(&to_point(b))
}

fn bbox_contains(bbox: &BoundingBox, c: Coordinates) -> bool {
    let rect = Rect::new(
        coord! { x: bbox.min_lng, y: bbox.min_lat },
        coord! { x: bbox.max_lng, y: bbox.max_lat },
    );
    rect.intersects(&coord! { x: c.lng, y: c.lat })
}

/// Drops candidates outside `bbox` and sorts the rest by distance to `center`.
///
/// The sort is stable, so candidates at equal distance keep provider order.
/// Without a center the provider order is kept and `distance` stays unset.
pub fn geocoding_get_address_candidates(
    candidates: Vec<AddressCandidate>,
    bbox: Option<&BoundingBox>,
    center: Option<Coordinates>,
) -> Vec<AddressCandidate> {
    let mut kept: Vec<AddressCandidate> = candidates
        .into_iter()
        .filter(|c| bbox.map_or(true, |b| bbox_contains(b, c.coordinates)))
        .map(|mut c| {
            c.distance = center.map(|center| haversine_distance(center, c.coordinates));
            c
        })
        .collect();

    if center.is_some() {
        kept.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
        });
    }
    kept
}

/// Picks the candidate to use for an address.
///
/// With more than one candidate and an expected postal code, the first candidate
/// with exactly that postal code wins; otherwise the first candidate.
pub fn get_best_matching_location<'a>(
    candidates: &'a [AddressCandidate],
    post_code: Option<&str>,
) -> Option<&'a AddressCandidate> {
    if candidates.len() > 1 {
        if let Some(expected) = post_code.map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(found) = candidates
                .iter()
                .find(|c| c.postal_code.as_deref().map(str::trim) == Some(expected))
            {
                return Some(found);
            }
        }
    }
    candidates.first()
}

/// Whether the candidate list is ambiguous for `post_code`: several candidates, none
/// matching the expected postal code.
pub fn is_ambiguous(candidates: &[AddressCandidate], post_code: Option<&str>) -> bool {
    candidates.len() > 1
        && !candidates.iter().any(|c| {
            c.postal_code.as_deref().map(str::trim) == post_code.map(str::trim)
                && c.postal_code.is_some()
        })
}

/// Reference point for ranking: the configured center, else the centroid of
/// already located entities, else the center of the bounding box.
pub fn center_of_gravity(
    configured: Option<Coordinates>,
    located: &[Coordinates],
    bbox: Option<&BoundingBox>,
) -> Option<Coordinates> {
    if configured.is_some() {
        return configured;
    }

    let points: Vec<Point<f64>> = located.iter().copied().map(to_point).collect();
    if let Some(centroid) = MultiPoint::from(points).centroid() {
        return Some(Coordinates::new(centroid.y(), centroid.x()));
    }

    bbox.map(BoundingBox::center)
}

/// Whether an address has to be sent to a provider.
///
/// Skipped when coordinates came with the row, the address is not geocodable,
/// or the address is unchanged and a point is already stored.
pub fn needs_geocoding(
    address: &Address,
    explicit_point: bool,
    previous: Option<(&Address, Option<Coordinates>)>,
) -> bool {
    if explicit_point || !address.is_geocodable() {
        return false;
    }
    match previous {
        Some((old_address, Some(_))) => address.differs_for_geocoding(old_address),
        _ => true,
    }
}

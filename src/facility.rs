//! Facility directory: static lookup for the RESULT envelope's hint.
//!
//! Read-only and in-memory. Providers are never ranked; with coordinates the
//! list is ordered by haversine distance, without them it stays in catalog
//! order.

use serde::{Deserialize, Serialize};

use crate::catalog::types::FacilityEntry;
use crate::text::normalize::normalize;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// One directory hit attached to an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityHit {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// Great-circle distance in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// In-memory facility index.
#[derive(Debug, Clone)]
pub struct FacilityDirectory {
    facilities: Vec<FacilityEntry>,
}

impl FacilityDirectory {
    pub fn new(facilities: Vec<FacilityEntry>) -> Self {
        Self { facilities }
    }

    /// Facilities serving a specialty, optionally filtered by city and
    /// ordered by distance when coordinates are supplied.
    pub fn lookup(
        &self,
        specialty_id: &str,
        city: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
        limit: usize,
    ) -> Vec<FacilityHit> {
        let city_filter = city.map(normalize);

        let mut hits: Vec<FacilityHit> = self
            .facilities
            .iter()
            .filter(|f| f.specialty_ids.iter().any(|id| id == specialty_id))
            .filter(|f| {
                city_filter
                    .as_ref()
                    .map(|wanted| normalize(&f.city) == *wanted)
                    .unwrap_or(true)
            })
            .map(|f| {
                let distance_km = match (lat, lon, f.lat, f.lon) {
                    (Some(lat), Some(lon), Some(f_lat), Some(f_lon)) => {
                        Some(haversine_km(lat, lon, f_lat, f_lon))
                    }
                    _ => None,
                };
                FacilityHit {
                    name: f.name.clone(),
                    kind: f.kind.clone(),
                    address: f.address.clone(),
                    city: f.city.clone(),
                    distance_km,
                    lat: f.lat,
                    lon: f.lon,
                }
            })
            .collect();

        if lat.is_some() && lon.is_some() {
            // Facilities without coordinates sort after the measurable ones.
            hits.sort_by(|a, b| match (a.distance_km, b.distance_km) {
                (Some(x), Some(y)) => x
                    .partial_cmp(&y)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.name.cmp(&b.name)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }

        hits.truncate(limit);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn directory() -> FacilityDirectory {
        FacilityDirectory::new(Catalog::load_test().facilities)
    }

    #[test]
    fn haversine_istanbul_ankara_is_plausible() {
        // İstanbul → Ankara is roughly 350 km as the crow flies.
        let d = haversine_km(41.015, 28.979, 39.92, 32.854);
        assert!((300.0..400.0).contains(&d), "got {d}");
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert!(haversine_km(41.0, 29.0, 41.0, 29.0).abs() < 1e-9);
    }

    #[test]
    fn lookup_filters_by_specialty() {
        let hits = directory().lookup("neurology", None, None, None, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Merkez Nöroloji Kliniği");
        assert!(hits[0].distance_km.is_none());
    }

    #[test]
    fn lookup_unknown_specialty_is_empty() {
        assert!(directory().lookup("no_such", None, None, None, 10).is_empty());
    }

    #[test]
    fn coordinates_order_by_distance() {
        // From İstanbul, the İstanbul hospital must come first for
        // internal_medicine; the entry without coordinates sorts last.
        let hits = directory().lookup("internal_medicine", None, Some(41.0), Some(29.0), 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "Şehir Hastanesi Acil Servisi");
        assert!(hits[0].distance_km.unwrap() < 10.0);
        assert!(hits[1].distance_km.is_none());
    }

    #[test]
    fn city_filter_is_normalized() {
        let hits = directory().lookup("internal_medicine", Some("İSTANBUL"), None, None, 10);
        assert_eq!(hits.len(), 2);
        let hits = directory().lookup("internal_medicine", Some("Ankara"), None, None, 10);
        assert!(hits.is_empty());
    }

    #[test]
    fn without_coordinates_order_is_insertion_stable() {
        let hits = directory().lookup("internal_medicine", None, None, None, 10);
        assert_eq!(hits[0].name, "Şehir Hastanesi Acil Servisi");
        assert_eq!(hits[1].name, "Anadolu Polikliniği");
    }

    #[test]
    fn limit_truncates() {
        let hits = directory().lookup("internal_medicine", None, None, None, 1);
        assert_eq!(hits.len(), 1);
    }
}

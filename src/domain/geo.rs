// src/domain/geo.rs

use serde::Serialize;

use crate::domain::campaign::Campaign;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in metres.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = (lat2 - lat1).to_radians();
    let dl = (lon2 - lon1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyCampaign {
    pub campaign: Campaign,
    pub distance_m: f64,
}

/// Closest campaigns first; campaigns without coordinates are skipped.
pub fn nearest(campaigns: Vec<Campaign>, lat: f64, lon: f64, limit: usize) -> Vec<NearbyCampaign> {
    let mut out: Vec<NearbyCampaign> = campaigns
        .into_iter()
        .filter_map(|c| {
            let (clat, clon) = (c.latitude?, c.longitude?);
            Some(NearbyCampaign { distance_m: haversine_m(lat, lon, clat, clon), campaign: c })
        })
        .collect();
    out.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    out.truncate(limit);
    out
}

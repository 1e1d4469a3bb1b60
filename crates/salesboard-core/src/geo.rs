//! Static city-coordinate table for the revenue map.
//!
//! Lookup is exact after trimming and uppercasing; no fuzzy matching.
//! Cities absent from the table are "unmapped": excluded from the map
//! payload but kept for a tabular fallback so their revenue stays visible.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::charts::RevenueSlice;

// Major Indian metros seen in marketplace shipping data, keyed uppercase.
static CITY_COORDINATES: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([
        ("MUMBAI", (19.0760, 72.8777)),
        ("DELHI", (28.7041, 77.1025)),
        ("NEW DELHI", (28.6139, 77.2090)),
        ("BENGALURU", (12.9716, 77.5946)),
        ("BANGALORE", (12.9716, 77.5946)),
        ("HYDERABAD", (17.3850, 78.4867)),
        ("CHENNAI", (13.0827, 80.2707)),
        ("KOLKATA", (22.5726, 88.3639)),
        ("PUNE", (18.5204, 73.8567)),
        ("AHMEDABAD", (23.0225, 72.5714)),
        ("JAIPUR", (26.9124, 75.7873)),
        ("SURAT", (21.1702, 72.8311)),
        ("LUCKNOW", (26.8467, 80.9462)),
        ("KANPUR", (26.4499, 80.3319)),
        ("NAGPUR", (21.1458, 79.0882)),
        ("INDORE", (22.7196, 75.8577)),
        ("BHOPAL", (23.2599, 77.4126)),
        ("PATNA", (25.5941, 85.1376)),
        ("CHANDIGARH", (30.7333, 76.7794)),
        ("GURUGRAM", (28.4595, 77.0266)),
    ])
});

/// Look up a city's (latitude, longitude), case-insensitively and with
/// surrounding whitespace ignored.
pub fn city_coordinates(name: &str) -> Option<(f64, f64)> {
    let key = name.trim().to_uppercase();
    CITY_COORDINATES.get(key.as_str()).copied()
}

/// A city revenue bubble on the scatter map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityPoint {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub revenue: f64,
}

/// Map payload: plottable points plus the unmapped remainder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityRevenueMap {
    pub points: Vec<CityPoint>,
    pub unmapped: Vec<RevenueSlice>,
}

impl CityRevenueMap {
    /// True when nothing could be plotted; the UI then falls back to the
    /// tabular display of `unmapped`.
    pub fn is_unplottable(&self) -> bool {
        self.points.is_empty()
    }
}

/// Split per-city revenue into mapped points and unmapped slices.
pub fn map_city_revenue(slices: Vec<RevenueSlice>) -> CityRevenueMap {
    let mut map = CityRevenueMap::default();
    for slice in slices {
        match city_coordinates(&slice.label) {
            Some((lat, lon)) => map.points.push(CityPoint {
                city: slice.label,
                lat,
                lon,
                revenue: slice.revenue,
            }),
            None => map.unmapped.push(slice),
        }
    }
    map
}

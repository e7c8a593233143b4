/// Observing site. Defaults to the Berkeley campus interferometer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundStation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Default for GroundStation {
    fn default() -> Self {
        Self {
            latitude_deg: 37.8716,
            longitude_deg: -122.2727,
            altitude_m: 0.0,
        }
    }
}

impl GroundStation {
    /// Parses `"lat, lon"` in degrees.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self {
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_m: altitude_m.unwrap_or(0.0),
        })
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lon_pair() {
        let station = GroundStation::from_coordinates(" 37.8716, -122.2727 ", Some(120.0)).unwrap();
        assert_eq!(station.latitude_deg, 37.8716);
        assert_eq!(station.longitude_deg, -122.2727);
        assert_eq!(station.altitude_m, 120.0);
    }

    #[test]
    fn rejects_malformed_coordinates() {
        assert!(GroundStation::from_coordinates("37.8", None).is_none());
        assert!(GroundStation::from_coordinates("north, west", None).is_none());
        assert!(GroundStation::from_coordinates("95.0, 10.0", None).is_none());
    }
}

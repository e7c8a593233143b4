use std::f64::consts::TAU;

use chrono::{DateTime, Utc};

use super::ground_station::GroundStation;

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const J2000_JD: f64 = 2_451_545.0;

/// Equatorial position, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaDec {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

/// Horizontal position, degrees. Azimuth is measured from north through east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltAz {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

pub fn julian_date(time: DateTime<Utc>) -> f64 {
    let seconds = time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) * 1e-9;
    seconds / 86_400.0 + UNIX_EPOCH_JD
}

/// Greenwich mean sidereal time in radians, in `[0, 2π)`.
pub fn greenwich_sidereal_time(time: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&time.naive_utc()))
        .rem_euclid(TAU)
}

/// Local sidereal time in degrees, in `[0, 360)`.
pub fn local_sidereal_time(time: DateTime<Utc>, longitude_deg: f64) -> f64 {
    (greenwich_sidereal_time(time).to_degrees() + longitude_deg).rem_euclid(360.0)
}

/// Apparent solar position from the low-precision almanac series
/// (good to about 0.01 degrees between 1950 and 2050).
pub fn sun_position(jd: f64) -> RaDec {
    let n = jd - J2000_JD;
    let mean_longitude = (280.460 + 0.985_647_4 * n).rem_euclid(360.0);
    let mean_anomaly = (357.528 + 0.985_600_3 * n).rem_euclid(360.0).to_radians();
    let ecliptic_longitude = (mean_longitude
        + 1.915 * mean_anomaly.sin()
        + 0.020 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let obliquity = (23.439 - 0.000_000_4 * n).to_radians();

    let ra = (obliquity.cos() * ecliptic_longitude.sin()).atan2(ecliptic_longitude.cos());
    let dec = (obliquity.sin() * ecliptic_longitude.sin()).asin();

    RaDec {
        ra_deg: ra.to_degrees().rem_euclid(360.0),
        dec_deg: dec.to_degrees(),
    }
}

pub fn altaz_from_radec(position: RaDec, time: DateTime<Utc>, station: &GroundStation) -> AltAz {
    let gmst = greenwich_sidereal_time(time);
    let dec = position.dec_deg.to_radians();
    let earth_fixed_lon = position.ra_deg.to_radians() - gmst;

    let direction = [
        dec.cos() * earth_fixed_lon.cos(),
        dec.cos() * earth_fixed_lon.sin(),
        dec.sin(),
    ];
    let (east, north, up) = ecef_to_enu(direction, station.lat_rad(), station.lon_rad());

    AltAz {
        altitude_deg: up.clamp(-1.0, 1.0).asin().to_degrees(),
        azimuth_deg: east.atan2(north).to_degrees().rem_euclid(360.0),
    }
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

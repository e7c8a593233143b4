use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::coord::{altaz_from_radec, julian_date, sun_position, AltAz, GroundStation, RaDec};

/// Acquisition parameters, fixed for the whole session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionParams {
    pub nsamples: usize,
    pub nblocks: usize,
    pub duration: Duration,
}

/// What the telescope should look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetSpec {
    Sun,
    RaDec(RaDec),
    AltAz(AltAz),
}

impl TargetSpec {
    /// Converts the target to a fixed horizontal position at `now`.
    pub fn resolve(&self, now: DateTime<Utc>, station: &GroundStation) -> AltAz {
        match self {
            TargetSpec::Sun => {
                let sun = sun_position(julian_date(now));
                let altaz = altaz_from_radec(sun, now, station);
                log::info!(
                    "Sun Position -> RA: {:.2}, Dec: {:.2}, Alt: {:.2}, Az: {:.2}",
                    sun.ra_deg,
                    sun.dec_deg,
                    altaz.altitude_deg,
                    altaz.azimuth_deg
                );
                altaz
            }
            TargetSpec::RaDec(position) => {
                let altaz = altaz_from_radec(*position, now, station);
                log::info!(
                    "RA/Dec ({:.2}, {:.2}) -> Alt: {:.2}, Az: {:.2}",
                    position.ra_deg,
                    position.dec_deg,
                    altaz.altitude_deg,
                    altaz.azimuth_deg
                );
                altaz
            }
            TargetSpec::AltAz(altaz) => *altaz,
        }
    }
}

/// Values supplied on the command line; anything missing is prompted for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamOverrides {
    pub sun: bool,
    pub ra_deg: Option<f64>,
    pub dec_deg: Option<f64>,
    pub alt_deg: Option<f64>,
    pub az_deg: Option<f64>,
    pub nsamples: Option<usize>,
    pub nblocks: Option<usize>,
    pub duration_s: Option<f64>,
}

impl ParamOverrides {
    pub fn target(&self) -> Option<TargetSpec> {
        if self.sun {
            return Some(TargetSpec::Sun);
        }
        if let (Some(ra_deg), Some(dec_deg)) = (self.ra_deg, self.dec_deg) {
            return Some(TargetSpec::RaDec(RaDec { ra_deg, dec_deg }));
        }
        if let (Some(altitude_deg), Some(azimuth_deg)) = (self.alt_deg, self.az_deg) {
            return Some(TargetSpec::AltAz(AltAz {
                altitude_deg,
                azimuth_deg,
            }));
        }
        None
    }
}

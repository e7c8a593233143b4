use std::fmt;

use chrono::{DateTime, Local, Utc};

use super::ephemeris::{julian_date, local_sidereal_time};
use super::ground_station::GroundStation;

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Clock readings logged at the start of a session.
#[derive(Debug, Clone)]
pub struct TimingReport {
    pub utc: DateTime<Utc>,
    pub local: DateTime<Local>,
    pub unix_time: f64,
    pub julian_date: f64,
    pub lst_deg: f64,
}

impl TimingReport {
    pub fn at(utc: DateTime<Utc>, station: &GroundStation) -> Self {
        let jd = julian_date(utc);
        Self {
            utc,
            local: utc.with_timezone(&Local),
            unix_time: utc.timestamp_millis() as f64 / 1000.0,
            julian_date: jd,
            lst_deg: local_sidereal_time(utc, station.longitude_deg),
        }
    }
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "local {} | UTC {} | unix {:.3} | JD {:.6} | LST {:.4} h",
            self.local.format("%Y-%m-%d %H:%M:%S"),
            self.utc.format("%Y-%m-%dT%H:%M:%SZ"),
            self.unix_time,
            self.julian_date,
            self.lst_deg / 15.0
        )
    }
}

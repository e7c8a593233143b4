mod ephemeris;
mod ground_station;
mod timing;

pub use ephemeris::{altaz_from_radec, julian_date, sun_position, AltAz, RaDec};
pub use ground_station::GroundStation;
pub use timing::{utc_now, TimingReport};

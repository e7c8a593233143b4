mod buffer;
mod record;
pub mod snapshot;

pub use buffer::ObservationLog;
pub use record::{ObservationRecord, Payload, SdrCapture, SpectrometerReading};
pub use snapshot::SnapshotWriter;

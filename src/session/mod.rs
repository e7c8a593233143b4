mod controller;
mod loops;
mod params;
mod prompt;
mod status;

pub use controller::{Session, SessionSettings};
pub use loops::LoopIntervals;
pub use params::ParamOverrides;
pub use prompt::Prompter;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("driver command `{cmd}` exited with code {code}: {stderr}")]
    CommandFailed {
        cmd: String,
        code: i32,
        stderr: String,
    },
    #[error("invalid driver output: {0}")]
    InvalidOutput(#[from] serde_json::Error),
    #[error("device error: {0}")]
    Device(String),
    #[error("driver call aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

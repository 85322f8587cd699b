use std::io;
use thiserror::Error;

/// Conditions under which the tank cannot run at all.
#[derive(Debug, Error)]
pub enum TankError {
    #[error("host did not report a display region to size the tank against")]
    NoHostRegion,
    #[error("no output sink: full-screen mode needs stdout to be a terminal")]
    NoOutputSink,
    #[error("writing frame: {0}")]
    Io(#[from] io::Error),
}

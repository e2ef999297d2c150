use std::{io, path::PathBuf};

use fleetdeck_lib::collaborators::PersistenceError;
use sysexits::ExitCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] fleetdeck_lib::Error),
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to prepare the state directory: {0}")]
    StateDir(io::Error),
}

impl Error {
    pub fn exit_code(&self) -> ExitCode {
        use fleetdeck_lib::Error as Core;

        match self {
            Self::Core(Core::Validation(_) | Core::Avatar(_)) => ExitCode::DataErr,
            Self::Core(Core::Entity(_)) => ExitCode::NoInput,
            Self::Core(Core::Persistence(PersistenceError::Unauthenticated)) => ExitCode::NoPerm,
            Self::Core(Core::Persistence(_)) => ExitCode::Unavailable,
            Self::Core(Core::Config(_)) => ExitCode::Config,
            Self::Core(Core::Draft(_)) => ExitCode::Software,
            Self::Read { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => ExitCode::NoInput,
                io::ErrorKind::PermissionDenied => ExitCode::NoPerm,
                _ => ExitCode::IoErr,
            },
            Self::StateDir(_) => ExitCode::CantCreat,
        }
    }
}

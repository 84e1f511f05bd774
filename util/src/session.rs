//! Execution sessions
//!
//! Every run of an executable gets its own directory under the software
//! root's `sessions` directory, named after the executable and the time the
//! run started. The log, the archives and any saved state of the run all go
//! into that directory. The start time is the session epoch, which log and
//! archive timestamps are measured from.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::{OnceCell, TryInitError};
use log::info;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// Epoch shared by every session of this process, set by the first one.
static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Timestamp suffix of session directory names, in chrono's strftime syntax.
const DIR_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Name of the archive directory inside a session.
const ARCH_DIR_NAME: &str = "arch";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Paths belonging to one run of an executable.
#[derive(Clone, Debug)]
pub struct Session {
    /// Time the first session of this process was started.
    pub epoch: DateTime<Utc>,

    pub session_root: PathBuf,

    /// Root of the CSV archives, see [`crate::archive::Archiver::from_path`].
    pub arch_root: PathBuf,

    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable (ARM_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot create the session directory {0:?}: {1}")]
    CannotCreateDir(PathBuf, std::io::Error),

    #[error("Cannot set the session epoch: {0}")]
    CannotInitEpoch(TryInitError),

    #[error("Cannot write the session file {0:?}: {1}")]
    SaveIoError(PathBuf, std::io::Error),

    #[error("Cannot serialise data for the session file {0:?}: {1}")]
    SaveSerError(PathBuf, serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a session in `$ARM_SW_ROOT/{sessions_dir}`.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let root = crate::host::get_arm_sw_root()
            .map_err(|_| SessionError::SwRootNotSet)?;

        Self::create_in(root.join(sessions_dir), exec_name)
    }

    /// Start a session in the given directory.
    ///
    /// The session directory `{exec_name}_{timestamp}` and its archive
    /// directory are created if they don't already exist.
    pub fn create_in<P: AsRef<Path>>(
        sessions_dir: P,
        exec_name: &str
    ) -> Result<Self, SessionError> {
        let epoch = *init_epoch()?;

        let session_root = sessions_dir.as_ref().join(format!(
            "{}_{}",
            exec_name,
            epoch.format(DIR_TIMESTAMP_FORMAT)
        ));
        let arch_root = session_root.join(ARCH_DIR_NAME);

        fs::create_dir_all(&arch_root)
            .map_err(|e| SessionError::CannotCreateDir(arch_root.clone(), e))?;

        Ok(Session {
            epoch,
            log_file_path: session_root.join(format!("{}.log", exec_name)),
            session_root,
            arch_root,
        })
    }

    /// Write `data` as pretty printed JSON to a path relative to the session
    /// root, replacing any existing file.
    pub fn save<P: AsRef<Path>, T: Serialize>(
        &self,
        path: P,
        data: &T
    ) -> Result<(), SessionError> {
        let full_path = self.session_root.join(path);
        let io_err = |e| SessionError::SaveIoError(full_path.clone(), e);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = File::create(&full_path).map_err(io_err)?;

        serde_json::to_writer_pretty(file, data)
            .map_err(|e| SessionError::SaveSerError(full_path.clone(), e))?;

        info!("Saved {:?}", full_path);

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds since the session epoch, or `None` if no session has been started.
pub fn get_elapsed_seconds() -> Option<f64> {
    SESSION_EPOCH
        .get()
        .and_then(|epoch| time::duration_to_seconds(Utc::now() - *epoch))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn init_epoch() -> Result<&'static DateTime<Utc>, SessionError> {
    match SESSION_EPOCH.try_init_once(Utc::now) {
        Ok(()) | Err(TryInitError::AlreadyInit) => (),
        Err(e) => return Err(SessionError::CannotInitEpoch(e)),
    }

    SESSION_EPOCH
        .get()
        .ok_or(SessionError::CannotInitEpoch(TryInitError::WouldBlock))
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Joints {
        shoulder_rad: f64,
        elbow_rad: f64,
    }

    #[test]
    fn test_session_dirs_and_save() {
        let sessions_dir = std::env::temp_dir()
            .join(format!("util_session_test_{}", std::process::id()));

        let session = Session::create_in(&sessions_dir, "test_exec").unwrap();
        assert!(session.session_root.starts_with(&sessions_dir));
        assert!(session.arch_root.is_dir());
        assert_eq!(
            session.log_file_path.file_name().unwrap(),
            "test_exec.log"
        );

        // A second session in the same process shares the epoch
        let other = Session::create_in(&sessions_dir, "other_exec").unwrap();
        assert_eq!(other.epoch, session.epoch);
        assert!(get_elapsed_seconds().unwrap() >= 0.0);

        session
            .save("state/joints.json", &Joints { shoulder_rad: 0.5, elbow_rad: -1.0 })
            .unwrap();
        let saved: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(session.session_root.join("state/joints.json")).unwrap()
        ).unwrap();
        assert_eq!(saved["elbow_rad"], -1.0);

        fs::remove_dir_all(&sessions_dir).ok();
    }
}

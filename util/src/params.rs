//! Parameter file loading
//!
//! Parameter files are TOML, kept in the `params` directory of the software
//! root (`$ARM_SW_ROOT/params`), and deserialise straight into each module's
//! `Params` struct.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (ARM_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Directory holding the parameter files.
pub fn params_dir() -> Result<PathBuf, LoadError> {
    crate::host::get_arm_sw_root()
        .map(|root| root.join("params"))
        .map_err(|_| LoadError::SwRootNotSet)
}

/// Load a parameter file, the path is relative to [`params_dir`].
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    load_path(params_dir()?.join(param_file_path))
}

/// Load a parameter file from anywhere on disk.
pub fn load_path<P, Q>(path: Q) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    Q: AsRef<Path>
{
    let params_str = read_to_string(path.as_ref())
        .map_err(|e| LoadError::FileLoadError(path.as_ref().to_path_buf(), e))?;

    parse(&params_str)
}

/// Parse a parameter structure from a TOML string.
pub fn parse<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Gains {
        k_p: f64,
        #[serde(default)]
        k_i: f64,
    }

    #[test]
    fn test_parse() {
        let gains: Gains = parse("k_p = 2.5").unwrap();
        assert_eq!(gains, Gains { k_p: 2.5, k_i: 0.0 });

        assert!(matches!(
            parse::<Gains>("k_p = \"fast\""),
            Err(LoadError::DeserialiseError(_))
        ));
    }

    #[test]
    fn test_load_missing_path() {
        let res = load_path::<Gains, _>("/nonexistent/gains.toml");

        match res {
            Err(LoadError::FileLoadError(path, _)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/gains.toml"))
            }
            e => panic!("Expected a file load error, got {:?}", e),
        }
    }
}

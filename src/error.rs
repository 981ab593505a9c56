use std::fmt;
use thiserror::Error;

/// A step of the WGS84 to National Grid pipeline, used to pinpoint where a computation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    GeographicToCartesian,
    Helmert,
    CartesianToGeographic,
    Projection,
    InverseProjection,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::GeographicToCartesian => "geographic to cartesian",
            Stage::Helmert => "helmert transform",
            Stage::CartesianToGeographic => "cartesian to geographic",
            Stage::Projection => "grid projection",
            Stage::InverseProjection => "inverse grid projection",
        };
        f.write_str(name)
    }
}

/// Malformed textual input: NMEA-style coordinates or grid reference strings.
///
/// These indicate a data-quality problem with the input and are never worth retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("missing '{delimiter}' in coordinate {input:?}")]
    MissingDelimiter { input: String, delimiter: char },

    #[error("invalid {field} in coordinate {input:?}")]
    InvalidNumber { input: String, field: &'static str },

    #[error("expected hemisphere {expected} in coordinate {input:?}, found {found:?}")]
    InvalidHemisphere {
        input: String,
        found: String,
        expected: &'static str,
    },

    #[error("minutes must be in [0, 60), got {minutes} in coordinate {input:?}")]
    MinutesOutOfRange { input: String, minutes: f64 },

    #[error("position {latitude}°, {longitude}° is outside [-90, 90]° x [-180, 180]°")]
    OutOfRange { latitude: f64, longitude: f64 },

    #[error("invalid grid square letters in grid reference {input:?}")]
    InvalidGridLetters { input: String },

    #[error("grid reference {input:?} must have an even number of at most 10 digits")]
    InvalidGridDigits { input: String },
}

/// A coordinate that could not be carried through the numeric pipeline.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConversionError {
    #[error("{stage} produced a non-finite or degenerate value")]
    NonFinite { stage: Stage },

    #[error("{stage} did not converge after {iterations} iterations")]
    DidNotConverge { stage: Stage, iterations: usize },

    #[error("easting {easting}m, northing {northing}m does not lie on the National Grid")]
    InvalidGridReference { easting: f64, northing: f64 },
}

/// Any failure of the full text-to-grid-reference pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

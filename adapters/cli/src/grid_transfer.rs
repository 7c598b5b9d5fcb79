#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use cell_lab_core::MAX_NEIGHBORS;
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "cells";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "cells:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of a square cell grid suitable for single-line transfer.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GridSnapshot {
    /// Edge length of the captured grid.
    pub(crate) size: u32,
    /// Raw cell values in row-major order, one byte per cell.
    pub(crate) cells: Vec<u8>,
}

impl GridSnapshot {
    /// Encodes the snapshot into a single-line string suitable for
    /// clipboard transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializablePayload {
            cells: self.cells.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("grid snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:{0}x{0}:{encoded}", self.size)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, GridTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GridTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(GridTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(GridTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(GridTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(GridTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(GridTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(GridTransferError::UnsupportedVersion(version.to_owned()));
        }

        let size = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(GridTransferError::InvalidEncoding)?;
        let decoded: SerializablePayload =
            serde_json::from_slice(&bytes).map_err(GridTransferError::InvalidPayload)?;

        let expected = size as usize * size as usize;
        if decoded.cells.len() != expected {
            return Err(GridTransferError::WrongCellCount {
                expected,
                actual: decoded.cells.len(),
            });
        }
        if let Some(&value) = decoded.cells.iter().find(|&&value| value > MAX_NEIGHBORS) {
            return Err(GridTransferError::ValueOutOfRange(value));
        }

        Ok(Self {
            size,
            cells: decoded.cells,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializablePayload {
    cells: Vec<u8>,
}

/// Errors that can occur while decoding grid transfer strings.
#[derive(Debug)]
pub(crate) enum GridTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The payload held a different number of cells than the dimensions
    /// promise.
    WrongCellCount {
        /// Cell count implied by the dimensions segment.
        expected: usize,
        /// Cell count actually present in the payload.
        actual: usize,
    },
    /// A cell value exceeded the supported range.
    ValueOutOfRange(u8),
}

impl fmt::Display for GridTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "transfer payload was empty"),
            Self::MissingPrefix => write!(f, "transfer string is missing the prefix"),
            Self::MissingVersion => write!(f, "transfer string is missing the version"),
            Self::MissingDimensions => write!(f, "transfer string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "transfer string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "transfer prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "transfer version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode transfer payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse transfer payload: {error}")
            }
            Self::WrongCellCount { expected, actual } => {
                write!(f, "expected {expected} cells in the payload, found {actual}")
            }
            Self::ValueOutOfRange(value) => {
                write!(f, "cell value {value} exceeds the supported range")
            }
        }
    }
}

impl Error for GridTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<u32, GridTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| GridTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| GridTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| GridTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || columns != rows {
        return Err(GridTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok(columns)
}

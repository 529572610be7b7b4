// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Timespan with start after end
    InvalidTimespan(String),
    /// Rectangle with negative extent
    InvalidRect(String),
    /// Malformed observation row or element
    MalformedObservation(String),
    /// Unknown class code in a code table
    UnknownClass(String),
    /// Crop region does not intersect the frame
    CropOutOfBounds(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::InvalidTimespan(msg) => write!(f, "Invalid timespan: {}", msg),
            DomainError::InvalidRect(msg) => write!(f, "Invalid rectangle: {}", msg),
            DomainError::MalformedObservation(msg) => write!(f, "Malformed observation: {}", msg),
            DomainError::UnknownClass(msg) => write!(f, "Unknown class: {}", msg),
            DomainError::CropOutOfBounds(msg) => write!(f, "Crop out of bounds: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

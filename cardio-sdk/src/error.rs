//! Error types for generators and dispatchers.

use std::io;
use std::net::SocketAddr;

use cardio_types::PatientId;
use thiserror::Error;

/// Errors raised inside the SDK.
///
/// Only [`Error::Bind`] ever reaches a caller: it is returned when a socket
/// dispatcher cannot start listening. The other variants are logged and
/// swallowed where they occur so a single patient or channel failure never
/// interrupts the driver.
#[derive(Debug, Error)]
pub enum Error {
    /// Patient ID outside `1..=patient_count`.
    #[error("Invalid patient ID: {patient_id} (patient count is {patient_count})")]
    PatientOutOfRange {
        patient_id: PatientId,
        patient_count: u32,
    },

    /// I/O failure while delivering a reading.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Failed to bind or inspect a listening socket.
    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_the_patient() {
        let err = Error::PatientOutOfRange {
            patient_id: 9,
            patient_count: 5,
        };
        assert_eq!(
            err.to_string(),
            "Invalid patient ID: 9 (patient count is 5)"
        );
    }

    #[test]
    fn io_message_includes_context() {
        let err = Error::io(
            "Error writing to file out/Alert.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Error writing to file out/Alert.txt: denied");
    }
}

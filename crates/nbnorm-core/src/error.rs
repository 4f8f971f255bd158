//! Error taxonomy for the composite pipeline
//!
//! Every failure names the stage it came from; there are no retries
//! anywhere, a run either completes or fails outright.

/// Errors surfaced by decoding, processing, and exporting.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Input path missing or the container could not be parsed into a
    /// three-plane array. Fatal, reported before any computation.
    #[error("input error: {0}")]
    Input(String),

    /// The primary array does not have exactly three planes.
    #[error("shape error: expected a 3-plane cube, got {0}")]
    Shape(String),

    /// A statistics-derived denominator collapsed to (near) zero, or a
    /// derived term went non-finite. Surfaced instead of propagating
    /// NaN/Inf into the output.
    #[error("numeric degeneracy in {stage}: {detail}")]
    Degenerate {
        stage: &'static str,
        detail: String,
    },

    /// Destination not writable. Reported after computation; no partial
    /// files are left behind.
    #[error("output error: {0}")]
    Output(String),
}

// The CLI keeps Result<_, String> command signatures; this bridge lets
// core errors flow through `?` there.
impl From<ProcessError> for String {
    fn from(err: ProcessError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_stage() {
        let err = ProcessError::Degenerate {
            stage: "channel normalization",
            detail: "baseline m is zero".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("channel normalization"));
        assert!(msg.contains("baseline m is zero"));
    }

    #[test]
    fn test_error_converts_to_string() {
        let err = ProcessError::Input("no such file".to_string());
        let s: String = err.into();
        assert!(s.contains("input error"));
    }
}

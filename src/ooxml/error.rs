/// Error types for OOXML operations.
use thiserror::Error;

/// Result type for OOXML operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for OOXML operations.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(#[from] crate::ooxml::opc::error::OpcError),

    /// XML parsing error, or XML that is not a recognizable part
    #[error("XML error: {0}")]
    Xml(String),

    /// A required child element is absent from an otherwise well-formed tree
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// Indexed access outside `-len..len`
    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    /// Invalid format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<quick_xml::Error> for OoxmlError {
    fn from(err: quick_xml::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OoxmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for OoxmlError {
    fn from(err: std::str::Utf8Error) -> Self {
        OoxmlError::Xml(format!("Invalid UTF-8 in XML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OoxmlError::IndexOutOfRange { index: -3, len: 2 };
        assert_eq!(
            err.to_string(),
            "Index -3 out of range for collection of length 2"
        );

        let err = OoxmlError::MissingElement("w:body".to_string());
        assert_eq!(err.to_string(), "Missing element: w:body");
    }

    #[test]
    fn test_error_from_opc() {
        let opc = crate::ooxml::opc::error::OpcError::InvalidPackUri("x".to_string());
        let err: OoxmlError = opc.into();
        assert!(matches!(err, OoxmlError::Opc(_)));
    }
}

use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] calsync_rfc::error::RfcError),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Document contains no component")]
    EmptyDocument,
}

impl From<calsync_rfc::rfc::ical::parse::ParseError> for ServiceError {
    fn from(err: calsync_rfc::rfc::ical::parse::ParseError) -> Self {
        Self::RfcError(err.into())
    }
}

impl From<calsync_rfc::rfc::ical::date::DateError> for ServiceError {
    fn from(err: calsync_rfc::rfc::ical::date::DateError) -> Self {
        Self::RfcError(err.into())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

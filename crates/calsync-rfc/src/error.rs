use thiserror::Error;

use crate::rfc::ical::core::PropertyError;
use crate::rfc::ical::date::DateError;
use crate::rfc::ical::parse::ParseError;

/// iCalendar model, codec and normalization errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error(transparent)]
    PropertyError(#[from] PropertyError),

    #[error(transparent)]
    DateError(#[from] DateError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;

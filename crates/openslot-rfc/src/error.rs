use thiserror::Error;

/// RFC parsing and serialization errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    DavParseError(#[from] crate::rfc::dav::parse::ParseError),

    #[error("XML write error: {0}")]
    XmlWriteError(#[from] quick_xml::Error),

    #[error(transparent)]
    IcalParseError(#[from] crate::rfc::ical::parse::ParseError),

    #[error(transparent)]
    TimezoneError(#[from] crate::rfc::ical::expand::ConversionError),

    #[error(transparent)]
    CoreError(#[from] openslot_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;

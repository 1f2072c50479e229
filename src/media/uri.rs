//! `data:<mime>;base64,<payload>` model.

use super::MediaError;
use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

/// Standard alphabet, padding optional on decode, always written on encode.
pub const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A base64 data URI as found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime: &'a str,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Split `data:<mime>;base64,<payload>`. `None` for any other shape.
    pub fn parse(text: &'a str) -> Option<Self> {
        let rest = text.strip_prefix("data:")?;
        let (mime, payload) = rest.split_once(";base64,")?;
        if mime.is_empty() || mime.contains([';', '"', '\'']) || payload.is_empty() {
            return None;
        }
        Some(Self { mime, payload })
    }

    /// Decode the payload, tolerating missing padding.
    pub fn decode(&self) -> Result<Vec<u8>, MediaError> {
        Ok(BASE64.decode(self.payload.trim())?)
    }
}

/// `data:<mime>;base64,<payload>` for `bytes`.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let uri = DataUri::parse("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(uri.mime, "image/png");
        assert_eq!(uri.payload, "iVBORw0KGgo=");

        assert!(DataUri::parse("data:image/png,raw").is_none());
        assert!(DataUri::parse("data:;base64,AAAA").is_none());
        assert!(DataUri::parse("data:image/png;base64,").is_none());
        assert!(DataUri::parse("image/png;base64,AAAA").is_none());
    }

    #[test]
    fn test_decode_lenient_padding() {
        let padded = DataUri::parse("data:text/plain;base64,aGk=").unwrap();
        let bare = DataUri::parse("data:text/plain;base64,aGk").unwrap();
        assert_eq!(padded.decode().unwrap(), b"hi");
        assert_eq!(bare.decode().unwrap(), b"hi");
    }

    #[test]
    fn test_decode_invalid() {
        let uri = DataUri::parse("data:image/png;base64,@@@@").unwrap();
        assert!(matches!(uri.decode(), Err(MediaError::Base64(_))));
    }

    #[test]
    fn test_to_data_uri() {
        assert_eq!(to_data_uri("audio/mpeg", b"hi"), "data:audio/mpeg;base64,aGk=");
    }
}

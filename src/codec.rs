use base64::Engine;
use thiserror::Error;
use tracing::warn;

use crate::models::{EncodedImagePayload, UploadedImage};

/// Subtypes the Messages API accepts for image blocks.
pub const SUPPORTED_SUBTYPES: &[&str] = &["jpeg", "png", "gif", "webp"];

pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("no image content")]
    MissingInput,
    #[error("media type `{0}` has no subtype")]
    MalformedMediaType(String),
}

pub fn is_supported(subtype: &str) -> bool {
    SUPPORTED_SUBTYPES.contains(&subtype)
}

/// Base64-encodes the image and takes the subtype from its declared media type.
///
/// Subtypes outside [`SUPPORTED_SUBTYPES`] are passed through; the provider
/// rejects them.
pub fn encode(image: &UploadedImage) -> Result<EncodedImagePayload, CodecError> {
    if image.is_empty() {
        return Err(CodecError::MissingInput);
    }

    let subtype = subtype_of(&image.media_type)
        .ok_or_else(|| CodecError::MalformedMediaType(image.media_type.clone()))?;
    if !is_supported(subtype) {
        warn!("⚠️ Passing unsupported image subtype '{}' through to the provider", subtype);
    }

    Ok(EncodedImagePayload {
        data: base64::engine::general_purpose::STANDARD.encode(&image.content),
        subtype: subtype.to_string(),
    })
}

/// Portion after the slash, parameters stripped.
fn subtype_of(media_type: &str) -> Option<&str> {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    let (_, subtype) = essence.split_once('/')?;
    if subtype.is_empty() { None } else { Some(subtype) }
}

/// Guesses a media type from magic bytes for uploads that did not declare one.
pub fn sniff_media_type(content: &[u8]) -> &'static str {
    image::guess_format(content)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn subtype_matches_declared_type_for_supported_formats() {
        for subtype in SUPPORTED_SUBTYPES {
            let image = UploadedImage::new(&b"0123456789"[..], format!("image/{subtype}"));
            let payload = encode(&image).unwrap();
            assert_eq!(payload.subtype, *subtype);
            assert_eq!(payload.data, "MDEyMzQ1Njc4OQ==");
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let image = UploadedImage::new(vec![0u8, 255, 17, 42], "image/gif");
        assert_eq!(encode(&image).unwrap(), encode(&image).unwrap());
    }

    #[test]
    fn empty_content_is_missing_input() {
        let image = UploadedImage::new(Vec::<u8>::new(), "image/png");
        assert_eq!(encode(&image), Err(CodecError::MissingInput));
    }

    #[test]
    fn unsupported_subtype_passes_through() {
        let image = UploadedImage::new(&b"BM"[..], "image/bmp");
        assert_eq!(encode(&image).unwrap().subtype, "bmp");
        assert!(!is_supported("bmp"));
    }

    #[test]
    fn media_type_parameters_are_ignored() {
        let image = UploadedImage::new(&b"x"[..], "image/png; name=chart.png");
        assert_eq!(encode(&image).unwrap().subtype, "png");
    }

    #[test]
    fn media_type_without_subtype_is_rejected() {
        let image = UploadedImage::new(&b"x"[..], "png");
        assert_eq!(encode(&image), Err(CodecError::MalformedMediaType("png".into())));
        let image = UploadedImage::new(&b"x"[..], "image/");
        assert!(encode(&image).is_err());
    }

    #[test]
    fn sniffing_recognises_png_and_falls_back() {
        assert_eq!(sniff_media_type(PNG_MAGIC), "image/png");
        assert_eq!(sniff_media_type(b"not an image"), FALLBACK_MEDIA_TYPE);
    }
}

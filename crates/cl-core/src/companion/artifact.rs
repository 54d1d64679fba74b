use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Image dump written by the companion app (and accepted by its receiver):
/// three sections separated by newlines, `mime`, `filename`, then base64 data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    pub mime: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("artifact is not valid UTF-8")]
    NotUtf8,
    #[error("artifact is missing the {0} line")]
    MissingSection(&'static str),
    #[error("declared mime type {0:?} is not an image")]
    NotAnImage(String),
    #[error("image data is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("image data is empty")]
    Empty,
}

/// Mime type and file extension of an encoded image, from its magic bytes.
/// Unknown formats are reported as PNG, the format the desktop clipboard
/// hands out.
pub fn sniff_image_format(bytes: &[u8]) -> (&'static str, &'static str) {
    match bytes {
        [0xff, 0xd8, 0xff, ..] => ("image/jpeg", "jpg"),
        [b'G', b'I', b'F', b'8', ..] => ("image/gif", "gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => ("image/webp", "webp"),
        [b'B', b'M', ..] => ("image/bmp", "bmp"),
        _ => ("image/png", "png"),
    }
}

pub fn encode_image_artifact(mime: &str, filename: &str, bytes: &[u8]) -> String {
    format!("{}\n{}\n{}", mime, filename, STANDARD.encode(bytes))
}

pub fn decode_image_artifact(raw: &[u8]) -> Result<ImageArtifact, ArtifactError> {
    let text = std::str::from_utf8(raw).map_err(|_| ArtifactError::NotUtf8)?;
    let mut sections = text.splitn(3, '\n');

    let mime = sections
        .next()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or(ArtifactError::MissingSection("mime"))?;
    if !mime.starts_with("image/") {
        return Err(ArtifactError::NotAnImage(mime.to_string()));
    }

    let filename = sections
        .next()
        .map(|s| s.trim())
        .ok_or(ArtifactError::MissingSection("filename"))?;

    // The receiver concatenates every remaining line, so wrapped base64 is fine.
    let data: String = sections
        .next()
        .ok_or(ArtifactError::MissingSection("data"))?
        .split_whitespace()
        .collect();
    let bytes = STANDARD
        .decode(data.as_bytes())
        .map_err(|e| ArtifactError::InvalidBase64(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ArtifactError::Empty);
    }

    Ok(ImageArtifact {
        mime: mime.to_string(),
        filename: filename.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_companion_dump() {
        let raw = b"image/png\nScreenshot.png\naGVsbG8=";
        let artifact = decode_image_artifact(raw).unwrap();
        assert_eq!(artifact.mime, "image/png");
        assert_eq!(artifact.filename, "Screenshot.png");
        assert_eq!(artifact.bytes, b"hello");
    }

    #[test]
    fn accepts_wrapped_base64() {
        let raw = b"image/jpeg\nimage\naGVs\nbG8=\n";
        assert_eq!(decode_image_artifact(raw).unwrap().bytes, b"hello");
    }

    #[test]
    fn encoded_artifact_is_readable_by_decoder() {
        let encoded = encode_image_artifact("image/png", "clip.png", &[0x89, 0x50, 0x4e, 0x47]);
        assert!(encoded.starts_with("image/png\nclip.png\n"));
        let artifact = decode_image_artifact(encoded.as_bytes()).unwrap();
        assert_eq!(artifact.bytes, vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_image_format(&[0x89, b'P', b'N', b'G']), ("image/png", "png"));
        assert_eq!(sniff_image_format(&[0xff, 0xd8, 0xff, 0xe0]), ("image/jpeg", "jpg"));
        assert_eq!(sniff_image_format(b"GIF89a"), ("image/gif", "gif"));
        assert_eq!(sniff_image_format(b"RIFF\x10\0\0\0WEBPVP8 "), ("image/webp", "webp"));
        assert_eq!(sniff_image_format(b""), ("image/png", "png"));
    }

    #[test]
    fn rejects_malformed_dumps() {
        assert_eq!(
            decode_image_artifact(b"text/plain\nx\naGk="),
            Err(ArtifactError::NotAnImage("text/plain".into()))
        );
        assert_eq!(
            decode_image_artifact(b"image/png\nonly-two-lines"),
            Err(ArtifactError::MissingSection("data"))
        );
        assert!(matches!(
            decode_image_artifact(b"image/png\nx\n!!!not base64!!!"),
            Err(ArtifactError::InvalidBase64(_))
        ));
        assert_eq!(decode_image_artifact(b"image/png\nx\n"), Err(ArtifactError::Empty));
        assert_eq!(decode_image_artifact(&[0xff, 0xfe]), Err(ArtifactError::NotUtf8));
    }
}

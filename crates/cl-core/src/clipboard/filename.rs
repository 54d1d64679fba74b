const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff", "heic", "heif",
];

/// Whether `text` looks like the file name of an image.
///
/// Copying an image from a file manager puts both the pixels and the file name
/// on the clipboard. This check is approximate: it looks at the
/// extension of a single-line value and nothing else, so `notes.png` typed by
/// hand also matches.
pub fn is_probable_image_filename(text: &str) -> bool {
    let candidate = text.trim();
    if candidate.is_empty() || candidate.contains('\n') {
        return false;
    }

    let Some((stem, extension)) = candidate.rsplit_once('.') else {
        return false;
    };
    if stem.is_empty() {
        return false;
    }

    IMAGE_EXTENSIONS
        .iter()
        .any(|known| extension.eq_ignore_ascii_case(known))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_common_image_names() {
        assert!(is_probable_image_filename("clipboard_image.png"));
        assert!(is_probable_image_filename("  IMG_0042.JPEG \n"));
        assert!(is_probable_image_filename("/Users/me/Desktop/shot.webp"));
    }

    #[test]
    fn rejects_other_text() {
        assert!(!is_probable_image_filename("hello"));
        assert!(!is_probable_image_filename("report.pdf"));
        assert!(!is_probable_image_filename(".png"));
        assert!(!is_probable_image_filename("a.png\nb.png"));
        assert!(!is_probable_image_filename(""));
    }
}

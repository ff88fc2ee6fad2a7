use std::path::Path;
use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use regex::Regex;

/// Allow-list for stored image payloads. Anything that doesn't match is
/// treated as if the entry had no image at all.
static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg|gif|webp|svg\+xml);base64,[A-Za-z0-9+/=]+$")
        .expect("valid regex")
});

pub fn is_valid_data_url(value: &str) -> bool {
    DATA_URL_RE.is_match(value)
}

/// The single gate between a stored `image` field and anything that renders
/// or exports it.
pub fn valid_image(image: &Option<String>) -> Option<&str> {
    image.as_deref().filter(|v| is_valid_data_url(v))
}

fn subtype_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpeg"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        "svg" => Some("svg+xml"),
        _ => None,
    }
}

/// Reads an image file into a self-describing data URL. The MIME subtype
/// comes from the file extension; unsupported extensions are an error.
pub fn encode_file(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let subtype = subtype_for_extension(ext)
        .ok_or_else(|| eyre!("Please select a valid image file"))?;
    let bytes = std::fs::read(path)?;
    Ok(format!("data:image/{subtype};base64,{}", BASE64.encode(bytes)))
}

/// Payload bytes of a valid data URL; `None` for anything that fails the
/// allow-list or doesn't decode.
pub fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    if !is_valid_data_url(data_url) {
        return None;
    }
    let (_, payload) = data_url.split_once("base64,")?;
    BASE64.decode(payload).ok()
}

/// Download name for a slide's image: whitespace collapsed to underscores.
pub fn download_file_name(title: &str) -> String {
    let base = if title.trim().is_empty() { "memory" } else { title };
    let mut name: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    name.push_str(".png");
    name
}

use sha1::{Digest, Sha1};
use url::Url;

/// Number of hex characters kept from the URL digest.
pub const FINGERPRINT_LEN: usize = 8;

const PLACEHOLDER_NAME: &str = "index";
const CSS_SUFFIX: &str = ".css";

/// Short, deterministic digest of a URL string: the first
/// [`FINGERPRINT_LEN`] lowercase hex characters of its SHA-1.
pub fn fingerprint(url: &str) -> String {
    let digest = Sha1::digest(url.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Derives the local file name for a stylesheet URL.
///
/// The last path segment (query and fragment ignored) is sanitized, given a
/// single `.css` suffix and prefixed with the fingerprint of the full URL, so
/// `https://a.test/x/style.css` and `https://b.test/style.css` never share a
/// name even though their segments coincide.
///
/// The fingerprint covers the normalized serialization of the URL, so
/// spellings that normalize to the same URL (`http://a.test` and
/// `http://a.test/`) share a name.
pub fn asset_file_name(url: &Url) -> String {
    let segment = url
        .path()
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER_NAME);

    format!("{}-{}", fingerprint(url.as_str()), with_css_suffix(&sanitize_segment(segment)))
}

fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect()
}

fn with_css_suffix(name: &str) -> String {
    let split = name.len().saturating_sub(CSS_SUFFIX.len());
    match name.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(CSS_SUFFIX) => {
            format!("{}{}", &name[..split], CSS_SUFFIX)
        }
        _ => format!("{}{}", name, CSS_SUFFIX),
    }
}

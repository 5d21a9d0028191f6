use crate::foundation::error::{TgsError, TgsResult};

/// Media type callers should declare for Lottie input.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Check that `declared` names a JSON content type.
///
/// Accepts `application/json` and structured-syntax `+json` types, ignoring case and any
/// parameters such as `charset`. The content itself is never sniffed.
pub fn ensure_json(declared: &str) -> TgsResult<()> {
    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let is_json = essence == JSON_MEDIA_TYPE
        || essence
            .split_once('/')
            .is_some_and(|(ty, sub)| !ty.is_empty() && sub.ends_with("+json"));

    if is_json {
        Ok(())
    } else {
        Err(TgsError::unsupported_media_type(declared))
    }
}

/// Media type implied by a file extension, as a file picker would report it.
///
/// Returns an empty string for unknown extensions.
pub fn from_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "json" => JSON_MEDIA_TYPE,
        "tgs" => "application/gzip",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_json_variants() {
        ensure_json("application/json").unwrap();
        ensure_json("Application/JSON; charset=utf-8").unwrap();
        ensure_json("application/vnd.lottie+json").unwrap();
    }

    #[test]
    fn rejects_everything_else() {
        for ty in ["", "text/plain", "application/gzip", "+json", "application/jsonp"] {
            let err = ensure_json(ty).unwrap_err();
            assert!(matches!(err, TgsError::UnsupportedMediaType(ref t) if t == ty));
        }
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(from_extension("JSON"), JSON_MEDIA_TYPE);
        assert_eq!(from_extension("tgs"), "application/gzip");
        assert!(ensure_json(from_extension("tgs")).is_err());
        assert_eq!(from_extension("txt"), "");
    }
}

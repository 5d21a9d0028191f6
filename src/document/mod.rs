//! Parser/validator: raw input bytes to a validated [`AnimationDocument`] plus display metadata.

pub mod media_type;
pub mod metadata;
pub mod model;

pub use metadata::AnimationMetadata;
pub use model::AnimationDocument;

use crate::foundation::error::{TgsError, TgsResult};

/// Output of [`parse`]: the document to transcode later and its display summary.
#[derive(Clone, Debug)]
pub struct ParsedAnimation {
    /// Validated source document.
    pub document: AnimationDocument,
    /// Metadata derived from `document`.
    pub metadata: AnimationMetadata,
}

/// Parse and validate a Lottie document.
///
/// `media_type` must declare JSON; the bytes are not inspected otherwise. The bytes are decoded as
/// UTF-8 (a leading byte order mark is ignored) and then as JSON. Only `w`, `h`, `fr`, `op` and
/// `ip` are checked; anything else is carried through untouched.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn parse(bytes: &[u8], media_type: &str) -> TgsResult<ParsedAnimation> {
    media_type::ensure_json(media_type)?;

    let text = std::str::from_utf8(bytes)
        .map_err(|e| TgsError::malformed_json(format!("input is not UTF-8: {e}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let document = AnimationDocument::from_json_str(text)?;
    let metadata = AnimationMetadata::from_document(&document);
    tracing::debug!(
        width = metadata.width,
        height = metadata.height,
        frame_rate = metadata.frame_rate,
        duration_secs = metadata.duration_secs,
        "parsed animation"
    );

    Ok(ParsedAnimation { document, metadata })
}

use crate::document::model::AnimationDocument;

/// Display summary of a parsed animation.
///
/// Derived once from the source document at parse time. It always describes the original
/// animation, not the trimmed and resized sticker produced from it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationMetadata {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Frame rate rounded to the nearest whole number.
    pub frame_rate: u32,
    /// `(op - ip) / fr`, in seconds.
    pub duration_secs: f64,
}

impl AnimationMetadata {
    pub fn from_document(doc: &AnimationDocument) -> Self {
        let canvas = doc.canvas();
        let timeline = doc.timeline();
        Self {
            width: round_to_u32(canvas.width),
            height: round_to_u32(canvas.height),
            frame_rate: round_to_u32(timeline.frame_rate),
            duration_secs: timeline.duration_secs(),
        }
    }
}

// Saturating: negative values report as 0.
fn round_to_u32(v: f64) -> u32 {
    v.round() as u32
}

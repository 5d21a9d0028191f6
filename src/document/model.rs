use ordermap::OrderMap;
use serde_json::value::RawValue;

use crate::foundation::core::{CanvasSize, Timeline};
use crate::foundation::error::{TgsError, TgsResult};

/// Top-level document entries in source order, values kept as unparsed JSON text.
pub(crate) type Fields = OrderMap<String, Box<RawValue>>;

pub(crate) const KEY_WIDTH: &str = "w";
pub(crate) const KEY_HEIGHT: &str = "h";
pub(crate) const KEY_FRAME_RATE: &str = "fr";
pub(crate) const KEY_IN_POINT: &str = "ip";
pub(crate) const KEY_OUT_POINT: &str = "op";
pub(crate) const KEY_LAYERS: &str = "layers";
pub(crate) const KEY_ASSETS: &str = "assets";

/// Keys the document gives typed or structural meaning to. Everything else is an extra.
const CORE_KEYS: [&str; 7] = [
    KEY_WIDTH,
    KEY_HEIGHT,
    KEY_FRAME_RATE,
    KEY_IN_POINT,
    KEY_OUT_POINT,
    KEY_LAYERS,
    KEY_ASSETS,
];

/// A parsed Lottie animation.
///
/// Only the canvas size and timeline are read into typed values. Every top-level entry,
/// including `layers`, `assets` and unknown fields, is retained as the raw JSON text it was
/// parsed from and re-emitted unchanged on serialization.
///
/// The document has no mutating API: transforms build a new document.
#[derive(Clone, Debug)]
pub struct AnimationDocument {
    fields: Fields,
    canvas: CanvasSize,
    timeline: Timeline,
}

impl AnimationDocument {
    /// Parse a document from JSON text.
    ///
    /// Syntax errors are [`TgsError::MalformedJson`]. Well-formed JSON that is not an object
    /// cannot carry any of the required fields and fails on the first of them.
    pub fn from_json_str(text: &str) -> TgsResult<Self> {
        let fields: Fields = serde_json::from_str(text).map_err(|e| {
            if e.is_data() {
                TgsError::MissingRequiredField {
                    field: "width",
                    key: KEY_WIDTH,
                }
            } else {
                TgsError::malformed_json(e)
            }
        })?;
        Self::from_fields(fields)
    }

    /// Build a document from raw top-level entries, validating the required fields.
    pub(crate) fn from_fields(fields: Fields) -> TgsResult<Self> {
        let width = required_number(&fields, "width", KEY_WIDTH)?;
        let height = required_number(&fields, "height", KEY_HEIGHT)?;
        let frame_rate = required_number(&fields, "frameRate", KEY_FRAME_RATE)?;
        let out_point = required_number(&fields, "outPoint", KEY_OUT_POINT)?;
        let in_point = required_number(&fields, "inPoint", KEY_IN_POINT)?;

        let timeline = Timeline::new(in_point, out_point, frame_rate)?;
        Ok(Self {
            fields,
            canvas: CanvasSize::new(width, height),
            timeline,
        })
    }

    /// Assemble a document whose typed values are already known to match `fields`.
    pub(crate) fn from_parts(fields: Fields, canvas: CanvasSize, timeline: Timeline) -> Self {
        Self {
            fields,
            canvas,
            timeline,
        }
    }

    /// Declared canvas size.
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Declared timeline.
    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    /// Raw JSON of a top-level entry.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key).map(|v| &**v)
    }

    /// Return `true` when the document has a top-level entry named `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Raw JSON of the top-level layer sequence, if present.
    pub fn layers(&self) -> Option<&RawValue> {
        self.get(KEY_LAYERS)
    }

    /// Raw JSON of the asset sequence, if present.
    pub fn assets(&self) -> Option<&RawValue> {
        self.get(KEY_ASSETS)
    }

    /// Entries that are neither required fields nor the layer/asset sequences, in source order.
    pub fn extras(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields
            .iter()
            .filter(|(k, _)| !CORE_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), &**v))
    }

    /// Top-level keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub(crate) fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl serde::Serialize for AnimationDocument {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

fn required_number(fields: &Fields, field: &'static str, key: &'static str) -> TgsResult<f64> {
    fields
        .get(key)
        .and_then(|raw| serde_json::from_str::<serde_json::Number>(raw.get()).ok())
        .and_then(|n| n.as_f64())
        .ok_or(TgsError::MissingRequiredField { field, key })
}

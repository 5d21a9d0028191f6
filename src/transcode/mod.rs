//! Transcoder: fits a validated animation into the TGS sticker shape and compresses it.
//!
//! The pipeline runs on a private copy of the document's top-level entries:
//!
//! 1. cap the timeline at [`TGS_MAX_DURATION_SECS`]
//! 2. move the original layers into a precomposition asset and replace them with one wrapper
//!    layer that centers and scales that asset onto the sticker canvas
//! 3. set the canvas to [`TGS_CANVAS_SIZE`] square
//! 4. drop `expressions` and `markers`
//! 5. serialize as compact JSON and gzip it
//!
//! The source document is only borrowed, so converting it again yields identical bytes.

mod gzip;
mod json;
mod wrapper;

pub use gzip::MAX_COMPRESSION_LEVEL;

use serde_json::value::{RawValue, to_raw_value};

use crate::document::model::{
    AnimationDocument, Fields, KEY_ASSETS, KEY_HEIGHT, KEY_LAYERS, KEY_OUT_POINT, KEY_WIDTH,
};
use crate::foundation::core::{CanvasSize, Timeline};
use crate::foundation::error::{Stage, TgsError, TgsResult};
use wrapper::{Num, PrecompAsset, WrapperLayer, asset_id};

/// Side length of the square sticker canvas, in pixels.
pub const TGS_CANVAS_SIZE: u32 = 512;
/// Longest playable sticker duration, in seconds.
pub const TGS_MAX_DURATION_SECS: f64 = 3.0;
/// Asset id reserved for the precomposition holding the original layers.
pub const WRAPPER_ASSET_ID: &str = "tgs_wrapper_comp";
/// Name given to the wrapper layer.
pub const WRAPPER_LAYER_NAME: &str = "TGS Wrapper";

/// Top-level fields the sticker format rejects.
const UNSUPPORTED_KEYS: [&str; 2] = ["expressions", "markers"];

/// Options for [`transcode_with`].
#[derive(Clone, Debug)]
pub struct TranscodeOpts {
    /// Gzip compression level, `0..=9`.
    pub compression_level: u32,
}

impl Default for TranscodeOpts {
    fn default() -> Self {
        Self {
            compression_level: 6,
        }
    }
}

/// Convert a document into gzip-compressed TGS bytes using default options.
pub fn transcode(doc: &AnimationDocument) -> TgsResult<Vec<u8>> {
    transcode_with(doc, &TranscodeOpts::default())
}

/// Convert a document into gzip-compressed TGS bytes.
///
/// All or nothing: on error no output is produced, and `doc` is never modified.
#[tracing::instrument(skip_all, fields(level = opts.compression_level))]
pub fn transcode_with(doc: &AnimationDocument, opts: &TranscodeOpts) -> TgsResult<Vec<u8>> {
    let sticker = to_sticker(doc)?;
    let bytes = encode(&sticker, opts)?;
    tracing::debug!(compressed_len = bytes.len(), "transcoded sticker");
    Ok(bytes)
}

/// Structural half of [`transcode`]: returns the sticker-shaped document without encoding it.
pub fn to_sticker(doc: &AnimationDocument) -> TgsResult<AnimationDocument> {
    let mut fields = doc.fields().clone();

    let timeline = cap_duration(&mut fields, doc.timeline())?;
    precompose(&mut fields, doc.canvas(), timeline)?;
    let canvas = resize_canvas(&mut fields)?;
    strip_unsupported(&mut fields);

    Ok(AnimationDocument::from_parts(fields, canvas, timeline))
}

/// Encoding half of [`transcode`]: compact JSON in a gzip container.
pub fn encode(doc: &AnimationDocument, opts: &TranscodeOpts) -> TgsResult<Vec<u8>> {
    let text = serde_json::to_vec(doc).map_err(|e| TgsError::transcode(Stage::Serialize, e))?;
    let text = json::compact(&text);
    gzip::compress(&text, opts.compression_level)
}

fn cap_duration(fields: &mut Fields, timeline: Timeline) -> TgsResult<Timeline> {
    let capped = timeline.capped(TGS_MAX_DURATION_SECS);
    if capped != timeline {
        tracing::debug!(
            from = timeline.out_point,
            to = capped.out_point,
            "capping out point"
        );
        set_number(fields, KEY_OUT_POINT, capped.out_point, Stage::DurationCap)?;
    }
    Ok(capped)
}

fn precompose(fields: &mut Fields, canvas: CanvasSize, timeline: Timeline) -> TgsResult<()> {
    let target = f64::from(TGS_CANVAS_SIZE);
    let scale = canvas.fit_scale(target);
    // The layer stores the factor as a percentage, which can overflow on its own.
    if !scale.is_finite() || !(scale * 100.0).is_finite() {
        return Err(TgsError::transcode(
            Stage::Precompose,
            format!(
                "cannot scale a {}x{} canvas to {TGS_CANVAS_SIZE}x{TGS_CANVAS_SIZE}",
                canvas.width, canvas.height
            ),
        ));
    }
    tracing::debug!(scale, "fitting canvas");

    // `null` counts as absent.
    let mut assets: Vec<Box<RawValue>> = match fields.get(KEY_ASSETS) {
        Some(raw) => serde_json::from_str::<Option<Vec<Box<RawValue>>>>(raw.get())
            .map_err(|e| {
                TgsError::transcode(Stage::Precompose, format!("assets must be an array: {e}"))
            })?
            .unwrap_or_default(),
        None => Vec::new(),
    };
    if assets
        .iter()
        .any(|a| asset_id(a).as_deref() == Some(WRAPPER_ASSET_ID))
    {
        return Err(TgsError::AssetIdConflict(WRAPPER_ASSET_ID.to_string()));
    }

    let stage_err = |e: serde_json::Error| TgsError::transcode(Stage::Precompose, e);
    let layers = match fields.get(KEY_LAYERS) {
        Some(raw) => raw.clone(),
        None => RawValue::from_string("[]".to_string()).map_err(stage_err)?,
    };

    let precomp = PrecompAsset {
        id: WRAPPER_ASSET_ID,
        layers: &layers,
    };
    assets.push(to_raw_value(&precomp).map_err(stage_err)?);

    let wrapper = WrapperLayer::new(
        WRAPPER_LAYER_NAME,
        WRAPPER_ASSET_ID,
        canvas,
        timeline,
        target,
        scale,
    );
    fields.insert(
        KEY_LAYERS.to_string(),
        to_raw_value(&[wrapper]).map_err(stage_err)?,
    );
    fields.insert(
        KEY_ASSETS.to_string(),
        to_raw_value(&assets).map_err(stage_err)?,
    );
    Ok(())
}

fn resize_canvas(fields: &mut Fields) -> TgsResult<CanvasSize> {
    let size = f64::from(TGS_CANVAS_SIZE);
    set_number(fields, KEY_WIDTH, size, Stage::CanvasResize)?;
    set_number(fields, KEY_HEIGHT, size, Stage::CanvasResize)?;
    Ok(CanvasSize::new(size, size))
}

fn strip_unsupported(fields: &mut Fields) {
    for key in UNSUPPORTED_KEYS {
        if fields.remove(key).is_some() {
            tracing::debug!(key, "stripped unsupported field");
        }
    }
}

fn set_number(fields: &mut Fields, key: &str, value: f64, stage: Stage) -> TgsResult<()> {
    let raw = to_raw_value(&Num(value)).map_err(|e| TgsError::transcode(stage, e))?;
    fields.insert(key.to_string(), raw);
    Ok(())
}

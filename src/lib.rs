//! Convert Lottie animations into Telegram TGS stickers.
//!
//! A TGS sticker is a Lottie document on a 512x512 canvas, at most three seconds long, without
//! expressions or markers, stored gzip-compressed. Conversion is two pure steps:
//!
//! - [`parse`] validates raw input and derives [`AnimationMetadata`] for display
//! - [`transcode`] fits the [`AnimationDocument`] to the sticker shape and compresses it
//!
//! Neither step keeps state between calls, so documents can be converted in any order, in
//! parallel, and repeatedly. [`batch`] adds per-item bookkeeping for front ends.
#![forbid(unsafe_code)]

pub mod batch;
pub mod document;
mod foundation;
pub mod naming;
pub mod transcode;

pub use crate::batch::{BatchOpts, ConversionItem, ItemStatus, TgsFile, convert_all};
pub use crate::document::{AnimationDocument, AnimationMetadata, ParsedAnimation, parse};
pub use crate::foundation::core::{CanvasSize, Timeline};
pub use crate::foundation::error::{ErrorKind, Stage, TgsError, TgsResult};
pub use crate::naming::tgs_file_name;
pub use crate::transcode::{
    TGS_CANVAS_SIZE, TGS_MAX_DURATION_SECS, TranscodeOpts, WRAPPER_ASSET_ID, transcode,
    transcode_with,
};

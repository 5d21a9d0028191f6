//! Caller-side bookkeeping for converting many uploads.
//!
//! The parser and transcoder are stateless. A front end that lists uploads, converts them on demand
//! and retries failures needs per-item state; [`ConversionItem`] tracks it, and [`convert_all`]
//! runs every pending item independently.

use rayon::prelude::*;

use crate::document::{AnimationMetadata, ParsedAnimation, parse};
use crate::foundation::error::{ErrorKind, TgsError, TgsResult};
use crate::naming::tgs_file_name;
use crate::transcode::{TranscodeOpts, transcode_with};

/// Lifecycle position of a [`ConversionItem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ItemStatus {
    /// Parsed and never converted.
    Ready,
    /// The last conversion produced a sticker.
    Success,
    /// Parsing or the last conversion failed.
    Error,
}

/// Owned, cloneable form of a [`TgsError`] kept on an item for display.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ItemError {
    /// Error discriminant.
    pub kind: ErrorKind,
    /// Human-readable cause.
    pub message: String,
}

impl From<&TgsError> for ItemError {
    fn from(err: &TgsError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// A converted sticker with the file name it should be saved under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TgsFile {
    /// Suggested file name, see [`tgs_file_name`].
    pub file_name: String,
    /// Gzip-compressed sticker bytes.
    pub bytes: Vec<u8>,
}

/// One uploaded file and where it is in `Ready -> Success | Error`.
///
/// "Converting" is the [`convert`](Self::convert) call itself, which holds the item exclusively,
/// so it is never stored.
///
/// A parse failure is terminal: the item stays in `Error` without a document. Once parsed, the
/// document is kept for the item's lifetime, so conversion can be repeated after a success or
/// retried after a failure.
#[derive(Clone, Debug)]
pub struct ConversionItem {
    name: String,
    parsed: Result<ParsedAnimation, ItemError>,
    status: ItemStatus,
    last_error: Option<ItemError>,
}

impl ConversionItem {
    /// Parse an upload into a new item.
    pub fn from_upload(name: impl Into<String>, bytes: &[u8], media_type: &str) -> Self {
        let name = name.into();
        match parse(bytes, media_type) {
            Ok(parsed) => Self {
                name,
                parsed: Ok(parsed),
                status: ItemStatus::Ready,
                last_error: None,
            },
            Err(err) => {
                let err = ItemError::from(&err);
                Self {
                    name,
                    parsed: Err(err.clone()),
                    status: ItemStatus::Error,
                    last_error: Some(err),
                }
            }
        }
    }

    /// Original file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Metadata of the source animation, when it parsed.
    pub fn metadata(&self) -> Option<&AnimationMetadata> {
        self.parsed.as_ref().ok().map(|p| &p.metadata)
    }

    /// Parsed source animation, when it parsed.
    pub fn parsed(&self) -> Option<&ParsedAnimation> {
        self.parsed.as_ref().ok()
    }

    /// Most recent parse or conversion error. Cleared when a conversion starts.
    pub fn error(&self) -> Option<&ItemError> {
        self.last_error.as_ref()
    }

    /// File name the converted sticker should be saved under.
    pub fn output_name(&self) -> String {
        tgs_file_name(&self.name)
    }

    /// Return `true` when [`convert_all`] would pick this item up.
    pub fn is_pending(&self) -> bool {
        match self.status {
            ItemStatus::Ready => true,
            ItemStatus::Error => self.parsed.is_ok(),
            ItemStatus::Success => false,
        }
    }

    /// Convert the item's document.
    ///
    /// Items whose upload failed to parse return the parse error unchanged. A conversion failure
    /// moves the item to `Error` but keeps its document, so calling this again retries.
    pub fn convert(&mut self, opts: &TranscodeOpts) -> Result<TgsFile, ItemError> {
        let parsed = match &self.parsed {
            Ok(parsed) => parsed,
            Err(err) => return Err(err.clone()),
        };

        self.last_error = None;

        match transcode_with(&parsed.document, opts) {
            Ok(bytes) => {
                self.status = ItemStatus::Success;
                Ok(TgsFile {
                    file_name: tgs_file_name(&self.name),
                    bytes,
                })
            }
            Err(err) => {
                tracing::debug!(item = %self.name, error = %err, "conversion failed");
                let err = ItemError::from(&err);
                self.status = ItemStatus::Error;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
}

/// Options for [`convert_all`].
#[derive(Clone, Debug, Default)]
pub struct BatchOpts {
    /// Convert items on a rayon pool instead of one after another.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Result of converting one item in [`convert_all`].
#[derive(Clone, Debug)]
pub struct ItemOutcome {
    /// Position of the item in the slice given to [`convert_all`].
    pub index: usize,
    /// The sticker, or why this item failed.
    pub result: Result<TgsFile, ItemError>,
}

/// Convert every pending item (see [`ConversionItem::is_pending`]).
///
/// Items are independent: a failure is recorded on that item and in its outcome, and never stops
/// the others. Outcomes are returned in slice order whether or not `parallel` is set. The only
/// error is a thread pool that cannot be built.
#[tracing::instrument(skip_all, fields(items = items.len(), parallel = batch.parallel))]
pub fn convert_all(
    items: &mut [ConversionItem],
    batch: &BatchOpts,
    opts: &TranscodeOpts,
) -> TgsResult<Vec<ItemOutcome>> {
    let convert = |(index, item): (usize, &mut ConversionItem)| ItemOutcome {
        index,
        result: item.convert(opts),
    };

    if !batch.parallel {
        return Ok(items
            .iter_mut()
            .enumerate()
            .filter(|(_, item)| item.is_pending())
            .map(convert)
            .collect());
    }

    let pool = build_thread_pool(batch.threads)?;
    Ok(pool.install(|| {
        items
            .par_iter_mut()
            .enumerate()
            .filter(|(_, item)| item.is_pending())
            .map(convert)
            .collect()
    }))
}

fn build_thread_pool(threads: Option<usize>) -> TgsResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TgsError::batch("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TgsError::batch(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &[u8] = br#"{"w":100,"h":100,"fr":30,"ip":0,"op":60,"layers":[]}"#;
    const CONFLICT: &[u8] =
        br#"{"w":100,"h":100,"fr":30,"ip":0,"op":60,"assets":[{"id":"tgs_wrapper_comp"}]}"#;

    #[test]
    fn parse_failure_is_terminal() {
        let mut item = ConversionItem::from_upload("bad.json", b"{", "application/json");
        assert_eq!(item.status(), ItemStatus::Error);
        assert!(item.parsed().is_none());
        assert!(!item.is_pending());

        let err = item.convert(&TranscodeOpts::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedJson);
        assert_eq!(item.status(), ItemStatus::Error);
    }

    #[test]
    fn success_names_output() {
        let mut item = ConversionItem::from_upload("wave.json", GOOD, "application/json");
        assert_eq!(item.status(), ItemStatus::Ready);
        let file = item.convert(&TranscodeOpts::default()).unwrap();
        assert_eq!(file.file_name, "wave.tgs");
        assert_eq!(item.status(), ItemStatus::Success);
        assert!(item.error().is_none());
    }

    #[test]
    fn failed_conversion_keeps_document_for_retry() {
        let mut item = ConversionItem::from_upload("c.json", CONFLICT, "application/json");
        let err = item.convert(&TranscodeOpts::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AssetIdConflict);
        assert_eq!(item.status(), ItemStatus::Error);
        assert!(item.parsed().is_some());
        assert!(item.is_pending());
        assert_eq!(item.metadata().unwrap().width, 100);
    }

    #[test]
    fn retry_settles_on_a_final_status() {
        let mut item = ConversionItem::from_upload("wave.json", GOOD, "application/json");
        let opts = TranscodeOpts {
            compression_level: 42,
        };
        let err = item.convert(&opts).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TranscodeFailure);
        assert_eq!(item.status(), ItemStatus::Error);
        assert_eq!(item.error(), Some(&err));

        item.convert(&TranscodeOpts::default()).unwrap();
        assert_eq!(item.status(), ItemStatus::Success);
        assert!(item.error().is_none());
        assert!(!item.is_pending());
    }

    #[test]
    fn zero_threads_rejected() {
        let mut items = vec![ConversionItem::from_upload("a.json", GOOD, "application/json")];
        let batch = BatchOpts {
            parallel: true,
            threads: Some(0),
        };
        let err = convert_all(&mut items, &batch, &TranscodeOpts::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Batch);
        assert_eq!(items[0].status(), ItemStatus::Ready);
    }
}

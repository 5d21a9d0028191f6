use std::fmt;

/// Result alias used throughout the crate.
pub type TgsResult<T> = Result<T, TgsError>;

/// Transcoder stage a [`TgsError::TranscodeFailure`] originated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Clamping the timeline to the maximum sticker duration.
    DurationCap,
    /// Building the wrapper precomposition and its referencing layer.
    Precompose,
    /// Rewriting the top-level canvas to the sticker size.
    CanvasResize,
    /// Removing fields the sticker format does not support.
    StripFeatures,
    /// Encoding the document as compact JSON.
    Serialize,
    /// Gzip compression of the encoded document.
    Compress,
}

impl Stage {
    /// Stable lowercase name, used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::DurationCap => "duration cap",
            Stage::Precompose => "precompose",
            Stage::CanvasResize => "canvas resize",
            Stage::StripFeatures => "strip features",
            Stage::Serialize => "serialize",
            Stage::Compress => "compress",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of a [`TgsError`], for callers that report errors as `(kind, message)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    /// See [`TgsError::UnsupportedMediaType`].
    UnsupportedMediaType,
    /// See [`TgsError::MalformedJson`].
    MalformedJson,
    /// See [`TgsError::MissingRequiredField`].
    MissingRequiredField,
    /// See [`TgsError::InvalidTiming`].
    InvalidTiming,
    /// See [`TgsError::AssetIdConflict`].
    AssetIdConflict,
    /// See [`TgsError::TranscodeFailure`].
    TranscodeFailure,
    /// See [`TgsError::Batch`].
    Batch,
}

/// Every way parsing or transcoding can fail.
///
/// All variants are terminal for the attempt that produced them. Nothing is retried internally.
#[derive(thiserror::Error, Debug)]
pub enum TgsError {
    /// The declared media type is not a JSON content type.
    #[error("unsupported media type '{0}': expected a JSON document")]
    UnsupportedMediaType(String),

    /// The input is not UTF-8 text or not syntactically valid JSON.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// One of the five fields conversion depends on is absent or not a number.
    #[error("missing required field: {field} ('{key}') must be a number")]
    MissingRequiredField {
        /// Human name of the field.
        field: &'static str,
        /// Lottie key of the field.
        key: &'static str,
    },

    /// The timeline cannot produce a finite, positive duration.
    #[error("invalid timing: {0}")]
    InvalidTiming(String),

    /// An existing asset already uses the id reserved for the wrapper precomposition.
    #[error("asset id conflict: an asset with id '{0}' already exists")]
    AssetIdConflict(String),

    /// The transcoder failed at a specific stage.
    #[error("transcode failed during {stage}: {reason}")]
    TranscodeFailure {
        /// Stage that failed.
        stage: Stage,
        /// What went wrong.
        reason: String,
    },

    /// A batch conversion could not be set up.
    #[error("batch error: {0}")]
    Batch(String),
}

impl TgsError {
    pub fn unsupported_media_type(media_type: impl Into<String>) -> Self {
        Self::UnsupportedMediaType(media_type.into())
    }

    pub fn malformed_json(msg: impl fmt::Display) -> Self {
        Self::MalformedJson(msg.to_string())
    }

    pub fn invalid_timing(msg: impl Into<String>) -> Self {
        Self::InvalidTiming(msg.into())
    }

    pub fn transcode(stage: Stage, reason: impl fmt::Display) -> Self {
        Self::TranscodeFailure {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn batch(msg: impl Into<String>) -> Self {
        Self::Batch(msg.into())
    }

    /// Error discriminant without the payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedMediaType(_) => ErrorKind::UnsupportedMediaType,
            Self::MalformedJson(_) => ErrorKind::MalformedJson,
            Self::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            Self::InvalidTiming(_) => ErrorKind::InvalidTiming,
            Self::AssetIdConflict(_) => ErrorKind::AssetIdConflict,
            Self::TranscodeFailure { .. } => ErrorKind::TranscodeFailure,
            Self::Batch(_) => ErrorKind::Batch,
        }
    }
}

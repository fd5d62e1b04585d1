//! NØNOS Manifest Error Taxonomy
//!
//! Every failure is local and deterministic: a malformed fact, a corrupted or
//! truncated buffer, a format identity mismatch, or bad key material. None of
//! them are retryable, so callers only need to report them.

/// Errors produced while building, parsing, signing or verifying a manifest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid field `{0}`: missing or malformed")]
    InvalidField(&'static str),

    #[error("value for tag 0x{tag:04x} is {len} bytes, exceeds the 16-bit length field")]
    OversizeValue { tag: u16, len: usize },

    #[error("field `{field}` must be {expected} bytes, record declares {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("field `{field}` holds illegal value 0x{value:02x}")]
    InvalidValue { field: &'static str, value: u8 },

    #[error("truncated input at offset {offset}: need {needed} bytes, {remaining} remain")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("truncated record 0x{tag:04x} at offset {offset}: declares {declared} bytes, {remaining} remain")]
    TruncatedRecord {
        tag: u16,
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    #[error("{remaining} dangling bytes at offset {offset} after the last record")]
    TrailingGarbage { offset: usize, remaining: usize },

    #[error("bad magic {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("unsupported manifest version {0}")]
    UnsupportedVersion(u16),

    #[error("header_len {0} is smaller than the defined header fields")]
    BadHeaderLength(u16),

    #[error("mandatory field `{0}` missing")]
    MissingField(&'static str),

    #[error("mandatory field `{0}` appears more than once")]
    DuplicateField(&'static str),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("manifest signature does not verify")]
    BadSignature,

    #[error("unsupported signature algorithm {0}")]
    UnsupportedSigAlg(u16),
}

pub type Result<T> = core::result::Result<T, ManifestError>;

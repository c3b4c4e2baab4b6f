use thiserror::Error;

/// Errors originating from the conversion core.
///
/// All of them are recoverable and reported synchronously to the caller;
/// a failing call never leaves a partial result behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlyphError {
    /// An option value has the wrong type, is out of its declared range,
    /// or names an option the converter does not declare.
    #[error("Option invalide `{name}` : attendu {expected}")]
    InvalidOption {
        /// Option name as supplied by the caller.
        name: String,
        /// Human readable description of the accepted type/range.
        expected: String,
    },

    /// The converter identifier is not part of the static registry.
    #[error("Convertisseur inconnu : {id}")]
    UnknownConverter {
        /// Identifier that was looked up.
        id: String,
    },

    /// Zero-sized grid, or sample buffer inconsistent with the declared
    /// dimensions and channel count.
    #[error("Grille vide ou malformée : {reason}")]
    EmptyOrMalformedGrid {
        /// What was wrong with the grid.
        reason: String,
    },

    /// A choice option names a mode this build does not implement.
    #[error("Mode non supporté pour `{option}` : {value} (supportés : {supported})")]
    UnsupportedMode {
        /// Option carrying the mode.
        option: String,
        /// Requested value.
        value: String,
        /// Comma separated list of accepted values.
        supported: String,
    },

    /// Two grids that must share dimensions do not.
    #[error("Dimensions incompatibles : {left_w}×{left_h} vs {right_w}×{right_h}")]
    DimensionMismatch {
        /// Width of the first operand.
        left_w: u32,
        /// Height of the first operand.
        left_h: u32,
        /// Width of the second operand.
        right_w: u32,
        /// Height of the second operand.
        right_h: u32,
    },
}

impl GlyphError {
    /// Shorthand for [`GlyphError::InvalidOption`].
    #[must_use]
    pub fn invalid_option(name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// Shorthand for [`GlyphError::EmptyOrMalformedGrid`].
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::EmptyOrMalformedGrid {
            reason: reason.into(),
        }
    }
}

/// Result alias used by every core operation.
pub type GlyphResult<T> = Result<T, GlyphError>;

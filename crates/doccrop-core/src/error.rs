// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for DocCrop.

use thiserror::Error;

/// Top-level error type for all DocCrop operations.
#[derive(Debug, Error)]
pub enum DocCropError {
    // -- Pipeline errors --
    /// Input bytes are not a valid image. `index` names the offending image
    /// when the failure happened inside a composition batch.
    #[error("{}", decode_message(*index, message))]
    Decode {
        index: Option<usize>,
        message: String,
    },

    #[error("degenerate geometry: {0}")]
    Geometry(String),

    /// Valid corners whose output would exceed the configured size cap.
    #[error("output of {width}x{height} exceeds the {limit} pixel limit")]
    TooLarge { width: u32, height: u32, limit: u32 },

    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("no images provided")]
    EmptyInput,

    // -- Document inspection --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    // -- Host / configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Structured failure kind, independent of the descriptive message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Geometry,
    TooLarge,
    Encode,
    EmptyInput,
    Pdf,
    Config,
    Io,
}

impl DocCropError {
    /// Shorthand for a decode failure outside of any batch.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            index: None,
            message: message.into(),
        }
    }

    /// Decode failure for the image at `index` of a composition batch.
    pub fn decode_at(index: usize, message: impl Into<String>) -> Self {
        Self::Decode {
            index: Some(index),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Geometry(_) => ErrorKind::Geometry,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
            Self::Encode(_) => ErrorKind::Encode,
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::Pdf(_) => ErrorKind::Pdf,
            Self::Config(_) | Self::Serialization(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

fn decode_message(index: Option<usize>, message: &str) -> String {
    match index {
        Some(i) => format!("image #{i} could not be decoded: {message}"),
        None => format!("image could not be decoded: {message}"),
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocCropError>;

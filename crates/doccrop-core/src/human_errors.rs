// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people scanning documents.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::DocCropError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user can fix it by changing the input (corners, files, options).
    ActionRequired,
    /// Retrying with the same input will fail the same way.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether a caller-side retry could succeed. DocCrop never retries itself.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `DocCropError` into a `HumanError`.
pub fn humanize_error(err: &DocCropError) -> HumanError {
    match err {
        DocCropError::Decode { index, .. } => HumanError {
            message: match index {
                Some(i) => format!("Image number {} couldn't be opened.", i + 1),
                None => "This image couldn't be opened.".into(),
            },
            suggestion: "The file may be damaged or not an image. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DocCropError::Geometry(_) => HumanError {
            message: "The selected corners don't form a page.".into(),
            suggestion: "Drag the four corners onto the corners of the document, going clockwise from the top left, and make sure no two corners sit on top of each other.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DocCropError::Encode(_) => HumanError {
            message: "The result couldn't be saved.".into(),
            suggestion: "Try a smaller selection or fewer pages.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        DocCropError::TooLarge { limit, .. } => HumanError {
            message: "The selected area would make an image that's too big.".into(),
            suggestion: format!("Crop a smaller area, or use a lower-resolution photo. Each side of the result must be at most {limit} pixels."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DocCropError::EmptyInput => HumanError {
            message: "There's nothing to put in the PDF yet.".into(),
            suggestion: "Crop at least one document first, then create the PDF.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DocCropError::Pdf(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged. Try creating the PDF again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        DocCropError::Config(detail) => HumanError {
            message: "The settings couldn't be read.".into(),
            suggestion: format!("Check the settings file for typos. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DocCropError::Serialization(detail) => HumanError {
            message: "The settings couldn't be read.".into(),
            suggestion: format!("Check the settings file for typos. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DocCropError::Io(detail) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check that the file exists and that you can write to the output folder. ({detail})"),
            retriable: true,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_one_based_position() {
        let human = humanize_error(&DocCropError::decode_at(0, "bad"));
        assert_eq!(human.message, "Image number 1 couldn't be opened.");
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn permanent_errors_are_never_retriable() {
        let errors = [
            DocCropError::Encode("png".into()),
            DocCropError::Pdf("xref".into()),
        ];
        for err in &errors {
            let human = humanize_error(err);
            assert_eq!(human.severity, Severity::Permanent);
            assert!(!human.retriable, "{err}");
        }
    }

    #[test]
    fn size_limit_names_the_cap() {
        let human = humanize_error(&DocCropError::TooLarge {
            width: 31000,
            height: 43841,
            limit: 30000,
        });
        assert!(human.suggestion.contains("30000"));
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn geometry_error_is_not_retriable() {
        let human = humanize_error(&DocCropError::Geometry("collinear".into()));
        assert!(!human.retriable);
        assert!(human.suggestion.contains("corners"));
    }
}

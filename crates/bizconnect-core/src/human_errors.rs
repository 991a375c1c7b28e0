// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the UI error banner.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives the note colour; `retriable` decides whether an error note
// offers a Retry button (nothing is retried automatically).

use crate::error::BizError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Connection blip; trying again is likely to work.
    Transient,
    /// The user must do something (sign in, fix a field).
    ActionRequired,
    /// Retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether a manual retry makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `BizError` into a `HumanError` suitable for display.
pub fn humanize_error(err: &BizError) -> HumanError {
    match err {
        BizError::Unauthenticated => HumanError {
            message: "You're not signed in.".into(),
            suggestion: "Please log in to continue.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BizError::SignIn(detail) => HumanError {
            message: "We couldn't sign you in.".into(),
            suggestion: format!("Check your email address and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BizError::NotFound { collection, .. } => HumanError {
            message: format!("That {} no longer exists.", singular(collection)),
            suggestion: "It may have been deleted. Refresh the list to see the latest data.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        BizError::Validation(errors) => HumanError {
            message: "Some fields need attention.".into(),
            suggestion: errors.to_string(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BizError::Remote(detail) => humanize_remote_error(detail),

        BizError::Cancelled => HumanError {
            message: "The request was cancelled.".into(),
            suggestion: "Open the page again to reload it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BizError::Database(_) => HumanError {
            message: "The app's data storage had a problem.".into(),
            suggestion: "Try again. If this keeps happening, restart the app.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BizError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app can't write to its data folder.".into(),
                    suggestion: "Check the folder permissions, then restart the app.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        BizError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

fn singular(collection: &str) -> &str {
    collection.strip_suffix('s').unwrap_or(collection)
}

/// Classify remote failures by their detail text.
fn humanize_remote_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("timed out") || lower.contains("timeout") {
        HumanError {
            message: "The server took too long to respond.".into(),
            suggestion: "Check your connection and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else if lower.contains("unauthorized") || lower.contains("forbidden") {
        HumanError {
            message: "You don't have access to this.".into(),
            suggestion: "Your session may have expired. Log in again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "Something went wrong talking to the server.".into(),
            suggestion: format!("Try again in a moment. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::ServiceForm;

    #[test]
    fn unauthenticated_needs_action() {
        let human = humanize_error(&BizError::Unauthenticated);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn remote_timeout_is_transient() {
        let human = humanize_error(&BizError::Remote("request timed out after 10s".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn not_found_names_the_record_kind() {
        let err = BizError::NotFound {
            collection: "invoices",
            id: "x".into(),
        };
        assert_eq!(humanize_error(&err).message, "That invoice no longer exists.");
    }

    #[test]
    fn validation_lists_field_messages() {
        let errors = ServiceForm::default().validate().unwrap_err();
        let human = humanize_error(&BizError::Validation(errors));
        assert!(human.suggestion.contains("title: Title is required."));
    }
}

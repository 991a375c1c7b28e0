// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Widgets shared by several pages.

use dioxus::prelude::*;

use bizconnect_core::error::BizError;
use bizconnect_core::human_errors::{Severity, humanize_error};

use crate::Route;
use crate::state::AppState;

pub const CARD_STYLE: &str = "padding: 16px; margin: 12px 0; border: 1px solid #e2e8f0; border-radius: 10px; background: white;";
pub const PRIMARY_BUTTON: &str = "padding: 8px 16px; border-radius: 8px; border: none; background: #2563eb; color: white; font-size: 14px; text-decoration: none; cursor: pointer;";
pub const OUTLINE_BUTTON: &str = "padding: 4px 12px; border-radius: 6px; border: 1px solid #cbd5e1; background: white; color: #334155; font-size: 13px; cursor: pointer;";
pub const DANGER_BUTTON: &str = "padding: 4px 12px; border-radius: 6px; border: 1px solid #dc2626; background: white; color: #dc2626; font-size: 13px; cursor: pointer;";

/// Shown instead of a page body when nobody is signed in.
#[component]
pub fn LoginPrompt(message: &'static str) -> Element {
    rsx! {
        div { style: "{CARD_STYLE} text-align: center; padding: 32px;",
            p { style: "color: #64748b;", "{message}" }
            Link { to: Route::Login {}, style: "{PRIMARY_BUTTON}", "Log In" }
        }
    }
}

/// Centered placeholder while the session is still being restored.
#[component]
pub fn SessionLoading() -> Element {
    rsx! {
        div { style: "display: flex; justify-content: center; padding: 64px; font-size: 18px; color: #64748b;",
            "Loading..."
        }
    }
}

/// Grey placeholder card shown while a list loads.
#[component]
pub fn SkeletonCard() -> Element {
    rsx! {
        div { style: "{CARD_STYLE}",
            div { style: "height: 14px; width: 33%; background: #e2e8f0; border-radius: 4px; margin-bottom: 10px;" }
            div { style: "height: 14px; width: 50%; background: #e2e8f0; border-radius: 4px; margin-bottom: 10px;" }
            div { style: "height: 14px; width: 25%; background: #e2e8f0; border-radius: 4px;" }
        }
    }
}

/// Inline plain-English rendering of an error, with a Retry button when
/// `on_retry` is set.
#[component]
pub fn ErrorNote(
    message: String,
    suggestion: String,
    severity: String,
    on_retry: Option<EventHandler<()>>,
) -> Element {
    rsx! {
        div { style: "padding: 10px 14px; margin: 8px 0; border-radius: 8px; background: {severity}; font-size: 14px;",
            strong { "{message}" }
            p { style: "margin: 4px 0 0 0; color: #475569;", "{suggestion}" }
            if let Some(retry) = on_retry {
                button {
                    style: "{OUTLINE_BUTTON} margin-top: 8px;",
                    onclick: move |_| retry.call(()),
                    "Retry"
                }
            }
        }
    }
}

/// Render `err` with [`ErrorNote`].
pub fn error_note(err: &BizError) -> Element {
    render_error(err, None)
}

/// Like [`error_note`], offering Retry when trying again can help.
pub fn retry_note(err: &BizError, on_retry: impl FnMut(()) + 'static) -> Element {
    let retry = retry_offered(err).then(|| EventHandler::new(on_retry));
    render_error(err, retry)
}

fn retry_offered(err: &BizError) -> bool {
    humanize_error(err).retriable
}

fn render_error(err: &BizError, on_retry: Option<EventHandler<()>>) -> Element {
    let human = humanize_error(err);
    rsx! {
        ErrorNote {
            message: human.message,
            suggestion: human.suggestion,
            severity: severity_bg(human.severity).to_string(),
            on_retry,
        }
    }
}

/// Publish `err` to the banner under the nav bar.
pub fn report(mut state: Signal<AppState>, context: &str, err: &BizError) {
    if matches!(err, BizError::Cancelled) {
        return;
    }
    tracing::error!(error = %err, "{context} failed");
    let human = humanize_error(err);
    state.write().set_status(format!("{} {}", human.message, human.suggestion));
}

fn severity_bg(severity: Severity) -> &'static str {
    match severity {
        Severity::Transient => "#fef9c3",
        Severity::ActionRequired => "#dbeafe",
        Severity::Permanent => "#fee2e2",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_offered_only_when_trying_again_can_help() {
        assert!(retry_offered(&BizError::Remote("connection timed out".into())));
        assert!(retry_offered(&BizError::Database("disk I/O error".into())));
        assert!(!retry_offered(&BizError::Unauthenticated));
        assert!(!retry_offered(&BizError::NotFound {
            collection: "invoices",
            id: "x".into(),
        }));
    }
}

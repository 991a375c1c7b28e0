// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native yes/no dialog for destructive actions.

use bizconnect_data::Confirm;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

/// Blocks on a native message box until the user answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogConfirm;

impl Confirm for DialogConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let answer = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("BizConnect")
            .set_description(prompt)
            .set_buttons(MessageButtons::YesNo)
            .show();
        tracing::debug!(?answer, "confirmation answered");
        answer == MessageDialogResult::Yes
    }
}

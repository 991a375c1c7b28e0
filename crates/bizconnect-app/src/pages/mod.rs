// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

pub mod browse;
pub mod common;
pub mod create_invoice;
pub mod dashboard;
pub mod invoices;
pub mod login;
pub mod service_detail;
pub mod settings;

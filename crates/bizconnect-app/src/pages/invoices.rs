// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Invoices page: the signed-in user's invoices, newest first.

use dioxus::prelude::*;

use bizconnect_core::format::{format_currency, format_date, format_timestamp, month_name};
use bizconnect_core::types::Invoice;
use bizconnect_data::{CancelToken, CollectionBinding, DeleteOutcome, SessionState, delete_with_confirmation};

use crate::Route;
use crate::pages::common::{
    CARD_STYLE, DANGER_BUTTON, LoginPrompt, PRIMARY_BUTTON, SessionLoading, SkeletonCard, error_note,
    report, retry_note,
};
use crate::services::app_services::AppServices;
use crate::services::confirm::DialogConfirm;
use crate::state::{AppState, use_snapshot, use_view_scope};

const DELETE_PROMPT: &str = "Are you sure you want to delete this invoice?";

#[component]
pub fn Invoices() -> Element {
    let state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    let session = state.read().session.clone();
    match session {
        SessionState::Initializing => rsx! { SessionLoading {} },
        SessionState::SignedOut => rsx! {
            LoginPrompt { message: "Please log in to view your invoices." }
        },
        SessionState::SignedIn(_) => match svc.bindings() {
            Ok(bindings) => rsx! { InvoiceList { invoices: bindings.invoices } },
            Err(e) => error_note(&e),
        },
    }
}

#[component]
fn InvoiceList(invoices: CollectionBinding<Invoice>) -> Element {
    let state = use_context::<Signal<AppState>>();
    let scope = use_view_scope();
    let snapshot = use_snapshot(invoices.clone());

    let binding = invoices.clone();
    let mount_scope = scope.clone();
    use_future(move || {
        let binding = binding.clone();
        let scope = mount_scope.clone();
        async move {
            if let Err(e) = binding.reload(&scope).await {
                report(state, "loading invoices", &e);
            }
        }
    });

    let config = state.read().config.clone();
    let snap = snapshot.read().clone();
    let failure = snap.last_error().map(|e| {
        let binding = invoices.clone();
        let scope = scope.clone();
        retry_note(e, move |_| {
            let binding = binding.clone();
            let scope = scope.clone();
            spawn(async move {
                if let Err(e) = binding.reload(&scope).await {
                    report(state, "loading invoices", &e);
                }
            });
        })
    });

    rsx! {
        div {
            div { style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 24px;",
                div {
                    h1 { style: "margin: 0;", "My Invoices" }
                    p { style: "color: #64748b; margin-top: 8px;", "Manage and track your business invoices" }
                }
                Link { to: Route::CreateInvoice {}, style: "{PRIMARY_BUTTON}", "+ Create Invoice" }
            }

            if snap.is_creating() {
                p { style: "color: #2563eb; font-size: 14px;", "Saving your new invoice..." }
            }
            {failure}

            if snap.is_loading() {
                for i in 0..3 {
                    SkeletonCard { key: "{i}" }
                }
            } else if snap.is_empty_state() {
                div { style: "{CARD_STYLE} text-align: center; padding: 48px;",
                    div { style: "font-size: 48px; color: #94a3b8;", "\u{1F4C4}" }
                    h3 { "No invoices yet" }
                    p { style: "color: #64748b; margin-bottom: 24px;", "Get started by creating your first invoice." }
                    Link { to: Route::CreateInvoice {}, style: "{PRIMARY_BUTTON}", "+ Create Your First Invoice" }
                }
            } else {
                for invoice in snap.items().iter() {
                    InvoiceCard {
                        key: "{invoice.id}",
                        invoice: invoice.clone(),
                        currency: config.currency_code.clone(),
                        binding: invoices.clone(),
                        scope: scope.clone(),
                        delete_disabled: snap.delete_locked(invoice.id, config.lock_all_deletes),
                    }
                }
            }
        }
    }
}

#[component]
fn InvoiceCard(
    invoice: Invoice,
    currency: String,
    binding: CollectionBinding<Invoice>,
    scope: CancelToken,
    delete_disabled: bool,
) -> Element {
    let state = use_context::<Signal<AppState>>();
    let id = invoice.id;
    let month = month_name(i64::from(invoice.month));
    let created = format_timestamp(invoice.created_at);
    let amount = format_currency(invoice.sales_amount, &currency);
    let date = format_date(invoice.invoice_date);

    rsx! {
        div { style: "{CARD_STYLE}",
            div { style: "display: flex; justify-content: space-between; align-items: flex-start;",
                div {
                    strong { style: "font-size: 18px;", "Invoice for {month}" }
                    p { style: "margin: 4px 0; color: #64748b; font-size: 13px;", "Created {created}" }
                }
                button {
                    style: "{DANGER_BUTTON}",
                    disabled: delete_disabled,
                    title: "Delete invoice",
                    onclick: move |_| {
                        let binding = binding.clone();
                        let scope = scope.clone();
                        spawn(async move {
                            let outcome =
                                delete_with_confirmation(&binding, id, DELETE_PROMPT, &DialogConfirm, &scope)
                                    .await;
                            if let DeleteOutcome::Failed(e) = outcome {
                                report(state, "deleting invoice", &e);
                            }
                        });
                    },
                    "Delete"
                }
            }
            div { style: "display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; margin-top: 12px;",
                div {
                    p { style: "margin: 0; color: #64748b; font-size: 13px;", "Amount" }
                    p { style: "margin: 0; font-weight: 600;", "{amount}" }
                }
                div {
                    p { style: "margin: 0; color: #64748b; font-size: 13px;", "Date" }
                    p { style: "margin: 0; font-weight: 600;", "{date}" }
                }
                div {
                    span { style: "font-size: 12px; padding: 4px 10px; border-radius: 999px; background: #f1f5f9;",
                        "Month {invoice.month}"
                    }
                }
            }
            if let Some(ref description) = invoice.description {
                div { style: "margin-top: 12px; padding-top: 12px; border-top: 1px solid #e2e8f0;",
                    p { style: "margin: 0; color: #64748b; font-size: 13px;", "Description" }
                    p { style: "margin: 4px 0 0 0;", "{description}" }
                }
            }
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Create-invoice page.
//
// On a valid submit the create is handed to the shared invoice binding, the
// form resets, and the user lands on the invoice list straight away; the
// list picks the new record up when the binding resyncs. The request runs
// under the session scope rather than this page's, since the page unmounts
// on navigation.

use dioxus::prelude::*;

use bizconnect_core::forms::{FormErrors, InvoiceField, InvoiceForm};
use bizconnect_core::types::Invoice;
use bizconnect_data::{CollectionBinding, SessionState};

use crate::Route;
use crate::pages::common::{
    CARD_STYLE, LoginPrompt, OUTLINE_BUTTON, PRIMARY_BUTTON, SessionLoading, error_note, report,
};
use crate::services::app_services::AppServices;
use crate::state::{AppState, use_snapshot};

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[component]
pub fn CreateInvoice() -> Element {
    let state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    let session = state.read().session.clone();
    match session {
        SessionState::Initializing => rsx! { SessionLoading {} },
        SessionState::SignedOut => rsx! {
            LoginPrompt { message: "Please log in to create invoices." }
        },
        SessionState::SignedIn(_) => match svc.bindings() {
            Ok(bindings) => rsx! { InvoiceFormView { invoices: bindings.invoices } },
            Err(e) => error_note(&e),
        },
    }
}

#[component]
fn InvoiceFormView(invoices: CollectionBinding<Invoice>) -> Element {
    let state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut form = use_signal(|| InvoiceForm::new(today()));
    let mut errors = use_signal(FormErrors::default);
    let snapshot = use_snapshot(invoices.clone());

    let creating = snapshot.read().is_creating();
    let field_error = move |field: &str| errors.read().get(field).map(str::to_string);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let draft = match form.read().validate() {
            Ok(draft) => draft,
            Err(e) => {
                errors.set(e);
                return;
            }
        };
        let binding = invoices.clone();
        let scope = svc.session().scope();
        spawn_forever(async move {
            match binding.create(draft, &scope).await {
                Ok(invoice) => tracing::info!(invoice_id = %invoice.id, "invoice created"),
                Err(e) => report(state, "creating invoice", &e),
            }
        });
        errors.set(FormErrors::default());
        form.write().reset(today());
        navigator().push(Route::Invoices {});
    };

    rsx! {
        div { style: "max-width: 640px; margin: 0 auto;",
            div { style: "{CARD_STYLE}",
                h2 { style: "margin-top: 0;", "Create New Invoice" }
                p { style: "color: #64748b;", "Add a new invoice to track your business transactions." }

                form { onsubmit: on_submit,
                    div { style: "display: grid; grid-template-columns: 1fr 1fr; gap: 16px;",
                        FormField {
                            label: "Month",
                            input_type: "number",
                            placeholder: "e.g., 1 for January, 12 for December",
                            value: form.read().month.clone(),
                            error: field_error("month"),
                            on_input: move |v: String| form.write().set(InvoiceField::Month, v),
                        }
                        FormField {
                            label: "Invoice Date",
                            input_type: "date",
                            placeholder: "",
                            value: form.read().invoice_date.clone(),
                            error: field_error("invoice_date"),
                            on_input: move |v: String| form.write().set(InvoiceField::InvoiceDate, v),
                        }
                    }
                    FormField {
                        label: "Sales Amount",
                        input_type: "number",
                        placeholder: "Enter amount in cents (e.g., 10000 for $100.00)",
                        value: form.read().sales_amount.clone(),
                        error: field_error("sales_amount"),
                        on_input: move |v: String| form.write().set(InvoiceField::SalesAmount, v),
                    }
                    div { style: "margin-bottom: 16px;",
                        label { style: "display: block; font-weight: bold; margin-bottom: 6px;", "Description (Optional)" }
                        textarea {
                            rows: "3",
                            placeholder: "Add any additional details about this invoice...",
                            value: "{form.read().description}",
                            style: "width: 100%; padding: 10px; border: 1px solid #cbd5e1; border-radius: 8px; box-sizing: border-box;",
                            oninput: move |evt| form.write().set(InvoiceField::Description, evt.value()),
                        }
                    }

                    div { style: "display: flex; gap: 12px;",
                        button {
                            r#type: "submit",
                            style: "{PRIMARY_BUTTON} flex: 1;",
                            disabled: creating,
                            if creating { "Creating..." } else { "Create Invoice" }
                        }
                        button {
                            r#type: "button",
                            style: "{OUTLINE_BUTTON}",
                            onclick: move |_| {
                                navigator().push(Route::Invoices {});
                            },
                            "Cancel"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn FormField(
    label: &'static str,
    input_type: &'static str,
    placeholder: &'static str,
    value: String,
    error: Option<String>,
    on_input: EventHandler<String>,
) -> Element {
    rsx! {
        div { style: "margin-bottom: 16px;",
            label { style: "display: block; font-weight: bold; margin-bottom: 6px;", "{label}" }
            input {
                r#type: input_type,
                placeholder: placeholder,
                value: "{value}",
                style: "width: 100%; padding: 10px; border: 1px solid #cbd5e1; border-radius: 8px; box-sizing: border-box;",
                oninput: move |evt| on_input.call(evt.value()),
            }
            if let Some(msg) = error {
                p { style: "color: #dc2626; font-size: 13px; margin: 4px 0;", "{msg}" }
            }
        }
    }
}

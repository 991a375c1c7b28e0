// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single service listing, reached from the browse and dashboard "View" buttons.

use dioxus::prelude::*;

use bizconnect_core::format::format_timestamp;
use bizconnect_core::types::ServiceId;

use crate::Route;
use crate::pages::common::{CARD_STYLE, OUTLINE_BUTTON, SkeletonCard, retry_note};
use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn ServiceDetail(id: String) -> Element {
    let svc = use_context::<AppServices>();
    let state = use_context::<Signal<AppState>>();

    let mut listing = use_resource(use_reactive!(|id| {
        let catalog = svc.catalog();
        async move {
            match ServiceId::parse(&id) {
                Some(service_id) => catalog.service(service_id).await,
                None => Ok(None),
            }
        }
    }));

    let viewer = state.read().user().map(|u| u.id);

    rsx! {
        div {
            Link { to: Route::Browse {}, style: "{OUTLINE_BUTTON} text-decoration: none;", "← Back to services" }

            {match &*listing.read() {
                None => rsx! { SkeletonCard {} },
                Some(Err(e)) => retry_note(e, move |_| listing.restart()),
                Some(Ok(None)) => rsx! {
                    div { style: "{CARD_STYLE} text-align: center;",
                        h3 { "Service not found" }
                        p { style: "color: #64748b;", "It may have been removed by its owner." }
                    }
                },
                Some(Ok(Some(service))) => {
                    let owned = viewer == Some(service.user_id);
                    let (badge_bg, badge_fg, badge_text) = if service.is_active {
                        ("#dcfce7", "#166534", "Active")
                    } else {
                        ("#f1f5f9", "#475569", "Inactive")
                    };
                    let owner = service.owner.clone().unwrap_or_default();
                    let listed = format_timestamp(service.created_at);
                    rsx! {
                        div { style: "{CARD_STYLE}",
                            div { style: "display: flex; justify-content: space-between; align-items: center;",
                                h1 { style: "margin: 0;", "{service.title}" }
                                span { style: "font-size: 12px; padding: 4px 8px; border-radius: 4px; background: {badge_bg}; color: {badge_fg};",
                                    "{badge_text}"
                                }
                            }
                            p { style: "color: #64748b;", "{service.category}" }
                            p { style: "font-size: 16px; line-height: 1.5;", "{service.description}" }
                            dl { style: "display: grid; grid-template-columns: 140px 1fr; gap: 6px; font-size: 14px;",
                                if let Some(ref price) = service.price_range {
                                    dt { "Price" }
                                    dd { style: "margin: 0;", "{price}" }
                                }
                                if let Some(ref location) = service.location {
                                    dt { "Location" }
                                    dd { style: "margin: 0;", "{location}" }
                                }
                                if let Some(company) = owner.company_name {
                                    dt { "Company" }
                                    dd { style: "margin: 0;", "{company}" }
                                }
                                if let Some(name) = owner.display_name {
                                    dt { "Contact" }
                                    dd { style: "margin: 0;", "{name}" }
                                }
                                dt { "Listed" }
                                dd { style: "margin: 0;", "{listed}" }
                            }
                            if owned {
                                p { style: "margin-top: 16px;",
                                    Link { to: Route::Dashboard {}, "Manage this listing in your dashboard" }
                                }
                            }
                        }
                    }
                }
            }}
        }
    }
}

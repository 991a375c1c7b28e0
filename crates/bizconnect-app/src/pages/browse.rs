// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Browse page: featured listings with search and category chips.

use dioxus::prelude::*;

use bizconnect_core::catalog::{ServiceFilter, filter_services};
use bizconnect_core::types::{SERVICE_CATEGORIES, Service};

use crate::Route;
use crate::pages::common::{CARD_STYLE, OUTLINE_BUTTON, PRIMARY_BUTTON, SkeletonCard, retry_note};
use crate::services::app_services::AppServices;

#[component]
pub fn Browse() -> Element {
    let svc = use_context::<AppServices>();
    let mut query = use_signal(String::new);
    let mut category = use_signal(|| Option::<String>::None);

    let catalog = svc.catalog();
    let mut listings = use_resource(move || {
        let catalog = catalog.clone();
        async move { catalog.browse().await }
    });

    let filter = ServiceFilter {
        query: query.read().clone(),
        category: category.read().clone(),
        active_only: true,
    };

    rsx! {
        div {
            section { style: "text-align: center; padding: 32px 0;",
                h1 { style: "font-size: 36px; margin-bottom: 8px;", "Connect. Collaborate. Grow." }
                p { style: "color: #64748b; font-size: 18px;",
                    "Find trusted business services from verified companies in your network."
                }
            }

            section { style: "max-width: 800px; margin: 0 auto 24px auto;",
                input {
                    r#type: "search",
                    placeholder: "Search for services, companies, or keywords...",
                    value: "{query}",
                    style: "width: 100%; padding: 12px 16px; font-size: 16px; border: 1px solid #cbd5e1; border-radius: 10px; box-sizing: border-box;",
                    oninput: move |evt| query.set(evt.value()),
                }
                div { style: "display: flex; flex-wrap: wrap; gap: 8px; margin-top: 12px;",
                    for cat in SERVICE_CATEGORIES.iter().copied() {
                        {
                            let selected = category.read().as_deref() == Some(cat);
                            let bg = if selected { "#2563eb" } else { "#e2e8f0" };
                            let fg = if selected { "white" } else { "#334155" };
                            rsx! {
                                button {
                                    key: "{cat}",
                                    style: "padding: 4px 12px; border-radius: 999px; border: none; background: {bg}; color: {fg}; font-size: 13px; cursor: pointer;",
                                    onclick: move |_| {
                                        let next = if selected { None } else { Some(cat.to_string()) };
                                        category.set(next);
                                    },
                                    "{cat}"
                                }
                            }
                        }
                    }
                }
            }

            h2 { "Featured Services" }
            {match &*listings.read() {
                None => rsx! {
                    for i in 0..3 {
                        SkeletonCard { key: "{i}" }
                    }
                },
                Some(Err(e)) => retry_note(e, move |_| listings.restart()),
                Some(Ok(services)) => {
                    let shown = filter_services(services, &filter);
                    if shown.is_empty() {
                        rsx! {
                            p { style: "text-align: center; color: #94a3b8; margin: 48px 0;",
                                "No services match your search."
                            }
                        }
                    } else {
                        rsx! {
                            div { style: "display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 16px;",
                                for service in shown {
                                    ServiceCard { key: "{service.id}", service: service.clone() }
                                }
                            }
                        }
                    }
                }
            }}

            section { style: "margin: 48px 0; text-align: center;",
                h2 { "Why Choose BizConnect?" }
                p { style: "color: #64748b;", "The platform built for B2B service discovery and networking" }
                div { style: "display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 16px; margin-top: 24px;",
                    Feature { title: "Verified Businesses", body: "Every listing belongs to a signed-in business account." }
                    Feature { title: "Targeted Matching", body: "Search and category filters narrow the marketplace to what you need." }
                    Feature { title: "Quality Assurance", body: "Compare offerings, prices and locations side by side." }
                }
            }

            section { style: "margin: 48px 0; padding: 40px; border-radius: 12px; background: #1e3a8a; color: white; text-align: center;",
                h2 { style: "margin-top: 0;", "Ready to Grow Your Business Network?" }
                p { style: "opacity: 0.9;", "List your services and start connecting with other businesses." }
                Link { to: Route::Dashboard {}, style: "{PRIMARY_BUTTON} background: white; color: #1e3a8a;", "Start Free Today" }
            }
        }
    }
}

#[component]
fn Feature(title: &'static str, body: &'static str) -> Element {
    rsx! {
        div { style: "{CARD_STYLE} margin: 0;",
            h3 { style: "margin-top: 0;", "{title}" }
            p { style: "color: #64748b; margin-bottom: 0;", "{body}" }
        }
    }
}

/// Public listing card.
#[component]
pub fn ServiceCard(service: Service) -> Element {
    let company = service
        .owner
        .as_ref()
        .and_then(|o| o.company_name.clone().or_else(|| o.display_name.clone()));

    rsx! {
        div { style: "{CARD_STYLE} margin: 0;",
            div { style: "display: flex; justify-content: space-between; align-items: flex-start;",
                div {
                    strong { style: "font-size: 17px;", "{service.title}" }
                    if let Some(company) = company {
                        p { style: "margin: 2px 0; color: #64748b; font-size: 13px;", "{company}" }
                    }
                }
                span { style: "font-size: 12px; padding: 2px 8px; border-radius: 999px; background: #e0e7ff; color: #3730a3;",
                    "{service.category}"
                }
            }
            p { style: "color: #475569; font-size: 14px;", "{service.description}" }
            div { style: "display: flex; justify-content: space-between; align-items: center; font-size: 13px; color: #64748b;",
                span {
                    if let Some(ref price) = service.price_range {
                        strong { style: "color: #0f172a;", "{price}" }
                    }
                    if let Some(ref location) = service.location {
                        " · {location}"
                    }
                }
                Link {
                    to: Route::ServiceDetail { id: service.id.to_string() },
                    style: "{OUTLINE_BUTTON} text-decoration: none;",
                    "View Details"
                }
            }
        }
    }
}

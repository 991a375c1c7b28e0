// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Browse-page filtering and dashboard counts over service listings.

use crate::types::Service;

/// Search and category filter applied on the browse page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceFilter {
    /// Case-insensitive substring matched against title, description,
    /// category, and owner company/display name.
    pub query: String,
    /// Exact category (case-insensitive); `None` matches all.
    pub category: Option<String>,
    /// Hide listings whose owner marked them inactive.
    pub active_only: bool,
}

impl ServiceFilter {
    pub fn matches(&self, service: &Service) -> bool {
        if self.active_only && !service.is_active {
            return false;
        }
        if let Some(ref cat) = self.category
            && !service.category.eq_ignore_ascii_case(cat)
        {
            return false;
        }
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let owner = service.owner.as_ref();
        [
            Some(service.title.as_str()),
            Some(service.description.as_str()),
            Some(service.category.as_str()),
            owner.and_then(|o| o.company_name.as_deref()),
            owner.and_then(|o| o.display_name.as_deref()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Services matching `filter`, order preserved.
pub fn filter_services<'a>(services: &'a [Service], filter: &ServiceFilter) -> Vec<&'a Service> {
    services.iter().filter(|s| filter.matches(s)).collect()
}

/// Listing counts shown on the dashboard analytics tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub categories: usize,
}

pub fn service_stats(services: &[Service]) -> ServiceStats {
    let active = services.iter().filter(|s| s.is_active).count();
    let mut categories: Vec<String> = services.iter().map(|s| s.category.to_lowercase()).collect();
    categories.sort();
    categories.dedup();
    ServiceStats {
        total: services.len(),
        active,
        inactive: services.len() - active,
        categories: categories.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewService, ServiceOwner, UserId};

    fn service(title: &str, category: &str, company: Option<&str>) -> Service {
        let mut s = Service::from_draft(
            UserId::new(),
            NewService {
                title: title.into(),
                description: format!("{title} for growing teams"),
                category: category.into(),
                price_range: None,
                location: None,
            },
        );
        s.owner = company.map(|c| ServiceOwner {
            company_name: Some(c.into()),
            display_name: None,
        });
        s
    }

    fn catalog() -> Vec<Service> {
        vec![
            service("Digital Marketing Strategy", "Marketing", Some("MarketPro Solutions")),
            service("Web Development & Design", "Development", Some("TechCraft Studios")),
            service("Financial Consulting", "Finance", Some("FinanceWise Inc")),
        ]
    }

    #[test]
    fn empty_filter_matches_everything() {
        let all = catalog();
        assert_eq!(filter_services(&all, &ServiceFilter::default()).len(), 3);
    }

    #[test]
    fn query_matches_owner_company_case_insensitively() {
        let all = catalog();
        let filter = ServiceFilter {
            query: "techcraft".into(),
            ..Default::default()
        };
        let hits = filter_services(&all, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Web Development & Design");
    }

    #[test]
    fn category_and_active_only_combine() {
        let mut all = catalog();
        all[2].is_active = false;
        let filter = ServiceFilter {
            category: Some("finance".into()),
            active_only: true,
            ..Default::default()
        };
        assert!(filter_services(&all, &filter).is_empty());
    }

    #[test]
    fn stats_count_active_and_categories() {
        let mut all = catalog();
        all.push(service("SEO Audit", "marketing", None));
        all[0].is_active = false;
        let stats = service_stats(&all);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.categories, 3);
    }
}

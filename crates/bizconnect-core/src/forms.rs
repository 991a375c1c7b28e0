// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Create-form state and parsing.
//
// Form fields are held as raw text exactly as typed. Two conversions exist:
// `coerce()` reproduces lenient integer coercion (non-numeric text becomes
// `Coerced::NotANumber` and is carried into the payload unchecked), and
// `validate()` produces a typed draft or per-field errors. The UI submits
// only validated drafts.

use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{NewInvoice, NewService};

/// Date format accepted by `<input type="date">`.
pub const ISO_DATE: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Lenient integer coercion
// ---------------------------------------------------------------------------

/// Outcome of lenient integer coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coerced {
    Int(i64),
    NotANumber,
}

impl Coerced {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    pub fn value(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::NotANumber => None,
        }
    }
}

impl fmt::Display for Coerced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::NotANumber => f.write_str("NaN"),
        }
    }
}

/// Coerce text to an integer the lenient way: skip leading whitespace, take
/// an optional sign and the longest run of decimal digits, ignore the rest.
///
/// `"12abc"` is `Int(12)`, `"abc"` and `""` are `NotANumber`. Digit runs that
/// overflow `i64` are also `NotANumber`.
pub fn coerce_integer(text: &str) -> Coerced {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return Coerced::NotANumber;
    }
    match rest[..digits_len].parse::<i64>() {
        Ok(v) if negative => Coerced::Int(-v),
        Ok(v) => Coerced::Int(v),
        Err(_) => Coerced::NotANumber,
    }
}

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// A validation failure attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All validation failures for one submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First error message for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

// ---------------------------------------------------------------------------
// Invoice form
// ---------------------------------------------------------------------------

/// Editable fields of the create-invoice form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceField {
    Month,
    SalesAmount,
    InvoiceDate,
    Description,
}

/// Raw text state of the create-invoice form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceForm {
    pub month: String,
    pub sales_amount: String,
    pub invoice_date: String,
    pub description: String,
}

/// Invoice payload built by lenient coercion, before any validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercedInvoice {
    pub month: Coerced,
    pub sales_amount: Coerced,
    pub invoice_date: String,
    pub description: Option<String>,
}

impl InvoiceForm {
    /// Empty form with `invoice_date` preset to `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            month: String::new(),
            sales_amount: String::new(),
            invoice_date: today.format(ISO_DATE).to_string(),
            description: String::new(),
        }
    }

    /// Restore the initial defaults.
    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }

    pub fn set(&mut self, field: InvoiceField, value: impl Into<String>) {
        let value = value.into();
        match field {
            InvoiceField::Month => self.month = value,
            InvoiceField::SalesAmount => self.sales_amount = value,
            InvoiceField::InvoiceDate => self.invoice_date = value,
            InvoiceField::Description => self.description = value,
        }
    }

    /// Build the payload with lenient coercion and no checks. Non-numeric
    /// month or amount text yields `Coerced::NotANumber` in that field.
    pub fn coerce(&self) -> CoercedInvoice {
        CoercedInvoice {
            month: coerce_integer(&self.month),
            sales_amount: coerce_integer(&self.sales_amount),
            invoice_date: self.invoice_date.clone(),
            description: (!self.description.is_empty()).then(|| self.description.clone()),
        }
    }

    /// Parse and validate every field.
    ///
    /// Month must be an integer in 1..=12, the amount a non-negative integer
    /// number of minor units, the date `YYYY-MM-DD`. A blank description is
    /// `None`.
    pub fn validate(&self) -> Result<NewInvoice, FormErrors> {
        let mut errors = FormErrors::default();

        let month = match self.month.trim().parse::<i64>() {
            Ok(m) if (1..=12).contains(&m) => m as u8,
            Ok(_) => {
                errors.push("month", "Month must be between 1 and 12.");
                0
            }
            Err(_) => {
                errors.push("month", "Enter the month as a number, e.g. 3 for March.");
                0
            }
        };

        let sales_amount = match self.sales_amount.trim().parse::<i64>() {
            Ok(a) if a >= 0 => a,
            Ok(_) => {
                errors.push("sales_amount", "Sales amount cannot be negative.");
                0
            }
            Err(_) => {
                errors.push(
                    "sales_amount",
                    "Enter the amount in cents as a whole number, e.g. 10000 for $100.00.",
                );
                0
            }
        };

        let invoice_date = match NaiveDate::parse_from_str(self.invoice_date.trim(), ISO_DATE) {
            Ok(d) => Some(d),
            Err(_) => {
                errors.push("invoice_date", "Enter a valid date.");
                None
            }
        };

        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        errors.into_result(|| NewInvoice {
            month,
            sales_amount,
            invoice_date: invoice_date.unwrap_or(NaiveDate::MIN),
            description,
        })
    }
}

impl Default for InvoiceForm {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

// ---------------------------------------------------------------------------
// Service form
// ---------------------------------------------------------------------------

/// Raw text state of the create-service dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price_range: String,
    pub location: String,
}

impl ServiceForm {
    /// Title, description and category are required; the rest are optional.
    /// All fields are trimmed.
    pub fn validate(&self) -> Result<NewService, FormErrors> {
        let mut errors = FormErrors::default();
        let required = |errors: &mut FormErrors, field: &'static str, label: &str, value: &str| {
            let v = value.trim();
            if v.is_empty() {
                errors.push(field, format!("{label} is required."));
            }
            v.to_string()
        };

        let title = required(&mut errors, "title", "Title", &self.title);
        let description = required(&mut errors, "description", "Description", &self.description);
        let category = required(&mut errors, "category", "Category", &self.category);

        let optional = |v: &str| Some(v.trim()).filter(|v| !v.is_empty()).map(str::to_string);
        let price_range = optional(&self.price_range);
        let location = optional(&self.location);

        errors.into_result(|| NewService {
            title,
            description,
            category,
            price_range,
            location,
        })
    }
}

//! Per-entity validation passes.

use crate::model::record::{OrderRecord, ProductRecord, RecordId, UserRecord};
use crate::validation::reason::{Rejection, RejectionReason, Validated};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashSet;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Returns whether `email` matches the simple `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validates users in input order.
///
/// Rules: blank name, malformed email, email already taken by an accepted
/// user. Only accepted users enter the seen-email set, so a rejected row
/// never causes a later duplicate rejection.
pub fn validate_users(rows: &[UserRecord]) -> Validated<UserRecord> {
    let mut result = Validated::with_capacity(rows.len());
    let mut seen_emails: HashSet<&str> = HashSet::with_capacity(rows.len());

    for row in rows {
        let mut reasons = Vec::new();
        if row.name.trim().is_empty() {
            reasons.push(RejectionReason::MissingName);
        }
        if !is_valid_email(&row.email) {
            reasons.push(RejectionReason::InvalidEmail);
        }
        if seen_emails.contains(row.email.as_str()) {
            reasons.push(RejectionReason::DuplicateEmail);
        }

        match Rejection::from_reasons(row.clone(), reasons) {
            Some(rejection) => result.rejected.push(rejection),
            None => {
                seen_emails.insert(row.email.as_str());
                result.valid.push(row.clone());
            }
        }
    }

    log_pass("users", &result);
    result
}

/// Validates products in input order.
///
/// Rules: blank name, price not strictly positive. Duplicate names are fine.
pub fn validate_products(rows: &[ProductRecord]) -> Validated<ProductRecord> {
    let mut result = Validated::with_capacity(rows.len());

    for row in rows {
        let mut reasons = Vec::new();
        if row.name.trim().is_empty() {
            reasons.push(RejectionReason::MissingName);
        }
        if row.price <= Decimal::ZERO {
            reasons.push(RejectionReason::NonPositivePrice);
        }

        match Rejection::from_reasons(row.clone(), reasons) {
            Some(rejection) => result.rejected.push(rejection),
            None => result.valid.push(row.clone()),
        }
    }

    log_pass("products", &result);
    result
}

/// Validates orders against the ids of already-validated users and products.
///
/// Callers must pass ids taken from `Validated::valid`, not from raw input.
pub fn validate_orders(
    rows: &[OrderRecord],
    valid_user_ids: &HashSet<RecordId>,
    valid_product_ids: &HashSet<RecordId>,
) -> Validated<OrderRecord> {
    let mut result = Validated::with_capacity(rows.len());

    for row in rows {
        let mut reasons = Vec::new();
        if row.quantity <= 0 {
            reasons.push(RejectionReason::NonPositiveQuantity);
        }
        if !valid_user_ids.contains(&row.user_id) {
            reasons.push(RejectionReason::UnknownUser {
                user_id: row.user_id,
            });
        }
        if !valid_product_ids.contains(&row.product_id) {
            reasons.push(RejectionReason::UnknownProduct {
                product_id: row.product_id,
            });
        }

        match Rejection::from_reasons(row.clone(), reasons) {
            Some(rejection) => result.rejected.push(rejection),
            None => result.valid.push(row.clone()),
        }
    }

    log_pass("orders", &result);
    result
}

fn log_pass<R>(entity: &str, result: &Validated<R>) {
    debug!(
        "event=validate module=validation status=ok entity={} total={} valid={} rejected={}",
        entity,
        result.total(),
        result.valid.len(),
        result.rejected.len()
    );
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn email_shape_is_enforced() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.co"));
        assert!(!is_valid_email("alice.example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice@@example.com"));
        assert!(!is_valid_email("al ice@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@.com"));
        assert!(!is_valid_email("alice@example."));
        assert!(!is_valid_email(""));
    }
}

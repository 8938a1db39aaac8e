//! Double-submit CSRF check for the login form.
//!
//! The token lives in an `HttpOnly` cookie and is echoed in a hidden form
//! field. Nothing is stored server-side; a request passes when both copies
//! are present and identical.

use super::token::constant_time_eq;

pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Compare the cookie copy against the submitted form copy.
#[must_use]
pub fn validate_csrf_token(cookie_value: Option<&str>, form_value: Option<&str>) -> bool {
    let (Some(cookie_value), Some(form_value)) = (cookie_value, form_value) else {
        return false;
    };

    if cookie_value.is_empty() || form_value.is_empty() {
        return false;
    }

    constant_time_eq(cookie_value, form_value)
}

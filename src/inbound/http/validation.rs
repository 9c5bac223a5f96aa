//! Shared validation helpers for inbound HTTP adapters.
//!
//! Field-level validation runs as a pre-check before the domain logic and
//! produces the `{field: message}` violation map required by the API
//! contract. Multiple violations on one field are concatenated with `"; "`.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::Error;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

/// Lenient email syntax check: one `@` with non-empty, whitespace-free
/// local part and domain.
fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^@\s]+@[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Accumulator for field-level violations.
#[derive(Debug, Default)]
pub(crate) struct Violations {
    entries: BTreeMap<String, String>,
}

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a violation, concatenating with `"; "` when the field already
    /// has one.
    pub(crate) fn add(&mut self, field: &str, message: &str) {
        self.entries
            .entry(field.to_owned())
            .and_modify(|existing| {
                existing.push_str("; ");
                existing.push_str(message);
            })
            .or_insert_with(|| message.to_owned());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into a validation failure, or `Ok` when nothing was recorded.
    pub(crate) fn into_result(self) -> Result<(), Error> {
        if self.entries.is_empty() {
            Ok(())
        } else {
            Err(Error::validation_failed(self.entries))
        }
    }
}

/// Limits count characters, not bytes, so multi-byte names are not
/// penalised.
fn length(value: &str) -> usize {
    value.chars().count()
}

pub(crate) fn require_username(violations: &mut Violations, username: Option<&str>) {
    match username {
        None => violations.add("username", "Username is required"),
        Some(username) => {
            if username.trim().is_empty() {
                violations.add("username", "Username is required");
            }
            check_username_length(violations, username);
        }
    }
}

pub(crate) fn check_username_length(violations: &mut Violations, username: &str) {
    let len = length(username);
    if !(3..=50).contains(&len) {
        violations.add("username", "Username must be between 3 and 50 characters");
    }
}

pub(crate) fn require_email(violations: &mut Violations, email: Option<&str>) {
    match email {
        None => violations.add("email", "Email is required"),
        Some(email) if email.trim().is_empty() => violations.add("email", "Email is required"),
        Some(email) => check_email_syntax(violations, email),
    }
}

pub(crate) fn check_email_syntax(violations: &mut Violations, email: &str) {
    if !email.is_empty() && !email_regex().is_match(email) {
        violations.add("email", "Email must be valid");
    }
}

pub(crate) fn require_name(violations: &mut Violations, name: Option<&str>) {
    match name {
        None => violations.add("name", "Name is required"),
        Some(name) => {
            if name.trim().is_empty() {
                violations.add("name", "Name is required");
            }
            check_name_length(violations, name);
        }
    }
}

pub(crate) fn check_name_length(violations: &mut Violations, name: &str) {
    if length(name) > 100 {
        violations.add("name", "Name must not exceed 100 characters");
    }
}

pub(crate) fn require_title(violations: &mut Violations, title: Option<&str>) {
    match title {
        None => violations.add("title", "Title is required"),
        Some(title) => {
            if title.trim().is_empty() {
                violations.add("title", "Title is required");
            }
            check_title_length(violations, title);
        }
    }
}

pub(crate) fn check_title_length(violations: &mut Violations, title: &str) {
    if length(title) > 200 {
        violations.add("title", "Title must not exceed 200 characters");
    }
}

pub(crate) fn check_description_length(violations: &mut Violations, description: &str) {
    if length(description) > 1000 {
        violations.add("description", "Description must not exceed 1000 characters");
    }
}

/// Validate pagination parameters: page must be non-negative and size at
/// least one.
pub(crate) fn validate_page_params(page: i64, size: i64) -> Result<(u32, u32), Error> {
    let mut violations = Violations::new();
    if page < 0 {
        violations.add("page", "must be greater than or equal to 0");
    }
    if size < 1 {
        violations.add("size", "must be greater than or equal to 1");
    }
    violations.into_result()?;

    let page = u32::try_from(page).map_err(|_| {
        Error::validation_failed(BTreeMap::from([(
            "page".to_owned(),
            "must be a valid page number".to_owned(),
        )]))
    })?;
    let size = u32::try_from(size).map_err(|_| {
        Error::validation_failed(BTreeMap::from([(
            "size".to_owned(),
            "must be a valid page size".to_owned(),
        )]))
    })?;
    Ok((page, size))
}

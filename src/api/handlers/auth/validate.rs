//! Field validators, each returns the list of problems found so callers can
//! report every failure at once instead of the first one.

use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").unwrap_or_else(|err| panic!("invalid username regex: {err}"))
});

// Simplified on purpose, deliverability is confirmed by the verification code.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .unwrap_or_else(|err| panic!("invalid email regex: {err}"))
});

#[must_use]
pub fn validate_username(username: &str) -> Vec<String> {
    let mut problems = Vec::new();

    let length = username.chars().count();
    if !(3..=20).contains(&length) {
        problems.push("Username must be between 3 and 20 characters".to_string());
    }

    if !USERNAME_RE.is_match(username) {
        problems.push("Username may only contain letters, numbers and underscores".to_string());
    }

    problems
}

#[must_use]
pub fn validate_email(email: &str) -> Vec<String> {
    if EMAIL_RE.is_match(email) {
        Vec::new()
    } else {
        vec!["Invalid email address".to_string()]
    }
}

#[must_use]
pub fn validate_password(password: &str) -> Vec<String> {
    let mut problems = Vec::new();

    let length = password.chars().count();
    if !(8..=50).contains(&length) {
        problems.push("Password must be between 8 and 50 characters".to_string());
    }

    if !password.chars().any(char::is_uppercase) {
        problems.push("Password must contain an uppercase letter".to_string());
    }

    if !password.chars().any(char::is_lowercase) {
        problems.push("Password must contain a lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain a digit".to_string());
    }

    if !password.chars().any(|c| !c.is_alphanumeric()) {
        problems.push("Password must contain a special character".to_string());
    }

    problems
}

#[must_use]
pub fn validate_content(content: &str) -> Vec<String> {
    let length = content.chars().count();

    if !(3..=500).contains(&length) {
        vec!["Message must be between 3 and 500 characters".to_string()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("alice_01").is_empty());
        assert!(!validate_username("ab").is_empty());
        assert!(!validate_username("a".repeat(21).as_str()).is_empty());
        assert!(!validate_username("al ice").is_empty());
        assert!(!validate_username("al-ice").is_empty());
    }

    #[test]
    fn username_empty_reports_both_problems() {
        let problems = validate_username("");
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("a@b.dev").is_empty());
        assert!(!validate_email("a@b").is_empty());
        assert!(!validate_email("not an email").is_empty());
        assert!(!validate_email("").is_empty());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Str0ng!pass").is_empty());
        assert!(!validate_password("short").is_empty());
        assert!(!validate_password("alllowercase1!").is_empty());
        assert!(!validate_password("ALLUPPERCASE1!").is_empty());
        assert!(!validate_password("NoDigits!!").is_empty());
        assert!(!validate_password("NoSpecial11").is_empty());
        assert!(!validate_password(format!("Aa1!{}", "x".repeat(50)).as_str()).is_empty());
    }

    #[test]
    fn content_rules() {
        assert!(validate_content("hey").is_empty());
        assert!(!validate_content("hi").is_empty());
        assert!(!validate_content("x".repeat(501).as_str()).is_empty());
        assert!(validate_content("x".repeat(500).as_str()).is_empty());
    }
}

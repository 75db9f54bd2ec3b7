use std::sync::OnceLock;

use regex::Regex;
use validator::ValidateEmail;

use roost_types::api::{AccountDeletionForm, LoginForm, SignupForm};

/// Usernames that invite impersonation are refused outright.
const RESERVED_USERNAMES: [&str; 2] = ["admin", "pakapaka"];

/// Minimum estimated password entropy in bits. Roughly "a 10-character
/// mixed-case password" or "a 13-character lowercase one". A strength
/// floor, not a bare length check.
const MIN_PASSWORD_BITS: f64 = 40.0;

fn username_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9A-Za-z_]+$").expect("static regex"))
}

/// Estimated entropy of a password: length times log2 of the alphabet
/// implied by the character classes actually used.
pub fn password_bits(password: &str) -> f64 {
    if password.is_empty() {
        return 0.0;
    }

    let mut alphabet = 0usize;
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        alphabet += 26;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        alphabet += 26;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        alphabet += 10;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        alphabet += 33;
    }

    password.chars().count() as f64 * (alphabet as f64).log2()
}

/// All signup rules, evaluated together so the user sees every problem at
/// once. Duplicate checks are passed in by the handler, which owns the
/// store lookups.
pub fn validate_signup(
    form: &SignupForm,
    email_taken: bool,
    username_taken: bool,
) -> Vec<String> {
    let mut errors = Vec::new();

    let name_len = form.name.chars().count();
    if !(3..=50).contains(&name_len) {
        errors.push("Name must be between 3 and 50 characters".to_string());
    }

    let username_len = form.username.chars().count();
    if !(5..=20).contains(&username_len) {
        errors.push("Username must be between 5 and 20 characters".to_string());
    } else if !username_re().is_match(&form.username) {
        errors.push("Username may only contain letters, digits and underscores".to_string());
    }

    let lowered = form.username.to_lowercase();
    if RESERVED_USERNAMES.iter().any(|r| lowered.contains(r)) {
        errors.push("That username is not available".to_string());
    }

    if !form.email.validate_email() {
        errors.push("Enter a valid email address".to_string());
    }

    if password_bits(&form.password) < MIN_PASSWORD_BITS {
        errors.push("Password is too weak".to_string());
    }

    if form.confirm != form.password {
        errors.push("Passwords did not match".to_string());
    }

    if form.agree_to_tos.is_none() {
        errors.push("You must agree to the terms of service".to_string());
    }

    if email_taken {
        errors.push("That email address is already registered".to_string());
    }

    if username_taken {
        errors.push("That username is already in use".to_string());
    }

    errors
}

pub fn validate_login(form: &LoginForm) -> Vec<String> {
    let mut errors = Vec::new();
    if form.email.trim().is_empty() {
        errors.push("Enter your email address".to_string());
    }
    if form.password.is_empty() {
        errors.push("Enter your password".to_string());
    }
    errors
}

pub fn validate_deletion(form: &AccountDeletionForm) -> Vec<String> {
    let mut errors = Vec::new();
    if form.email.trim().is_empty() {
        errors.push("Enter your email address".to_string());
    }
    if form.password.is_empty() {
        errors.push("Enter your password".to_string());
    }
    errors
}

/// Posts and comments: non-empty after trimming.
pub fn validate_text(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        vec!["Enter some text".to_string()]
    } else {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> SignupForm {
        SignupForm {
            name: "Alice Example".to_string(),
            username: "alice_01".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct-horse-battery".to_string(),
            confirm: "correct-horse-battery".to_string(),
            agree_to_tos: Some("on".to_string()),
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert!(validate_signup(&valid_form(), false, false).is_empty());
    }

    #[test]
    fn reserved_usernames_rejected_case_insensitively() {
        for username in ["admin", "site_Admin", "ADMINfan", "pakapaka", "PakaPaka_9"] {
            let mut form = valid_form();
            form.username = username.to_string();
            let errors = validate_signup(&form, false, false);
            assert!(
                errors.iter().any(|e| e.contains("not available")),
                "{username} should be refused"
            );
        }
    }

    #[test]
    fn username_length_and_charset_enforced() {
        let mut form = valid_form();
        form.username = "abcd".to_string();
        assert!(!validate_signup(&form, false, false).is_empty());

        form.username = "a".repeat(21);
        assert!(!validate_signup(&form, false, false).is_empty());

        form.username = "has space1".to_string();
        assert!(!validate_signup(&form, false, false).is_empty());

        form.username = "ok_name_99".to_string();
        assert!(validate_signup(&form, false, false).is_empty());
    }

    #[test]
    fn name_length_enforced() {
        let mut form = valid_form();
        form.name = "ab".to_string();
        assert!(!validate_signup(&form, false, false).is_empty());

        form.name = "a".repeat(51);
        assert!(!validate_signup(&form, false, false).is_empty());
    }

    #[test]
    fn weak_passwords_rejected() {
        let mut form = valid_form();
        for weak in ["short1", "aaaaaaa", "12345678"] {
            form.password = weak.to_string();
            form.confirm = weak.to_string();
            let errors = validate_signup(&form, false, false);
            assert!(errors.iter().any(|e| e.contains("too weak")), "{weak}");
        }

        // Long lowercase or shorter mixed-class passwords clear the bar.
        for ok in ["thirteenlowercase", "Short3r-Mix3d"] {
            form.password = ok.to_string();
            form.confirm = ok.to_string();
            assert!(validate_signup(&form, false, false).is_empty(), "{ok}");
        }
    }

    #[test]
    fn confirm_must_match() {
        let mut form = valid_form();
        form.confirm = "something-else-entirely".to_string();
        let errors = validate_signup(&form, false, false);
        assert!(errors.iter().any(|e| e.contains("did not match")));
    }

    #[test]
    fn tos_agreement_required() {
        let mut form = valid_form();
        form.agree_to_tos = None;
        let errors = validate_signup(&form, false, false);
        assert!(errors.iter().any(|e| e.contains("terms of service")));
    }

    #[test]
    fn bad_email_rejected() {
        let mut form = valid_form();
        form.email = "not-an-email".to_string();
        assert!(!validate_signup(&form, false, false).is_empty());
    }

    #[test]
    fn duplicates_are_validation_failures() {
        let errors = validate_signup(&valid_form(), true, true);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn text_must_be_non_empty() {
        assert!(!validate_text("   ").is_empty());
        assert!(!validate_text("").is_empty());
        assert!(validate_text("hello").is_empty());
    }
}

//! Username and password format rules.
//!
//! Usernames: 1 to 50 characters from ASCII letters, digits and underscore.
//! Passwords: 6 to 49 characters from ASCII letters, digits and punctuation.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;

static USERNAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

// Printable ASCII without space: letters, digits and punctuation (underscore included).
static PASSWORD_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\x21-\x7E]+$").unwrap());

#[derive(Validate)]
struct UsernameInput<'a> {
    #[validate(length(min = 1, max = 50), regex = "USERNAME_CHARS")]
    username: &'a str,
}

#[derive(Validate)]
struct PasswordInput<'a> {
    // Longest accepted password is 49 characters.
    #[validate(length(min = 6, max = 49), regex = "PASSWORD_CHARS")]
    password: &'a str,
}

pub fn check_username_validity(username: &str) -> bool {
    UsernameInput { username }.validate().is_ok()
}

pub fn check_password_validity(password: &str) -> bool {
    PasswordInput { password }.validate().is_ok()
}

/// Rejects with `InvalidInput` when the username breaks the format rules.
pub fn require_valid_username(username: &str) -> Result<()> {
    if check_username_validity(username) {
        Ok(())
    } else {
        Err(Error::InvalidInput("Invalid username".to_owned()))
    }
}

/// Rejects with `InvalidInput(message)` when the password breaks the format rules.
pub fn require_valid_password(password: &str, message: &str) -> Result<()> {
    if check_password_validity(password) {
        Ok(())
    } else {
        Err(Error::InvalidInput(message.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(check_username_validity("a"));
        assert!(check_username_validity("Mod_42"));
        assert!(check_username_validity(&"x".repeat(50)));

        assert!(!check_username_validity(""));
        assert!(!check_username_validity(&"x".repeat(51)));
        assert!(!check_username_validity("has space"));
        assert!(!check_username_validity("dash-name"));
        assert!(!check_username_validity("ünïcode"));
    }

    #[test]
    fn test_password_length_bounds() {
        assert!(!check_password_validity("12345"));
        assert!(check_password_validity("123456"));
        assert!(check_password_validity(&"p".repeat(49)));
        assert!(!check_password_validity(&"p".repeat(50)));
        assert!(!check_password_validity(""));
    }

    #[test]
    fn test_overlong_username_reported_on_field() {
        let long = "x".repeat(51);
        let errors = UsernameInput { username: &long }.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_password_character_set() {
        assert!(check_password_validity("pa$$w0rd!_~"));
        assert!(!check_password_validity("pass word"));
        assert!(!check_password_validity("pässword"));
        assert!(!check_password_validity("password\n"));
    }

    #[test]
    fn test_require_reports_invalid_input() {
        assert!(require_valid_username("bad name").unwrap_err().is_invalid_input());
        match require_valid_password("short", "Invalid new password") {
            Err(Error::InvalidInput(msg)) => assert_eq!(msg, "Invalid new password"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

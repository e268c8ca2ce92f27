use regex::Regex;

/// Syntactic email check, the same shape the sign-up form enforces.
pub fn is_valid_email(email: &str) -> bool {
    let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    email_regex.is_match(email) && email.len() <= 254
}

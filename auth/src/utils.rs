//! Input validation helpers.

/// Validate email address format.
///
/// Loose check: exactly one `@`, non-empty local part, and a dotted
/// domain with no empty labels. Whitespace is rejected anywhere.
///
/// # Examples
///
/// ```
/// use eventhub_auth::utils::is_valid_email;
///
/// assert!(is_valid_email("alice@example.com"));
/// assert!(is_valid_email("alice+events@mail.example.edu"));
/// assert!(!is_valid_email("alice"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("alice@localhost"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let mut labels = domain.split('.');
    let label_count = domain.split('.').count();
    label_count >= 2 && labels.all(|label| !label.is_empty())
}

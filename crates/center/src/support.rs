//! "Contact support" link.

use customercenter_core::{DomainError, DomainResult};

use crate::config::SupportConfig;

pub const DEFAULT_SUBJECT: &str = "Support Request";

/// Characters that would end the address part of a `mailto:` URL.
const URL_RESERVED: [char; 6] = ['?', '&', '#', '%', ',', '/'];

/// Check that `email` is a single plain address that can be pasted into a
/// `mailto:` URL as-is. Returns it trimmed.
pub(crate) fn support_email(email: &str) -> DomainResult<&str> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email
                    .chars()
                    .any(|c| c.is_whitespace() || c.is_control() || URL_RESERVED.contains(&c))
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::validation(format!("invalid support email {email:?}")));
    }
    Ok(email)
}

/// `mailto:` URL for the configured support address.
pub fn contact_support_url(
    support: &SupportConfig,
    subject: Option<&str>,
    body: Option<&str>,
) -> DomainResult<String> {
    let email = support_email(&support.email)?;

    let mut url = format!(
        "mailto:{email}?subject={}",
        urlencoding::encode(subject.unwrap_or(DEFAULT_SUBJECT))
    );
    if let Some(body) = body {
        url.push_str("&body=");
        url.push_str(&urlencoding::encode(body));
    }
    Ok(url)
}

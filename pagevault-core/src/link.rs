use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::errors::ValidationError;

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons";
const HOST_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-');

fn split_scheme(url: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = url.split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}

/// Host part of an absolute url, without userinfo or port.
pub fn host(url: &str) -> Option<&str> {
    let (_, rest) = split_scheme(url.trim())?;
    let authority = rest
        .split(|c| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    let authority = authority.rsplit('@').next().unwrap_or_default();
    let host = if authority.starts_with('[') {
        // ipv6 literal
        authority.split_inclusive(']').next().unwrap_or_default()
    } else {
        authority.split(':').next().unwrap_or_default()
    };
    (!host.is_empty()).then_some(host)
}

pub fn is_absolute_url(url: &str) -> bool {
    let url = url.trim();
    !url.chars().any(char::is_whitespace) && host(url).is_some()
}

pub fn validate_url(url: &str) -> Result<&str, ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::MissingUrl);
    }
    if !is_absolute_url(url) {
        return Err(ValidationError::InvalidUrl(url.to_string()));
    }
    Ok(url)
}

pub fn favicon_url(url: &str) -> Option<String> {
    let host = host(url)?;
    Some(format!(
        "{FAVICON_SERVICE}?domain={}&sz=128",
        utf8_percent_encode(host, HOST_SET)
    ))
}

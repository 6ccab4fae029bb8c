//! Share target: pages shared from other apps arrive as `title`, `text` and
//! `url` query parameters and become a bookmark draft.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use pagevault_types::CreateBookmark;

use crate::link;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedLink {
    pub title: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
}

fn decode(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    percent_decode_str(&raw).decode_utf8_lossy().into_owned()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl SharedLink {
    /// Parse an `application/x-www-form-urlencoded` query string. Unknown keys
    /// are ignored; later duplicates win.
    pub fn from_query(query: &str) -> Self {
        let mut rv = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match decode(key).as_str() {
                "title" => &mut rv.title,
                "text" => &mut rv.text,
                "url" => &mut rv.url,
                _ => continue,
            };
            *slot = Some(decode(value));
        }
        rv
    }

    /// Url of the shared page: the `url` field, else the first absolute
    /// http(s) url found in `text`.
    pub fn page_url(&self) -> Option<String> {
        if let Some(url) = non_empty(&self.url) {
            return Some(url.to_string());
        }
        non_empty(&self.text)?
            .split_whitespace()
            .find(|word| {
                (word.starts_with("http://") || word.starts_with("https://"))
                    && link::is_absolute_url(word)
            })
            .map(ToString::to_string)
    }

    /// Draft for the composer. The title falls back to the shared text
    /// without the url, then to the page host.
    pub fn into_draft(self) -> CreateBookmark {
        let url = self.page_url().unwrap_or_default();
        let title = non_empty(&self.title)
            .map(ToString::to_string)
            .or_else(|| {
                let text = non_empty(&self.text)?
                    .split_whitespace()
                    .filter(|word| *word != url)
                    .collect::<Vec<_>>()
                    .join(" ");
                (!text.is_empty()).then_some(text)
            })
            .or_else(|| link::host(&url).map(ToString::to_string))
            .unwrap_or_default();
        CreateBookmark {
            title,
            url,
            tags: vec![],
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use pagevault_types::Bookmark;

pub const UNTAGGED: &str = "untagged";

/// Key of a group in the aggregated view.
///
/// `Untagged` is its own key, so a tag that happens to be named "untagged"
/// gets a separate bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Untagged,
    Tagged(String),
}

impl Bucket {
    pub fn name(&self) -> &str {
        match self {
            Bucket::Untagged => UNTAGGED,
            Bucket::Tagged(name) => name,
        }
    }

    pub fn is_untagged(&self) -> bool {
        matches!(self, Bucket::Untagged)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Bucket {
    fn from(name: &str) -> Self {
        Bucket::Tagged(name.to_string())
    }
}

pub type Buckets = BTreeMap<Bucket, Vec<Bookmark>>;

/// Group bookmarks by tag, keeping the input order inside every bucket.
///
/// The input is expected newest first. A bookmark lands in the bucket of each
/// of its tags, or in [`Bucket::Untagged`] when it has none.
pub fn aggregate<'a, I>(bookmarks: I) -> Buckets
where
    I: IntoIterator<Item = &'a Bookmark>,
{
    let mut buckets = Buckets::new();
    for bookmark in bookmarks {
        if bookmark.tags.is_empty() {
            buckets
                .entry(Bucket::Untagged)
                .or_default()
                .push(bookmark.clone());
            continue;
        }
        for tag in bookmark.tags.iter().unique() {
            buckets
                .entry(Bucket::Tagged(tag.clone()))
                .or_default()
                .push(bookmark.clone());
        }
    }
    buckets
}

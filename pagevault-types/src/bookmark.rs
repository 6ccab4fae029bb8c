use serde::{Deserialize, Serialize};

pub type BookmarkId = i32;

// API Response Types
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Bookmark {
    pub id: BookmarkId,
    pub title: String,
    pub url: String,
    pub visits: i32,
    /// Normalized tag names, ascending.
    pub tags: Vec<String>,
    #[cfg_attr(feature = "utoipa", schema(format = DateTime, value_type=String))]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

#[derive(Serialize, Deserialize, Default, PartialEq, Eq, Debug, Clone)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct CreateBookmark {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validated insert payload, handed to the store as is.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[cfg_attr(feature = "diesel", derive(diesel::Insertable))]
#[cfg_attr(feature = "diesel", diesel(table_name = crate::bookmarks))]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
}

// Database Model Types
#[cfg(feature = "diesel")]
pub mod db {
    use diesel::prelude::*;

    #[derive(
        Queryable,
        Selectable,
        Identifiable,
        Hash,
        PartialEq,
        Eq,
        Debug,
        Clone,
    )]
    #[diesel(table_name = crate::bookmarks)]
    #[diesel(check_for_backend(diesel::pg::Pg))]
    pub struct Bookmark {
        pub id: i32,
        pub title: String,
        pub url: String,
        pub visits: i32,
        pub created_at: time::OffsetDateTime,
    }

    impl Bookmark {
        pub fn with_tags(self, tags: Vec<String>) -> super::Bookmark {
            super::Bookmark {
                id: self.id,
                title: self.title,
                url: self.url,
                visits: self.visits,
                tags,
                created_at: self.created_at,
            }
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::bookmark::BookmarkId;

pub type TagId = i32;

#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable, diesel::Selectable))]
#[cfg_attr(feature = "diesel", diesel(table_name = crate::tags))]
#[cfg_attr(feature = "diesel", diesel(check_for_backend(diesel::pg::Pg)))]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ResolveTag {
    pub name: String,
}

/// Link between one bookmark and one tag.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
#[cfg_attr(feature = "diesel", derive(diesel::Insertable))]
#[cfg_attr(feature = "diesel", diesel(table_name = crate::bookmarks_tags))]
pub struct BookmarkTag {
    pub bookmark_id: BookmarkId,
    pub tag_id: TagId,
}

// Database Model Types
#[cfg(feature = "diesel")]
pub mod db {
    use diesel::prelude::*;

    #[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
    #[diesel(table_name = crate::tags)]
    #[diesel(check_for_backend(diesel::pg::Pg))]
    pub struct Tag {
        pub id: i32,
        pub name: String,
        pub created_at: time::OffsetDateTime,
    }

    #[derive(Identifiable, Selectable, Queryable, Associations, Debug)]
    #[diesel(belongs_to(crate::bookmark::db::Bookmark))]
    #[diesel(belongs_to(Tag))]
    #[diesel(table_name = crate::bookmarks_tags)]
    #[diesel(primary_key(bookmark_id, tag_id))]
    pub struct BookmarkTag {
        pub bookmark_id: i32,
        pub tag_id: i32,
    }

    #[derive(Insertable, Debug, Clone)]
    #[diesel(table_name = crate::tags)]
    pub struct NewTag<'a> {
        pub name: &'a str,
    }
}

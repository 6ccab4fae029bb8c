use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::{AsyncPgConnection as Connection, RunQueryDsl};
use tracing::{debug, error};

use pagevault_core::{Backend, BackendError, Order};
use pagevault_types::schema::{bookmarks, bookmarks_tags, tags};
use pagevault_types::{bookmark, tag, Bookmark, BookmarkId, BookmarkTag, NewBookmark, Tag};

mod functions {
    use diesel::sql_types::{Integer, Nullable};

    diesel::define_sql_function! {
        /// `increment_visits(bookmark_id)` stored procedure, NULL for unknown ids.
        fn increment_visits(bookmark_id: Integer) -> Nullable<Integer>;
    }
}

fn map_error(table: &'static str) -> impl Fn(DieselError) -> BackendError {
    move |e| match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            BackendError::DuplicationError {
                table: table.to_string(),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            BackendError::ViolationError()
        }
        e => {
            error!(table, ?e, "query failed");
            BackendError::Unavailable(e.to_string())
        }
    }
}

/// [`Backend`] over one PostgreSQL connection, pooled or standalone.
pub struct PgBackend<'a> {
    conn: &'a mut Connection,
}

impl<'a> PgBackend<'a> {
    pub fn new(conn: &'a mut Connection) -> Self {
        Self { conn }
    }

    async fn tags_of(
        &mut self,
        rows: Vec<bookmark::db::Bookmark>,
    ) -> Result<Vec<Bookmark>, BackendError> {
        let links = tag::db::BookmarkTag::belonging_to(&rows)
            .inner_join(tags::table)
            .select((tag::db::BookmarkTag::as_select(), tag::db::Tag::as_select()))
            .order_by(tags::name.asc())
            .load::<(tag::db::BookmarkTag, tag::db::Tag)>(self.conn)
            .await
            .map_err(map_error("bookmarks_tags"))?;

        Ok(links
            .grouped_by(&rows)
            .into_iter()
            .zip(rows)
            .map(|(links, row)| row.with_tags(links.into_iter().map(|(_, t)| t.name).collect()))
            .collect())
    }
}

impl Backend for PgBackend<'_> {
    async fn insert_bookmark(&mut self, new: &NewBookmark) -> Result<Bookmark, BackendError> {
        let row = diesel::insert_into(bookmarks::table)
            .values(new)
            .returning(bookmark::db::Bookmark::as_returning())
            .get_result(self.conn)
            .await
            .map_err(map_error("bookmarks"))?;
        Ok(row.with_tags(vec![]))
    }

    async fn select_bookmarks(&mut self, order: Order) -> Result<Vec<Bookmark>, BackendError> {
        let query = bookmarks::table
            .select(bookmark::db::Bookmark::as_select())
            .into_boxed();
        let query = match order {
            Order::Desc => query.order_by((bookmarks::created_at.desc(), bookmarks::id.desc())),
            Order::Asc => query.order_by((bookmarks::created_at.asc(), bookmarks::id.asc())),
        };
        let rows = query
            .load(self.conn)
            .await
            .map_err(map_error("bookmarks"))?;
        debug!(count = rows.len(), ?order, "bookmarks selected");
        self.tags_of(rows).await
    }

    async fn find_bookmark(&mut self, id: BookmarkId) -> Result<Option<Bookmark>, BackendError> {
        let row = bookmarks::table
            .find(id)
            .select(bookmark::db::Bookmark::as_select())
            .first(self.conn)
            .await
            .optional()
            .map_err(map_error("bookmarks"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.tags_of(vec![row]).await?.pop())
    }

    async fn delete_bookmark(&mut self, id: BookmarkId) -> Result<usize, BackendError> {
        diesel::delete(bookmarks::table.find(id))
            .execute(self.conn)
            .await
            .map_err(map_error("bookmarks"))
    }

    async fn find_tag(&mut self, name: &str) -> Result<Option<Tag>, BackendError> {
        tags::table
            .filter(tags::name.eq(name))
            .select(Tag::as_select())
            .first(self.conn)
            .await
            .optional()
            .map_err(map_error("tags"))
    }

    async fn insert_tag(&mut self, name: &str) -> Result<Tag, BackendError> {
        diesel::insert_into(tags::table)
            .values(tag::db::NewTag { name })
            .returning(Tag::as_returning())
            .get_result(self.conn)
            .await
            .map_err(map_error("tags"))
    }

    async fn select_tags(&mut self) -> Result<Vec<Tag>, BackendError> {
        tags::table
            .select(Tag::as_select())
            .order_by(tags::name.asc())
            .load(self.conn)
            .await
            .map_err(map_error("tags"))
    }

    async fn insert_association(&mut self, link: BookmarkTag) -> Result<(), BackendError> {
        diesel::insert_into(bookmarks_tags::table)
            .values(link)
            .on_conflict_do_nothing()
            .execute(self.conn)
            .await
            .map(|_| ())
            .map_err(map_error("bookmarks_tags"))
    }

    async fn delete_associations(&mut self, bookmark_id: BookmarkId) -> Result<usize, BackendError> {
        diesel::delete(bookmarks_tags::table.filter(bookmarks_tags::bookmark_id.eq(bookmark_id)))
            .execute(self.conn)
            .await
            .map_err(map_error("bookmarks_tags"))
    }

    async fn increment_visits(&mut self, id: BookmarkId) -> Result<Option<i32>, BackendError> {
        diesel::select(functions::increment_visits(id))
            .get_result::<Option<i32>>(self.conn)
            .await
            .map_err(map_error("bookmarks"))
    }
}

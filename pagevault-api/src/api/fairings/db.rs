use diesel::connection::InstrumentationEvent;
use diesel_async::{
    pooled_connection::{
        deadpool::{BuildError, Object, Pool, PoolError},
        AsyncDieselConnectionManager,
    },
    AsyncConnection, AsyncPgConnection,
};
use rocket::figment::Figment;
use rocket_db_pools::{Database, Error};

pub type InitError = BuildError;
pub type GetError = PoolError;
pub type Connection = AsyncPgConnection;

/// Deadpool of diesel-async PostgreSQL connections, managed by rocket.
pub struct DBPool(Pool<Connection>);

#[rocket::async_trait]
impl rocket_db_pools::Pool for DBPool {
    type Connection = Object<Connection>;

    type Error = Error<InitError, GetError>;

    async fn init(figment: &Figment) -> Result<Self, Self::Error> {
        let url = figment.extract_inner::<String>("url").map_err(Error::Config)?;
        let max_size = figment
            .extract_inner::<usize>("max_connections")
            .unwrap_or(16);
        let config = AsyncDieselConnectionManager::<Connection>::new(url);
        Pool::builder(config)
            .max_size(max_size)
            .build()
            .map(Self)
            .map_err(Error::Init)
    }

    async fn get(&self) -> Result<Self::Connection, Self::Error> {
        let mut conn = self.0.get().await.map_err(Error::Get)?;
        conn.set_instrumentation(trace_queries);
        Ok(conn)
    }

    async fn close(&self) {
        self.0.close()
    }
}

pub(crate) fn trace_queries(event: InstrumentationEvent<'_>) {
    match event {
        InstrumentationEvent::StartQuery { query, .. } => {
            tracing::debug!("Executing query: {}", query);
        }
        InstrumentationEvent::FinishQuery { query, error, .. } => match error {
            Some(e) => tracing::error!("Query failed: {}\nError: {:?}", query, e),
            None => tracing::debug!("Executing query succeeded: {}", query),
        },
        _ => {}
    }
}

#[derive(Database)]
#[database("main")]
pub struct Db(DBPool);

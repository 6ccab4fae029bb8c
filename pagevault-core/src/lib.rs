pub mod aggregate;
pub mod association;
pub mod backend;
pub mod bookmark;
pub mod errors;
pub mod link;
pub mod resolver;
pub mod router;
pub mod selection;
pub mod share;
pub mod shelf;
mod utils;

pub use aggregate::{aggregate, Bucket, Buckets, UNTAGGED};
pub use association::{associate, dissociate_all, link_tags, AssociationReport};
pub use backend::{Backend, MemoryBackend, Order};
pub use bookmark::{add_bookmark, delete_bookmark, list_bookmarks, record_visit, Submission};
pub use errors::{BackendError, Error, ValidationError};
pub use resolver::{get_or_create_tag, normalize_tag, resolve_tag, resolve_tags};
pub use router::{AuthEvent, Route, Router};
pub use selection::SelectionState;
pub use share::SharedLink;
pub use shelf::Shelf;

#[cfg(test)]
#[cfg(not(tarpaulin_include))]
#[ctor::ctor]
fn init() {
    use std::io;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let console_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stdout)
        .boxed();

    tracing_subscriber::registry()
        .with(vec![console_log])
        .with(EnvFilter::from_default_env())
        .init();
}

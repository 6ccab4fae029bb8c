//! Hash based view routing.
//!
//! The fragment of the page url picks the view. Signed out users always land
//! on the sign in view, whatever the fragment says.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::share::SharedLink;

const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Route {
    #[default]
    SignIn,
    Bookmarks,
    Share(SharedLink),
}

impl Route {
    /// Parse a location fragment such as `#bookmarks` or `#/share?url=..`.
    /// Unknown fragments fall back to the sign in view.
    pub fn from_hash(hash: &str) -> Self {
        let hash = hash.trim_start_matches('#').trim_start_matches('/');
        let (path, query) = hash.split_once('?').unwrap_or((hash, ""));
        match path {
            "bookmarks" => Route::Bookmarks,
            "share" => Route::Share(SharedLink::from_query(query)),
            _ => Route::SignIn,
        }
    }

    /// Inverse of [`Route::from_hash`]. Shared fields are kept in the query.
    pub fn to_hash(&self) -> String {
        match self {
            Route::SignIn => "#".to_string(),
            Route::Bookmarks => "#bookmarks".to_string(),
            Route::Share(link) => {
                let query = [
                    ("title", &link.title),
                    ("text", &link.text),
                    ("url", &link.url),
                ]
                .into_iter()
                .filter_map(|(key, value)| {
                    let value = value.as_deref()?;
                    Some(format!("{key}={}", utf8_percent_encode(value, QUERY_SET)))
                })
                .collect::<Vec<_>>();
                if query.is_empty() {
                    "#share".to_string()
                } else {
                    format!("#share?{}", query.join("&"))
                }
            }
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::SignIn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
}

#[derive(Debug, Default)]
pub struct Router {
    route: Route,
    authenticated: bool,
    /// Route asked for while signed out, shown after signing in.
    pending: Option<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Follow a fragment change. Returns the route actually shown.
    pub fn navigate(&mut self, hash: &str) -> &Route {
        let route = Route::from_hash(hash);
        self.route = if route.requires_auth() && !self.authenticated {
            debug!(hash, "not signed in, staying on sign in");
            self.pending = Some(route);
            Route::SignIn
        } else {
            self.pending = None;
            route
        };
        &self.route
    }

    /// Signing in opens the route blocked while signed out, else keeps a
    /// shown share, else opens the bookmark list. Signing out always returns
    /// to the sign in view.
    pub fn on_auth(&mut self, event: AuthEvent) -> &Route {
        info!(?event, "auth state changed");
        match event {
            AuthEvent::SignedIn => {
                self.authenticated = true;
                if let Some(route) = self.pending.take() {
                    self.route = route;
                } else if !matches!(self.route, Route::Share(_)) {
                    self.route = Route::Bookmarks;
                }
            }
            AuthEvent::SignedOut => {
                self.authenticated = false;
                self.pending = None;
                self.route = Route::SignIn;
            }
        }
        &self.route
    }

    /// Apply auth events until the sender side closes, publishing every
    /// resulting route.
    pub async fn drive(mut self, mut events: mpsc::Receiver<AuthEvent>, routes: watch::Sender<Route>) -> Self {
        while let Some(event) = events.recv().await {
            let route = self.on_auth(event).clone();
            routes.send_replace(route);
        }
        self
    }

    /// Run [`Router::drive`] on the current runtime.
    pub fn spawn(self) -> (mpsc::Sender<AuthEvent>, watch::Receiver<Route>, JoinHandle<Self>) {
        let (tx, rx) = mpsc::channel(16);
        let (routes, watcher) = watch::channel(self.route.clone());
        let handle = tokio::spawn(self.drive(rx, routes));
        (tx, watcher, handle)
    }
}

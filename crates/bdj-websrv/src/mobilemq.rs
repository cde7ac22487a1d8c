//! Mobile marquee endpoints. No authentication: this surface only ever
//! shows what's already playing, never accepts a command.

use crate::uri::reject_forbidden_uris;
use axum::extract::State;
use axum::middleware;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// What a caller needs to supply to answer `/mmupdate`.
pub trait MarqueeSource: Send + Sync + 'static {
    fn current(&self) -> MarqueeSnapshot;
}

#[derive(Debug, Clone, Serialize)]
pub struct MarqueeSnapshot {
    pub artist: String,
    pub title: String,
    pub dance: String,
}

async fn mmupdate<S: MarqueeSource>(State(source): State<Arc<S>>) -> Json<MarqueeSnapshot> {
    Json(source.current())
}

/// `/mmupdate` plus a static file tree rooted at `http_dir`, falling back
/// to `mobilemq.html` for anything else (client-side routed app).
pub fn router<S: MarqueeSource>(source: Arc<S>, http_dir: PathBuf) -> Router {
    let fallback = ServeDir::new(&http_dir).fallback(tower_http::services::ServeFile::new(http_dir.join("mobilemq.html")));

    Router::new()
        .route("/mmupdate", get(mmupdate::<S>))
        .fallback_service(fallback)
        .with_state(source)
        .layer(middleware::from_fn(reject_forbidden_uris))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(MarqueeSnapshot);
    impl MarqueeSource for Fixed {
        fn current(&self) -> MarqueeSnapshot {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn mmupdate_returns_current_snapshot() {
        let source = Arc::new(Fixed(MarqueeSnapshot {
            artist: "Artist".into(),
            title: "Title".into(),
            dance: "Waltz".into(),
        }));
        let Json(snap) = mmupdate(State(source)).await;
        assert_eq!(snap.dance, "Waltz");
    }
}

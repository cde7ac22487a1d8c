//! Inter-host file server: lets one machine's library serve songs and
//! playlists to another host's player. TLS + Basic auth, realm `BDJ4`.

use crate::auth::{require_basic_auth, BasicAuthConfig};
use crate::uri::reject_forbidden_uris;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use bdj_proto::args::FIELD_SEP;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

pub trait FileServerSource: Send + Sync + 'static {
    fn playlist_names(&self) -> Vec<String>;
    /// Song URIs belonging to a playlist, in order.
    fn playlist_songs(&self, name: &str) -> Option<Vec<String>>;
    fn song_path(&self, uri: &str) -> Option<PathBuf>;
    /// `tag name -> value` pairs for a song, in whatever order the
    /// database stores them.
    fn song_tags(&self, uri: &str) -> Option<Vec<(String, String)>>;
}

#[derive(Debug, Deserialize)]
struct UriParam {
    uri: String,
}

fn record_separated(fields: impl IntoIterator<Item = String>) -> Vec<u8> {
    let mut buf = Vec::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            buf.push(FIELD_SEP);
        }
        buf.extend_from_slice(field.as_bytes());
    }
    buf
}

async fn echo() -> &'static str {
    "ok"
}

async fn plnames<S: FileServerSource>(State(src): State<Arc<S>>) -> Json<Vec<String>> {
    Json(src.playlist_names())
}

async fn plget<S: FileServerSource>(State(src): State<Arc<S>>, Query(q): Query<UriParam>) -> Response {
    match src.playlist_songs(&q.uri) {
        Some(songs) => record_separated(songs).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn songexists<S: FileServerSource>(State(src): State<Arc<S>>, Query(q): Query<UriParam>) -> StatusCode {
    if src.song_path(&q.uri).is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn songget<S: FileServerSource>(State(src): State<Arc<S>>, Query(q): Query<UriParam>) -> Response {
    let Some(path) = src.song_path(&q.uri) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::File::open(&path).await {
        Ok(file) => Body::from_stream(ReaderStream::new(file)).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn songtags<S: FileServerSource>(State(src): State<Arc<S>>, Query(q): Query<UriParam>) -> Response {
    match src.song_tags(&q.uri) {
        Some(tags) => {
            let fields = tags.into_iter().flat_map(|(k, v)| [k, v]);
            record_separated(fields).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn router<S: FileServerSource>(src: Arc<S>, auth: BasicAuthConfig) -> Router {
    Router::new()
        .route("/echo", get(echo))
        .route("/plnames", get(plnames::<S>))
        .route("/plget", get(plget::<S>))
        .route("/songexists", get(songexists::<S>))
        .route("/songget", get(songget::<S>))
        .route("/songtags", get(songtags::<S>))
        .with_state(src)
        .layer(middleware::from_fn_with_state(auth, require_basic_auth))
        .layer(middleware::from_fn(reject_forbidden_uris))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture;
    impl FileServerSource for Fixture {
        fn playlist_names(&self) -> Vec<String> {
            vec!["Favorites".into()]
        }
        fn playlist_songs(&self, name: &str) -> Option<Vec<String>> {
            (name == "Favorites").then(|| vec!["a.mp3".into(), "b.mp3".into()])
        }
        fn song_path(&self, uri: &str) -> Option<PathBuf> {
            (uri == "a.mp3").then(|| PathBuf::from("/music/a.mp3"))
        }
        fn song_tags(&self, uri: &str) -> Option<Vec<(String, String)>> {
            (uri == "a.mp3").then(|| vec![("ARTIST".to_string(), "Someone".to_string())])
        }
    }

    #[tokio::test]
    async fn plnames_lists_playlists() {
        let Json(names) = plnames(State(Arc::new(Fixture))).await;
        assert_eq!(names, vec!["Favorites".to_string()]);
    }

    #[tokio::test]
    async fn songexists_reports_404_for_unknown_uri() {
        let status = songexists(State(Arc::new(Fixture)), Query(UriParam { uri: "missing.mp3".into() })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn record_separated_joins_with_field_separator() {
        let buf = record_separated(["a".to_string(), "b".to_string()]);
        assert_eq!(buf, vec![b'a', FIELD_SEP, b'b']);
    }
}

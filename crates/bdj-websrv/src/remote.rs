//! Remote control endpoints. Every route requires Basic auth and
//! translates into one or more bus messages, dispatched through whatever
//! implements [`RemoteControl`] (the bus connection lives in the binary
//! that owns this router, not in this crate).

use crate::auth::{require_basic_auth, BasicAuthConfig};
use crate::uri::reject_forbidden_uris;
use axum::extract::{Query, State};
use axum::middleware;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub playing: bool,
    pub paused: bool,
    pub repeat: bool,
    pub volume: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrSongResponse {
    pub artist: String,
    pub title: String,
    pub dance: String,
}

pub trait RemoteControl: Send + Sync + 'static {
    fn play(&self);
    fn nextsong(&self);
    fn fade(&self);
    fn pauseatend(&self);
    fn repeat(&self);
    fn clear(&self);
    fn playlistclearplay(&self, name: &str);
    fn playlistqueue(&self, name: &str);
    fn queue(&self, uri: &str);
    fn queue5(&self, uri: &str);
    fn volume(&self, level: u8);
    fn volmute(&self);
    fn speed(&self, value: u8);

    fn status(&self) -> StatusResponse;
    fn curr_song(&self) -> CurrSongResponse;
    fn dance_list(&self) -> Vec<String>;
    fn playlist_sel(&self) -> Vec<String>;
}

#[derive(Debug, Deserialize)]
struct NameParam {
    name: String,
}

#[derive(Debug, Deserialize)]
struct UriParam {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct LevelParam {
    level: u8,
}

macro_rules! bare_action {
    ($fn_name:ident, $method:ident) => {
        async fn $fn_name<R: RemoteControl>(State(rc): State<Arc<R>>) -> &'static str {
            rc.$method();
            "ok"
        }
    };
}

bare_action!(play, play);
bare_action!(nextsong, nextsong);
bare_action!(fade, fade);
bare_action!(pauseatend, pauseatend);
bare_action!(repeat, repeat);
bare_action!(clear, clear);
bare_action!(volmute, volmute);

async fn playlistclearplay<R: RemoteControl>(State(rc): State<Arc<R>>, Query(q): Query<NameParam>) -> &'static str {
    rc.playlistclearplay(&q.name);
    "ok"
}

async fn playlistqueue<R: RemoteControl>(State(rc): State<Arc<R>>, Query(q): Query<NameParam>) -> &'static str {
    rc.playlistqueue(&q.name);
    "ok"
}

async fn queue<R: RemoteControl>(State(rc): State<Arc<R>>, Query(q): Query<UriParam>) -> &'static str {
    rc.queue(&q.uri);
    "ok"
}

async fn queue5<R: RemoteControl>(State(rc): State<Arc<R>>, Query(q): Query<UriParam>) -> &'static str {
    rc.queue5(&q.uri);
    "ok"
}

async fn volume<R: RemoteControl>(State(rc): State<Arc<R>>, Query(q): Query<LevelParam>) -> &'static str {
    rc.volume(q.level);
    "ok"
}

async fn speed<R: RemoteControl>(State(rc): State<Arc<R>>, Query(q): Query<HashMap<String, String>>) -> &'static str {
    if let Some(value) = q.get("value").and_then(|v| v.parse().ok()) {
        rc.speed(value);
    }
    "ok"
}

async fn getstatus<R: RemoteControl>(State(rc): State<Arc<R>>) -> Json<StatusResponse> {
    Json(rc.status())
}

async fn getcurrsong<R: RemoteControl>(State(rc): State<Arc<R>>) -> Json<CurrSongResponse> {
    Json(rc.curr_song())
}

async fn getdancelist<R: RemoteControl>(State(rc): State<Arc<R>>) -> Json<Vec<String>> {
    Json(rc.dance_list())
}

async fn getplaylistsel<R: RemoteControl>(State(rc): State<Arc<R>>) -> Json<Vec<String>> {
    Json(rc.playlist_sel())
}

pub fn router<R: RemoteControl>(rc: Arc<R>, auth: BasicAuthConfig) -> Router {
    Router::new()
        .route("/play", get(play::<R>))
        .route("/nextsong", get(nextsong::<R>))
        .route("/fade", get(fade::<R>))
        .route("/pauseatend", get(pauseatend::<R>))
        .route("/repeat", get(repeat::<R>))
        .route("/clear", get(clear::<R>))
        .route("/playlistclearplay", get(playlistclearplay::<R>))
        .route("/playlistqueue", get(playlistqueue::<R>))
        .route("/queue", get(queue::<R>))
        .route("/queue5", get(queue5::<R>))
        .route("/volume", get(volume::<R>))
        .route("/volmute", get(volmute::<R>))
        .route("/speed", get(speed::<R>))
        .route("/getstatus", get(getstatus::<R>))
        .route("/getcurrsong", get(getcurrsong::<R>))
        .route("/getdancelist", get(getdancelist::<R>))
        .route("/getplaylistsel", get(getplaylistsel::<R>))
        .with_state(rc)
        .layer(middleware::from_fn_with_state(auth, require_basic_auth))
        .layer(middleware::from_fn(reject_forbidden_uris))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl RemoteControl for Recorder {
        fn play(&self) {
            self.calls.lock().unwrap().push("play".into());
        }
        fn nextsong(&self) {}
        fn fade(&self) {}
        fn pauseatend(&self) {}
        fn repeat(&self) {}
        fn clear(&self) {}
        fn playlistclearplay(&self, _name: &str) {}
        fn playlistqueue(&self, _name: &str) {}
        fn queue(&self, uri: &str) {
            self.calls.lock().unwrap().push(format!("queue:{uri}"));
        }
        fn queue5(&self, _uri: &str) {}
        fn volume(&self, _level: u8) {}
        fn volmute(&self) {}
        fn speed(&self, _value: u8) {}
        fn status(&self) -> StatusResponse {
            StatusResponse {
                playing: true,
                paused: false,
                repeat: false,
                volume: 80,
            }
        }
        fn curr_song(&self) -> CurrSongResponse {
            CurrSongResponse {
                artist: "A".into(),
                title: "T".into(),
                dance: "D".into(),
            }
        }
        fn dance_list(&self) -> Vec<String> {
            vec!["Waltz".into()]
        }
        fn playlist_sel(&self) -> Vec<String> {
            vec![]
        }
    }

    #[tokio::test]
    async fn play_action_dispatches_to_remote_control() {
        let rc = Arc::new(Recorder::default());
        play(State(rc.clone())).await;
        assert_eq!(*rc.calls.lock().unwrap(), vec!["play".to_string()]);
    }

    #[tokio::test]
    async fn queue_passes_through_the_uri() {
        let rc = Arc::new(Recorder::default());
        queue(State(rc.clone()), Query(UriParam { uri: "song.mp3".into() })).await;
        assert_eq!(*rc.calls.lock().unwrap(), vec!["queue:song.mp3".to_string()]);
    }

    #[tokio::test]
    async fn status_reflects_recorder_state() {
        let rc = Arc::new(Recorder::default());
        let Json(status) = getstatus(State(rc)).await;
        assert!(status.playing);
        assert_eq!(status.volume, 80);
    }
}

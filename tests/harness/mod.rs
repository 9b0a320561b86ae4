//! Test harness: mock signaling server
//!
//! Serves the two signaling endpoints on an ephemeral port. `/config`
//! behavior is scripted per test; `/offer` records the posted body and
//! produces a real answer from an in-process answering peer, so the client
//! applies exactly what a live media server would have produced.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Scripted behavior of the `/config` endpoint
pub enum ConfigBehavior {
    /// Serve this JSON body
    Json(serde_json::Value),
    /// Serve a 200 with a body that is not JSON
    Malformed,
    /// Serve a 500
    ServerError,
}

pub struct ServerState {
    config: ConfigBehavior,
    offer_delay: Duration,
    offers: Mutex<Vec<serde_json::Value>>,
    answers: Mutex<Vec<String>>,
}

/// Mock signaling server bound to an ephemeral localhost port
pub struct MockSignalingServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    task: tokio::task::JoinHandle<()>,
}

impl MockSignalingServer {
    /// Start the server
    ///
    /// # Arguments
    ///
    /// * `config` - Scripted `/config` behavior
    /// * `offer_delay` - Artificial delay before `/offer` answers, for
    ///   tests that need to catch the client mid-exchange
    pub async fn start(config: ConfigBehavior, offer_delay: Duration) -> Self {
        let state = Arc::new(ServerState {
            config,
            offer_delay,
            offers: Mutex::new(Vec::new()),
            answers: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/config", get(config_handler))
            .route("/offer", post(offer_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state, task }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Offer bodies received so far
    pub async fn recorded_offers(&self) -> Vec<serde_json::Value> {
        self.state.offers.lock().await.clone()
    }

    /// Answer SDPs produced so far
    pub async fn recorded_answers(&self) -> Vec<String> {
        self.state.answers.lock().await.clone()
    }
}

impl Drop for MockSignalingServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn config_handler(State(state): State<Arc<ServerState>>) -> Response {
    match &state.config {
        ConfigBehavior::Json(body) => Json(body.clone()).into_response(),
        ConfigBehavior::Malformed => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            "this is not json",
        )
            .into_response(),
        ConfigBehavior::ServerError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn offer_handler(
    State(state): State<Arc<ServerState>>,
    Json(offer): Json<serde_json::Value>,
) -> Response {
    state.offers.lock().await.push(offer.clone());

    if !state.offer_delay.is_zero() {
        tokio::time::sleep(state.offer_delay).await;
    }

    let offer: RTCSessionDescription = match serde_json::from_value(offer) {
        Ok(offer) => offer,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    match answer_offer(offer).await {
        Ok(answer) => {
            state.answers.lock().await.push(answer.sdp.clone());
            Json(answer).into_response()
        }
        Err(error) => (StatusCode::INTERNAL_SERVER_ERROR, error).into_response(),
    }
}

/// Produce a real answer for the posted offer with a throwaway peer
async fn answer_offer(offer: RTCSessionDescription) -> Result<RTCSessionDescription, String> {
    let mut media_engine = MediaEngine::default();
    media_engine
        .register_default_codecs()
        .map_err(|e| e.to_string())?;
    let registry =
        register_default_interceptors(Registry::new(), &mut media_engine).map_err(|e| e.to_string())?;
    let api = APIBuilder::new()
        .with_media_engine(media_engine)
        .with_interceptor_registry(registry)
        .build();

    let pc = api
        .new_peer_connection(RTCConfiguration::default())
        .await
        .map_err(|e| e.to_string())?;

    pc.set_remote_description(offer)
        .await
        .map_err(|e| e.to_string())?;
    let answer = pc.create_answer(None).await.map_err(|e| e.to_string())?;

    let mut gathered = pc.gathering_complete_promise().await;
    pc.set_local_description(answer)
        .await
        .map_err(|e| e.to_string())?;
    let _ = gathered.recv().await;

    let local = pc
        .local_description()
        .await
        .ok_or_else(|| "no local description on answering peer".to_string())?;

    let _ = pc.close().await;
    Ok(local)
}

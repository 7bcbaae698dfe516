use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use futures::Future;
use serde_json::{Map, Value};
use warp::{http::StatusCode, Filter};

use crate::{
    api::wall::WallResponse,
    display::{DisplayController, DisplayState, ErrorKind, WallError},
    models::WebConfig,
};

/// Largest accepted `/wall` body
const MAX_BODY_LEN: u64 = 16 * 1024;

fn status_code(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Client => StatusCode::BAD_REQUEST,
        ErrorKind::Server => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reply(result: Result<DisplayState, WallError>) -> (WallResponse, StatusCode) {
    match result {
        Ok(state) => (WallResponse::success(state), StatusCode::OK),
        Err(error) => {
            warn!(%error, "wall update failed");
            (WallResponse::error(&error), status_code(error.kind()))
        }
    }
}

async fn update_wall(
    raw: Map<String, Value>,
    controller: Arc<DisplayController>,
) -> Result<impl warp::Reply, Infallible> {
    // Run on a separate task: a transition is never cancelled once started, even if the client
    // goes away
    let result = tokio::spawn(async move { controller.handle(&raw).await })
        .await
        .unwrap_or_else(|error| Err(error.into()));

    let (body, status) = reply(result);
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

async fn wall_state(controller: Arc<DisplayController>) -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&WallResponse::success(
        controller.state().await,
    )))
}

pub async fn bind(
    controller: Arc<DisplayController>,
    config: &WebConfig,
) -> Result<impl Future<Output = ()>, std::io::Error> {
    let controller = warp::any().map(move || controller.clone());

    let update = warp::path("wall")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_LEN))
        .and(warp::body::json())
        .and(controller.clone())
        .and_then(update_wall);

    let state = warp::path("wall")
        .and(warp::path::end())
        .and(warp::get())
        .and(controller)
        .and_then(wall_state);

    let address = SocketAddr::new(config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(address).await?;

    info!(address = %address, "wall server listening");

    Ok(warp::serve(
        update
            .or(state)
            .with(warp::filters::log::log("albumwall::web")),
    )
    .run_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener)))
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::{
        api::wall::ValidationError,
        display::DeviceError,
    };

    #[test]
    fn success_reply() {
        let (body, status) = reply(Ok(DisplayState::new()));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::to_value(&body).expect("failed to serialize reply"),
            serde_json::json!({
                "success": true,
                "message": "LED update succeeded!",
                "state": {"power": "off", "identity": null, "revision": 0},
            })
        );
    }

    #[test]
    fn client_error_reply() {
        let (body, status) = reply(Err(ValidationError::MissingStatus.into()));

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(&body).expect("failed to serialize reply"),
            serde_json::json!({
                "success": false,
                "error": "invalid request: missing ledStatus field",
                "kind": "client",
            })
        );
    }

    #[test]
    fn server_error_reply() {
        let error = DeviceError::from(io::Error::new(io::ErrorKind::NotFound, "no spidev"));
        let (_, status) = reply(Err(error.into()));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! WebSocket echo endpoint.
//!
//! # Responsibilities
//! - Complete the upgrade handshake on `GET /ws`
//! - Echo every text and binary message back to the sender
//! - Log connection lifecycle and received messages
//!
//! # Design Decisions
//! - Ping/pong handled by axum, not echoed
//! - A close frame or receive error ends the session

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};

use crate::http::request::RequestContext;
use crate::http::server::AppState;
use crate::observability::{DiagnosticLogger, Failure};

/// `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    context: RequestContext,
) -> Response {
    ws.on_upgrade(move |socket| echo(socket, state.logger, context))
}

async fn echo(mut socket: WebSocket, logger: DiagnosticLogger, context: RequestContext) {
    logger.info(Some(&context), "WebSocket connection established.");

    while let Some(received) = socket.recv().await {
        let message = match received {
            Ok(message) => message,
            Err(e) => {
                let failure = Failure::from_error(&e);
                logger.error(Some(&context), "WebSocket receive failed.", Some(&failure));
                break;
            }
        };

        let reply = match message {
            Message::Text(text) => {
                logger.info(Some(&context), &format!("WebSocket received: {:?}", text.as_str()));
                Message::Text(text)
            }
            Message::Binary(bytes) => {
                logger.info(Some(&context), &format!("WebSocket received {} bytes.", bytes.len()));
                Message::Binary(bytes)
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        if socket.send(reply).await.is_err() {
            break;
        }
    }

    logger.info(Some(&context), "WebSocket connection closed.");
}

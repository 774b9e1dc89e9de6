use crate::chart::{ChartCommand, ChartSession};
use crate::state::{AppState, WsMessage};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use portable_atomic::Ordering;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

type WsSender = SplitSink<WebSocket, Message>;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut benchmark_rx = state.benchmark_rx.clone();
    let mut notices = state.ws_tx.subscribe();

    let mut session = {
        let snap = benchmark_rx.borrow_and_update();
        ChartSession::create(&snap, state.config.cumulative_display_cap)
    };
    state.counters.ws_sessions.fetch_add(1, Ordering::Relaxed);

    // Initial render
    if !push_display(&mut sender, &session, &state).await {
        state.counters.ws_sessions.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    loop {
        tokio::select! {
            changed = benchmark_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let updated = {
                    let snap = benchmark_rx.borrow_and_update();
                    session.set_data(&snap)
                };
                if !updated {
                    continue;
                }
                tracing::debug!(session = %session.id(), generation = session.generation(), "benchmark swapped in");
                if !push_display(&mut sender, &session, &state).await {
                    break;
                }
            }

            notice = notices.recv() => match notice {
                Ok(msg) => {
                    if !send_json(&mut sender, &msg, &state).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(session = %session.id(), skipped, "notice stream lagged");
                }
                Err(RecvError::Closed) => break,
            },

            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let applied = serde_json::from_str::<ChartCommand>(text.as_str())
                        .map_err(|e| format!("invalid command: {e}"))
                        .and_then(|cmd| session.apply(cmd));
                    let ok = match applied {
                        Ok(()) => push_display(&mut sender, &session, &state).await,
                        Err(message) => send_json(&mut sender, &WsMessage::Error { message }, &state).await,
                    };
                    if !ok {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {} // Ignore binary/ping frames
            },
        }
    }

    state.counters.ws_sessions.fetch_sub(1, Ordering::Relaxed);
}

async fn push_display(sender: &mut WsSender, session: &ChartSession, state: &AppState) -> bool {
    let data = session.render(chrono::Utc::now());
    state.counters.displays_computed.fetch_add(1, Ordering::Relaxed);
    send_json(sender, &WsMessage::Display(Box::new(data)), state).await
}

/// False once the client is gone.
async fn send_json(sender: &mut WsSender, msg: &WsMessage, state: &AppState) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => {
            let ok = sender.send(Message::Text(json.into())).await.is_ok();
            if ok {
                state.counters.ws_messages_sent.fetch_add(1, Ordering::Relaxed);
            }
            ok
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize ws message");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::market::types::DateRange;
    use crate::series::fixtures::five_years;
    use crate::server::build_router;
    use chrono::NaiveDate;
    use std::time::Duration;
    use tokio_tungstenite::tungstenite;

    type Client =
        tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

    async fn connect(state: Arc<AppState>) -> Client {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await.unwrap();
        client
    }

    /// Next text frame whose `type` is `kind`, skipping other messages.
    async fn next_of(client: &mut Client, kind: &str) -> serde_json::Value {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
                .await
                .expect("timed out waiting for ws message")
                .expect("socket closed")
                .unwrap();
            if let tungstenite::Message::Text(text) = frame {
                let msg: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
                if msg["type"] == kind {
                    return msg;
                }
            }
        }
    }

    fn range() -> DateRange {
        DateRange {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_commit_pushes_new_display() {
        let state = AppState::new(test_config("http://127.0.0.1:9", true));
        let mut client = connect(state.clone()).await;

        let initial = next_of(&mut client, "display").await;
        assert_eq!(initial["status"], "no_data");

        let generation = state.sequencer.begin();
        assert!(state.commit_benchmark(generation, five_years(), range()));

        let pushed = next_of(&mut client, "display").await;
        assert_eq!(pushed["status"], "ready");
        assert_eq!(pushed["benchmark_series"].as_array().unwrap().len(), 261);
        assert_eq!(pushed["benchmark_series"][0]["value"], 1000.0);

        assert!(state.counters.ws_messages_sent.load(Ordering::Relaxed) >= 2);
        assert_eq!(state.counters.ws_sessions.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_commands_recompute_and_errors_are_reported() {
        let state = AppState::new(test_config("http://127.0.0.1:9", true));
        let generation = state.sequencer.begin();
        assert!(state.commit_benchmark(generation, five_years(), range()));

        let mut client = connect(state.clone()).await;
        let initial = next_of(&mut client, "display").await;
        assert_eq!(initial["strategy"], "luthor");

        client
            .send(tungstenite::Message::Text(
                r#"{"type":"set_strategy","strategy":"clark"}"#.into(),
            ))
            .await
            .unwrap();
        let d = next_of(&mut client, "display").await;
        assert_eq!(d["strategy"], "clark");
        assert_eq!(d["summary_display"]["start_value"], "$1,000.00");

        client
            .send(tungstenite::Message::Text(r#"{"type":"set_period","period":"2W"}"#.into()))
            .await
            .unwrap();
        let err = next_of(&mut client, "error").await;
        assert!(err["message"].as_str().unwrap().contains("2W"));
    }
}

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use camahjucunu_ws::WsManager;

/// Loopback echo server: reflects text/binary frames, answers close.
async fn spawn_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                while let Some(message) = ws.next().await {
                    match message {
                        Ok(msg) if msg.is_text() || msg.is_binary() => {
                            if ws.send(msg).await.is_err() {
                                break;
                            }
                        }
                        Ok(Message::Close(_)) => {
                            let _ = ws.close(None).await;
                            break;
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }
            });
        }
    });
    addr
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn correlates_response_by_frame_id() {
    let addr = spawn_echo_server().await;
    let manager = WsManager::new();
    let session = manager.init(&format!("ws://{addr}")).await.expect("init");

    let frame_id = manager.ws_write_text(
        session,
        r#"{"id":"req-0001","method":"ping"}"#.to_string(),
        Some("req-0001".to_string()),
    );
    assert_eq!(frame_id, "req-0001");

    let frame = manager
        .await_and_retrieve(session, "req-0001", Duration::from_secs(2))
        .await
        .expect("echo response arrives");
    assert_eq!(frame.frame_id, "req-0001");
    assert!(frame.data.contains("req-0001"));

    manager.finalize(session).await.expect("finalize");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn correlation_is_independent_of_arrival_order() {
    let addr = spawn_echo_server().await;
    let manager = WsManager::new();
    let session = manager.init(&format!("ws://{addr}")).await.expect("init");

    manager.ws_write_text(
        session,
        r#"{"id":"first","n":1}"#.to_string(),
        Some("first".to_string()),
    );
    manager.ws_write_text(
        session,
        r#"{"id":"second","n":2}"#.to_string(),
        Some("second".to_string()),
    );

    // retrieve in reverse of arrival order
    let second = manager
        .await_and_retrieve(session, "second", Duration::from_secs(2))
        .await
        .expect("second response");
    assert_eq!(second.frame_id, "second");

    let first = manager
        .await_and_retrieve(session, "first", Duration::from_secs(2))
        .await
        .expect("first response still queued");
    assert_eq!(first.frame_id, "first");

    manager.finalize(session).await.expect("finalize");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_frame_times_out_with_none() {
    let addr = spawn_echo_server().await;
    let manager = WsManager::new();
    let session = manager.init(&format!("ws://{addr}")).await.expect("init");

    let outcome = manager
        .await_and_retrieve(session, "never-sent", Duration::from_millis(300))
        .await;
    assert!(outcome.is_none());

    manager.finalize(session).await.expect("finalize");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generated_frame_ids_follow_the_template() {
    let addr = spawn_echo_server().await;
    let manager = WsManager::new();
    let session = manager.init(&format!("ws://{addr}")).await.expect("init");

    let ping_id = manager.ws_write_ping(session, None);
    assert!(ping_id.starts_with("ping-"));
    assert!(ping_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));

    manager.finalize(session).await.expect("finalize");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn finalize_completes_within_a_bound_and_is_idempotent() {
    let addr = spawn_echo_server().await;
    let manager = WsManager::new();
    let session = manager.init(&format!("ws://{addr}")).await.expect("init");

    manager.ws_write_text(
        session,
        r#"{"id":"pending","payload":"x"}"#.to_string(),
        Some("pending".to_string()),
    );

    tokio::time::timeout(Duration::from_secs(10), manager.finalize(session))
        .await
        .expect("finalize finishes in bounded time")
        .expect("finalize succeeds");

    // the id slot is kept, marked retired; a second finalize is a no-op
    manager.finalize(session).await.expect("idempotent finalize");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn init_fails_fast_when_nothing_listens() {
    let manager = WsManager::new();
    let outcome = manager.init("ws://127.0.0.1:9").await;
    assert!(outcome.is_err());
}

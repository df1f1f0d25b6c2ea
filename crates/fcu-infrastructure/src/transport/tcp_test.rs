use super::*;
use fcu_core::session::inbound_channel;
use serde_json::json;
use tokio::io::{DuplexStream, ReadHalf, WriteHalf};
use tokio::net::TcpListener;

/// Server end of an in-memory channel.
struct FakeServer {
    lines: tokio::io::Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl FakeServer {
    async fn next_frame(&mut self) -> Option<Frame> {
        let line = self.lines.next_line().await.ok()??;
        Frame::decode(&line).ok()
    }

    async fn send(&mut self, frame: Frame) {
        write_frame(&mut self.writer, &frame).await.unwrap();
    }
}

fn pipe() -> (ChannelReader, ChannelWriter, FakeServer) {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (client_read, client_write) = tokio::io::split(client);
    let (server_read, server_write) = tokio::io::split(server);
    (
        Box::new(client_read),
        Box::new(client_write),
        FakeServer {
            lines: BufReader::new(server_read).lines(),
            writer: server_write,
        },
    )
}

async fn connected(call_timeout: Duration) -> (LineConnection, FakeServer, fcu_core::session::InboundReceiver) {
    let (reader, writer, mut server) = pipe();
    let (tx, rx) = inbound_channel();

    let server_task = tokio::spawn(async move {
        let hello = server.next_frame().await;
        assert_eq!(
            hello,
            Some(Frame::Hello {
                client: "fcu-test".to_string()
            })
        );
        server.send(Frame::Welcome).await;
        server
    });

    let connection = LineConnection::handshake(
        reader,
        writer,
        "fcu-test",
        Duration::from_secs(5),
        call_timeout,
        tx,
    )
    .await
    .unwrap();
    let server = server_task.await.unwrap();
    (connection, server, rx)
}

#[tokio::test]
async fn test_call_receives_matching_reply() {
    let (connection, mut server, _rx) = connected(Duration::from_secs(5)).await;

    let server_task = tokio::spawn(async move {
        match server.next_frame().await {
            Some(Frame::Call { id, method, payload }) => {
                assert_eq!(method, "get_selection");
                assert_eq!(payload, "{}");
                server.send(Frame::reply(id, Ok(json!(["guid-1"])))).await;
            }
            other => panic!("unexpected frame {other:?}"),
        }
        server
    });

    let result = connection.call("get_selection", "{}".to_string()).await.unwrap();
    assert_eq!(result, json!(["guid-1"]));
    let _server = server_task.await.unwrap();
}

#[tokio::test]
async fn test_error_reply_becomes_remote_error() {
    let (connection, mut server, _rx) = connected(Duration::from_secs(5)).await;

    let server_task = tokio::spawn(async move {
        if let Some(Frame::Call { id, .. }) = server.next_frame().await {
            server.send(Frame::reply(id, Err("no such method".to_string()))).await;
        }
        server
    });

    let err = connection.call("bogus", "{}".to_string()).await.unwrap_err();
    assert_eq!(err, TransportError::Remote("no such method".to_string()));
    let _server = server_task.await.unwrap();
}

#[tokio::test]
async fn test_server_calls_are_forwarded_and_answered() {
    let (connection, mut server, mut rx) = connected(Duration::from_secs(5)).await;

    server
        .send(Frame::Call {
            id: 41,
            method: "client_name".to_string(),
            payload: "null".to_string(),
        })
        .await;
    server
        .send(Frame::Notify {
            method: "show_dialog".to_string(),
            payload: "\"Publish\"".to_string(),
        })
        .await;

    let first = rx.recv().await.unwrap();
    assert_eq!(first.id, Some(41));
    assert_eq!(first.method, "client_name");
    let second = rx.recv().await.unwrap();
    assert_eq!(second.id, None);
    assert_eq!(second.payload, "\"Publish\"");

    connection.respond(41, Ok(json!("fcu"))).await.unwrap();
    assert_eq!(
        server.next_frame().await,
        Some(Frame::Reply {
            id: 41,
            result: Some(json!("fcu")),
            error: None
        })
    );
}

#[tokio::test]
async fn test_pending_call_fails_when_server_hangs_up() {
    let (connection, mut server, _rx) = connected(Duration::from_secs(5)).await;

    let server_task = tokio::spawn(async move {
        let _ = server.next_frame().await;
        drop(server);
    });

    let err = connection.call("refresh", "{}".to_string()).await.unwrap_err();
    assert_eq!(err, TransportError::EndOfStream);
    server_task.await.unwrap();

    tokio::task::yield_now().await;
    assert!(connection.ping().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_call_times_out() {
    let (connection, _server, _rx) = connected(Duration::from_secs(2)).await;

    let err = connection.call("slow", "{}".to_string()).await.unwrap_err();
    assert_eq!(err, TransportError::Timeout(Duration::from_secs(2)));
    assert!(connection.pending.lock().await.is_empty());
}

#[tokio::test]
async fn test_ping_and_notify_frames() {
    let (connection, mut server, _rx) = connected(Duration::from_secs(5)).await;

    connection.ping().await.unwrap();
    connection
        .notify("log_error", "\"boom\"".to_string())
        .await
        .unwrap();

    assert_eq!(server.next_frame().await, Some(Frame::Ping));
    assert_eq!(
        server.next_frame().await,
        Some(Frame::Notify {
            method: "log_error".to_string(),
            payload: "\"boom\"".to_string()
        })
    );
}

#[tokio::test]
async fn test_close_marks_connection_closed() {
    let (connection, _server, _rx) = connected(Duration::from_secs(5)).await;
    assert!(!connection.is_closed());

    connection.close().await;

    assert!(connection.is_closed());
    assert_eq!(connection.ping().await, Err(TransportError::EndOfStream));
}

#[tokio::test]
async fn test_handshake_end_of_stream() {
    let (reader, writer, server) = pipe();
    let (tx, _rx) = inbound_channel();
    drop(server);

    let result = LineConnection::handshake(
        reader,
        writer,
        "fcu-test",
        Duration::from_secs(5),
        Duration::from_secs(5),
        tx,
    )
    .await;

    assert!(matches!(result, Err(TransportError::EndOfStream)));
}

#[tokio::test]
async fn test_handshake_rejects_unexpected_first_frame() {
    let (reader, writer, mut server) = pipe();
    let (tx, _rx) = inbound_channel();

    let server_task = tokio::spawn(async move {
        let _ = server.next_frame().await;
        server.send(Frame::Ping).await;
        server
    });

    let result = LineConnection::handshake(
        reader,
        writer,
        "fcu-test",
        Duration::from_secs(5),
        Duration::from_secs(5),
        tx,
    )
    .await;

    assert!(matches!(result, Err(TransportError::Protocol(_))));
    let _server = server_task.await.unwrap();
}

#[tokio::test]
async fn test_tcp_connect_refused_when_nobody_listens() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);

    let (tx, _rx) = inbound_channel();
    let result = TcpTransport::new(address, "fcu-test").connect(tx).await;

    match result {
        Err(err) => assert!(err.is_retryable(), "unexpected {err:?}"),
        Ok(_) => panic!("connected to a closed port"),
    }
}

#[tokio::test]
async fn test_tcp_connect_performs_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    let server_task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let hello = Frame::decode(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert!(matches!(hello, Frame::Hello { .. }));
        write_frame(&mut write_half, &Frame::Welcome).await.unwrap();
        (lines, write_half)
    });

    let (tx, _rx) = inbound_channel();
    let connection = TcpTransport::new(address, "fcu-test").connect(tx).await.unwrap();
    assert!(!connection.is_closed());
    let _server = server_task.await.unwrap();
}

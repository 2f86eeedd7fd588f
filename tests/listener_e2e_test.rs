use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use telnet_arcade::server::listener::run_listener;
use telnet_arcade::server::{ServerConfig, Session};
use telnet_arcade::types::{FlushStatus, BEL, NEGOTIATION_PREAMBLE};

fn local_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn accepted_client_is_greeted_and_handed_over() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Session>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let listener = tokio::spawn(run_listener(local_config(), tx, Some(ready_tx)));

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("listener did not signal ready")
        .expect("ready channel dropped");

    let mut client = TcpStream::connect(addr).await.expect("connect failed");

    let mut greeting = [0u8; 7];
    tokio::time::timeout(Duration::from_secs(2), client.read_exact(&mut greeting))
        .await
        .expect("no greeting")
        .unwrap();
    assert_eq!(&greeting[..6], &NEGOTIATION_PREAMBLE);
    assert_eq!(greeting[6], BEL);

    let mut session = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .expect("session not handed over");
    assert!(session.peer().is_some());
    assert!(!session.color());

    session.vt().write_text("hello");
    assert_eq!(session.vt().flush(), FlushStatus::Success);
    let mut echoed = [0u8; 5];
    tokio::time::timeout(Duration::from_secs(2), client.read_exact(&mut echoed))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&echoed, b"hello");

    client.write_all(b"\x1b[Ax").await.unwrap();
    client.flush().await.unwrap();
    let mut key = None;
    for _ in 0..100 {
        key = session.vt().read_char();
        if key.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(key, Some(b'x'));

    // Once the receiving side is gone the next accepted client stops the loop.
    drop(rx);
    let _late = TcpStream::connect(addr).await.expect("connect failed");
    let result = tokio::time::timeout(Duration::from_secs(2), listener)
        .await
        .expect("listener kept running")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn bad_bind_address_is_an_error() {
    let (tx, _rx) = mpsc::unbounded_channel::<Session>();
    let config = ServerConfig {
        host: "not an address".to_string(),
        ..local_config()
    };
    assert!(run_listener(config, tx, None).await.is_err());
}

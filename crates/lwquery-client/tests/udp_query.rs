//! Query transport against in-process UDP responders.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::net::UdpSocket;

use lwquery_client::transport::{send_query, MAX_DATAGRAM_LEN};
use lwquery_client::{query_state, query_state_with, QueryOptions};
use lwquery_core::error::{LwQueryError, TransportError};
use lwquery_core::protocol::{decode_poll_request, ServerState, ServerStateResponse, SubState};

fn state_response(cookie: u64, state: u8) -> Vec<u8> {
    ServerStateResponse {
        cookie,
        server_state: ServerState::from_u8(state),
        server_net_cl: 365_306,
        server_flags: 0,
        sub_states: vec![SubState { id: 2, version: 7 }],
        server_name: Bytes::from_static(b"Factory"),
    }
    .encode()
    .unwrap()
    .to_vec()
}

/// Answers every poll with the datagrams `replies` builds from its cookie.
async fn responder<F>(replies: F) -> (String, Arc<AtomicUsize>)
where
    F: Fn(u64) -> Vec<Vec<u8>> + Send + 'static,
{
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let polls = Arc::new(AtomicUsize::new(0));
    let seen = polls.clone();

    tokio::spawn(async move {
        let mut buf = [0u8; 1024];
        loop {
            let (len, peer) = match socket.recv_from(&mut buf).await {
                Ok(v) => v,
                Err(_) => return,
            };
            seen.fetch_add(1, Ordering::SeqCst);
            let Ok(req) = decode_poll_request(&buf[..len]) else {
                continue;
            };
            for reply in replies(req.cookie) {
                let _ = socket.send_to(&reply, peer).await;
            }
        }
    });

    (addr.to_string(), polls)
}

fn fast_opts(max_retries: usize) -> QueryOptions {
    QueryOptions {
        max_retries,
        retry_delay: Duration::from_millis(10),
        recv_timeout: Duration::from_millis(50),
        match_cookie: true,
    }
}

#[tokio::test]
async fn first_attempt_success_short_circuits() {
    let (addr, polls) = responder(|cookie| vec![state_response(cookie, 3)]).await;
    let opts = QueryOptions {
        retry_delay: Duration::from_secs(5),
        recv_timeout: Duration::from_secs(1),
        ..fast_opts(3)
    };

    let started = Instant::now();
    let resp = query_state_with(&addr, 0x1122_3344_5566_7788, &opts)
        .await
        .expect("query must succeed");

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(resp.cookie, 0x1122_3344_5566_7788);
    assert_eq!(resp.server_state, ServerState::Playing);
    assert_eq!(resp.sub_states, vec![SubState { id: 2, version: 7 }]);
    assert_eq!(resp.name_lossy(), "Factory");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(polls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn default_options_query() {
    let (addr, _) = responder(|cookie| vec![state_response(cookie, 1)]).await;
    let resp = query_state(&addr, 77).await.expect("query must succeed");
    assert_eq!(resp.cookie, 77);
    assert_eq!(resp.server_state.label(), "Idle");
}

#[tokio::test]
async fn silent_peer_exhausts_retries_with_exact_send_count() {
    let silent = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    silent.set_nonblocking(true).unwrap();
    let addr: SocketAddr = silent.local_addr().unwrap();

    let started = Instant::now();
    let err = query_state_with(&addr.to_string(), 5, &fast_opts(3))
        .await
        .expect_err("nobody answers");

    assert_eq!(err.code().as_str(), "RETRIES_EXHAUSTED");
    assert!(matches!(
        err,
        LwQueryError::Transport(TransportError::RetriesExhausted { attempts: 3 })
    ));
    assert!(started.elapsed() < Duration::from_secs(2));

    let mut buf = [0u8; 64];
    let mut sends = 0;
    while let Ok(len) = silent.recv(&mut buf) {
        assert_eq!(decode_poll_request(&buf[..len]).unwrap().cookie, 5);
        sends += 1;
    }
    assert_eq!(sends, 3);
}

#[tokio::test]
async fn stale_cookie_is_discarded_within_attempt() {
    let (addr, polls) = responder(|cookie| {
        vec![state_response(cookie ^ 1, 0), state_response(cookie, 2)]
    })
    .await;

    let resp = query_state_with(&addr, 1000, &fast_opts(3)).await.unwrap();
    assert_eq!(resp.cookie, 1000);
    assert_eq!(resp.server_state, ServerState::Loading);
    assert_eq!(polls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn first_datagram_wins_without_cookie_matching() {
    let (addr, _) = responder(|cookie| {
        vec![state_response(cookie ^ 1, 0), state_response(cookie, 2)]
    })
    .await;

    let opts = QueryOptions {
        match_cookie: false,
        ..fast_opts(3)
    };
    let resp = query_state_with(&addr, 1000, &opts).await.unwrap();
    assert_eq!(resp.cookie, 1001);
    assert_eq!(resp.server_state, ServerState::Offline);
}

#[tokio::test]
async fn only_mismatched_cookies_exhaust_retries() {
    let (addr, polls) = responder(|cookie| vec![state_response(cookie.wrapping_add(1), 3)]).await;

    let err = query_state_with(&addr, 9, &fast_opts(2)).await.unwrap_err();
    assert_eq!(err.code().as_str(), "RETRIES_EXHAUSTED");
    assert_eq!(polls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn malformed_response_surfaces_decode_error() {
    let (addr, _) = responder(|_| vec![vec![0xAB; 30]]).await;

    let err = query_state_with(&addr, 1, &fast_opts(3)).await.unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_MAGIC");
}

#[tokio::test]
async fn unknown_state_is_not_an_error() {
    let (addr, _) = responder(|cookie| vec![state_response(cookie, 200)]).await;

    let resp = query_state_with(&addr, 3, &fast_opts(1)).await.unwrap();
    assert_eq!(resp.server_state, ServerState::Unknown(200));
    assert_eq!(resp.server_state.label(), "");
}

#[tokio::test]
async fn unresolvable_address_fails_fast() {
    let err = query_state_with("definitely not an address", 1, &fast_opts(3))
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "RESOLVE_FAILED");
}

#[tokio::test]
async fn refused_port_retries_receive_errors() {
    let closed = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    let addr = closed.local_addr().unwrap().to_string();
    drop(closed);

    let opts = QueryOptions {
        max_retries: 3,
        retry_delay: Duration::from_millis(10),
        recv_timeout: Duration::from_secs(2),
        match_cookie: true,
    };

    let started = Instant::now();
    let err = query_state_with(&addr, 8, &opts).await.unwrap_err();

    assert!(matches!(
        err,
        LwQueryError::Transport(TransportError::RetriesExhausted { attempts: 3 })
    ));
    // Refusals end each attempt early instead of waiting out the deadline.
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn send_error_is_returned_without_retrying() {
    let peer = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    peer.set_nonblocking(true).unwrap();
    let addr = peer.local_addr().unwrap().to_string();

    // Larger than any UDP payload: the kernel refuses it on send.
    let oversized = vec![0u8; MAX_DATAGRAM_LEN + 1];
    let opts = QueryOptions {
        retry_delay: Duration::from_secs(5),
        ..fast_opts(3)
    };
    let started = Instant::now();
    let err = send_query(&addr, &oversized, &opts, |_| true)
        .await
        .unwrap_err();

    assert_eq!(err.code().as_str(), "SEND_FAILED");
    assert!(matches!(err, LwQueryError::Transport(TransportError::Send(_))));
    assert!(started.elapsed() < Duration::from_secs(1));

    let mut buf = [0u8; 64];
    assert!(peer.recv(&mut buf).is_err(), "nothing may reach the peer");
}

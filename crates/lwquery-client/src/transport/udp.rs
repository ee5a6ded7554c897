//! Best-effort UDP request/response with bounded retries.
//!
//! Rules:
//! - Resolve once per call; never cache a resolution across calls.
//! - Attempts are strictly sequential: send, wait up to the deadline, then
//!   sleep and retry. No fan-out.
//! - The socket is dropped on every exit path.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use bytes::Bytes;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::{sleep, timeout_at, Instant};

use lwquery_core::error::{Result, TransportError};

/// Per-attempt receive deadline.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Largest UDP payload; the receive buffer never truncates a datagram.
pub const MAX_DATAGRAM_LEN: usize = 65_535;

/// Retry and matching knobs for one query.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Number of send attempts.
    pub max_retries: usize,
    /// Sleep between failed attempts.
    pub retry_delay: Duration,
    /// Receive deadline per attempt.
    pub recv_timeout: Duration,
    /// Discard responses whose cookie does not echo the request.
    pub match_cookie: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            match_cookie: true,
        }
    }
}

/// Outcome of a single attempt.
enum Attempt {
    Accepted(Bytes),
    TimedOut,
    RecvFailed(io::Error),
    SendFailed(io::Error),
}

async fn resolve(address: &str) -> Result<SocketAddr> {
    let mut addrs = lookup_host(address)
        .await
        .map_err(|e| TransportError::Resolve {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
    addrs.next().ok_or_else(|| {
        TransportError::Resolve {
            address: address.to_string(),
            reason: "no addresses".into(),
        }
        .into()
    })
}

async fn open_socket(peer: SocketAddr) -> Result<UdpSocket> {
    let local: SocketAddr = if peer.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local)
        .await
        .map_err(TransportError::SocketOpen)?;
    // Connected: only datagrams from the peer are delivered.
    socket
        .connect(peer)
        .await
        .map_err(TransportError::SocketOpen)?;
    Ok(socket)
}

/// Send `request` to `address` and return the first datagram `accept` admits.
///
/// Datagrams rejected by `accept` are dropped and receiving continues until
/// the current attempt's deadline. A receive error (including an ICMP
/// refusal reported on the connected socket) ends the attempt and is retried;
/// a send error is returned at once. Fails with `RetriesExhausted` once
/// `opts.max_retries` attempts produced nothing.
pub async fn send_query<F>(
    address: &str,
    request: &[u8],
    opts: &QueryOptions,
    mut accept: F,
) -> Result<Bytes>
where
    F: FnMut(&[u8]) -> bool,
{
    let peer = resolve(address).await?;
    let socket = open_socket(peer).await?;
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];

    for attempt in 1..=opts.max_retries {
        match run_attempt(&socket, request, &mut buf, opts.recv_timeout, &mut accept).await {
            Attempt::Accepted(resp) => {
                tracing::debug!(%peer, attempt, len = resp.len(), "response accepted");
                return Ok(resp);
            }
            Attempt::TimedOut => {
                tracing::debug!(%peer, attempt, "no response before deadline");
            }
            Attempt::RecvFailed(e) => {
                tracing::debug!(%peer, attempt, error = %e, "receive failed");
            }
            Attempt::SendFailed(e) => {
                tracing::debug!(%peer, attempt, error = %e, "send failed");
                return Err(TransportError::Send(e).into());
            }
        }

        if attempt < opts.max_retries {
            sleep(opts.retry_delay).await;
        }
    }

    tracing::warn!(%peer, attempts = opts.max_retries, "query retries exhausted");
    Err(TransportError::RetriesExhausted {
        attempts: opts.max_retries,
    }
    .into())
}

async fn run_attempt<F>(
    socket: &UdpSocket,
    request: &[u8],
    buf: &mut [u8],
    recv_timeout: Duration,
    accept: &mut F,
) -> Attempt
where
    F: FnMut(&[u8]) -> bool,
{
    if let Err(e) = socket.send(request).await {
        return Attempt::SendFailed(e);
    }
    tracing::trace!(len = request.len(), "query sent");

    let deadline = Instant::now() + recv_timeout;
    loop {
        match timeout_at(deadline, socket.recv(buf)).await {
            Err(_elapsed) => return Attempt::TimedOut,
            Ok(Err(e)) => return Attempt::RecvFailed(e),
            Ok(Ok(len)) => {
                let datagram = buf.get(..len).unwrap_or_default();
                if accept(datagram) {
                    return Attempt::Accepted(Bytes::copy_from_slice(datagram));
                }
                tracing::debug!(len, "discarding unmatched datagram");
            }
        }
    }
}

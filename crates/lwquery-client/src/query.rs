//! Server state query: encode, exchange, decode.

use lwquery_core::error::Result;
use lwquery_core::protocol::{
    decode_state_response, encode_poll_request, peek_cookie, ServerStateResponse,
};

use crate::transport::{send_query, QueryOptions};

/// Fresh random correlation cookie.
pub fn new_cookie() -> u64 {
    rand::random()
}

/// Query `address` ("host:port") with default options.
pub async fn query_state(address: &str, cookie: u64) -> Result<ServerStateResponse> {
    query_state_with(address, cookie, &QueryOptions::default()).await
}

/// Query `address` ("host:port").
///
/// With `match_cookie`, datagrams carrying a valid header but another cookie
/// (late answers to an abandoned attempt) are skipped. Anything whose cookie
/// cannot be read is handed to the decoder so the structural error surfaces.
pub async fn query_state_with(
    address: &str,
    cookie: u64,
    opts: &QueryOptions,
) -> Result<ServerStateResponse> {
    let request = encode_poll_request(cookie);
    let match_cookie = opts.match_cookie;

    let raw = send_query(address, &request, opts, |datagram| {
        !match_cookie || peek_cookie(datagram).map_or(true, |echo| echo == cookie)
    })
    .await?;

    let resp = decode_state_response(&raw)?;
    tracing::debug!(
        address,
        cookie,
        state = resp.server_state.as_u8(),
        sub_states = resp.sub_states.len(),
        "server state decoded"
    );
    Ok(resp)
}

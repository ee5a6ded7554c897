//! Presentation of decoded server state (text block or JSON).

use std::fmt::Write;

use serde::Serialize;

use lwquery_core::protocol::{ServerState, ServerStateResponse, SubState};

/// Display view of one query result.
#[derive(Debug, Clone, Serialize)]
pub struct StateReport {
    pub target: String,
    pub address: String,
    pub cookie: u64,
    pub state: String,
    pub state_raw: u8,
    pub net_cl: u32,
    pub flags: String,
    pub sub_states: Vec<SubState>,
    pub name: String,
}

/// Label for display; unknown discriminants render as `Unknown(n)`.
pub fn state_label(state: ServerState) -> String {
    match state {
        ServerState::Unknown(v) => format!("Unknown({v})"),
        known => known.label().to_string(),
    }
}

impl StateReport {
    pub fn new(target: &str, address: &str, resp: &ServerStateResponse) -> Self {
        Self {
            target: target.to_string(),
            address: address.to_string(),
            cookie: resp.cookie,
            state: state_label(resp.server_state),
            state_raw: resp.server_state.as_u8(),
            net_cl: resp.server_net_cl,
            flags: format!("{:#018x}", resp.server_flags),
            sub_states: resp.sub_states.clone(),
            name: resp.name_lossy().into_owned(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "-------");
        if self.target == self.address {
            let _ = writeln!(out, "Server: {}", self.address);
        } else {
            let _ = writeln!(out, "Server: {} ({})", self.target, self.address);
        }
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "State: {}", self.state);
        let _ = writeln!(out, "Net CL: {}", self.net_cl);
        let _ = writeln!(out, "Flags: {}", self.flags);
        let _ = writeln!(out, "Sub-states: {}", self.sub_states.len());
        for s in &self.sub_states {
            let _ = writeln!(out, "  id={} version={}", s.id, s.version);
        }
        let _ = writeln!(out, "Cookie: {:#018x}", self.cookie);
        let _ = write!(out, "-------");
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

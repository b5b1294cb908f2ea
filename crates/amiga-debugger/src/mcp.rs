//! MCP (Model Context Protocol) server for the Amiga debugger.
//!
//! Exposes the debugger views as a JSON-RPC 2.0 server over stdin/stdout,
//! one request per line. Scripts and agents can navigate, edit
//! breakpoints, drive the bus overlay, and pull render snapshots.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use emu_core::{DmaDisplayMode, GuardKind, MemoryRegionKind, Observable, Rgb, Value};
use machine_amiga::Amiga;

use crate::bus_activity::OwnerGroup;
use crate::command::{Command, NavTarget, VisualField};
use crate::engine::EngineHandle;
use crate::error::DebuggerError;
use crate::Debugger;

// ---------------------------------------------------------------------------
// JSON-RPC types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RpcRequest {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: JsonValue,
    id: JsonValue,
}

#[derive(Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: JsonValue,
}

#[derive(Serialize)]
struct RpcError {
    code: i32,
    message: String,
}

impl RpcResponse {
    fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0",
            result: Some(result),
            error: None,
            id,
        }
    }

    fn error(id: JsonValue, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(RpcError { code, message }),
            id,
        }
    }

    fn ok(id: JsonValue) -> Self {
        Self::success(id, serde_json::json!({"status": "ok"}))
    }

    fn bad_params(id: JsonValue, message: &str) -> Self {
        Self::error(id, -32602, message.to_string())
    }

    fn from_result(id: JsonValue, result: Result<(), DebuggerError>) -> Self {
        match result {
            Ok(()) => Self::ok(id),
            Err(e) => Self::error(id, -32000, e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// MCP Server
// ---------------------------------------------------------------------------

/// MCP server wrapping a debugger attached to a headless Amiga.
pub struct McpServer {
    engine: EngineHandle<Amiga>,
    debugger: Debugger<Amiga>,
}

impl McpServer {
    #[must_use]
    pub fn new(debugger: Debugger<Amiga>) -> Self {
        Self {
            engine: debugger.engine().clone(),
            debugger,
        }
    }

    /// Run the server loop: read JSON-RPC from stdin, write responses to stdout.
    pub fn run(&mut self) {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut stdout = stdout.lock();

        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = self.handle_line(line);
            let _ = writeln!(
                stdout,
                "{}",
                serde_json::to_string(&response).unwrap_or_default()
            );
            let _ = stdout.flush();
        }
    }

    fn handle_line(&mut self, line: &str) -> RpcResponse {
        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                return RpcResponse::error(JsonValue::Null, -32700, format!("Parse error: {e}"));
            }
        };

        if request.jsonrpc != "2.0" {
            return RpcResponse::error(request.id, -32600, "Invalid JSON-RPC version".to_string());
        }

        self.dispatch(&request.method, &request.params, request.id)
    }

    fn dispatch(&mut self, method: &str, params: &JsonValue, id: JsonValue) -> RpcResponse {
        match method {
            "snapshot" => self.handle_snapshot(id),
            "jump_to_address" => self.handle_address_jump(params, id, NavTarget::Address),
            "jump_to_memory_address" => {
                self.handle_address_jump(params, id, NavTarget::MemoryAddress)
            }
            "jump_to_pc" => self.apply(id, Command::Navigate(NavTarget::ProgramCounter)),
            "jump_to_bank" => self.handle_jump_to_bank(params, id),
            "jump_to_region" => self.handle_jump_to_region(params, id),
            "refresh" => self.apply(id, Command::Refresh),
            "memory_lines" => self.handle_memory_lines(params, id),
            "add_breakpoint" => self.handle_add_breakpoint(params, id),
            "remove_breakpoint" => self.handle_slot(params, id, |kind, slot| {
                Command::RemoveBreakpoint { kind, slot }
            }),
            "toggle_breakpoint" => self.handle_slot(params, id, |kind, slot| {
                Command::ToggleEnabled { kind, slot }
            }),
            "toggle_breakpoint_at_row" => {
                self.handle_row(params, id, Command::ToggleBreakpointAtRow)
            }
            "add_or_remove_breakpoint_at_row" => {
                self.handle_row(params, id, Command::AddOrRemoveBreakpointAtRow)
            }
            "bus_set_enabled" => match params.get("enabled").and_then(JsonValue::as_bool) {
                Some(enabled) => self.apply(id, Command::SetBusEnabled(enabled)),
                None => RpcResponse::bad_params(id, "Missing 'enabled' parameter"),
            },
            "bus_set_visualize" => self.handle_bus_visualize(params, id),
            "bus_set_color" => self.handle_bus_color(params, id),
            "bus_set_opacity" => match params.get("opacity").and_then(JsonValue::as_f64) {
                Some(opacity) => self.apply(id, Command::SetBusOpacity(opacity)),
                None => RpcResponse::bad_params(id, "Missing 'opacity' parameter"),
            },
            "bus_set_display_mode" => self.handle_bus_display_mode(params, id),
            "query" => self.handle_query(params, id),
            "set_pc" => self.handle_set_pc(params, id),
            _ => RpcResponse::error(id, -32601, format!("Unknown method: {method}")),
        }
    }

    fn apply(&mut self, id: JsonValue, command: Command) -> RpcResponse {
        RpcResponse::from_result(id, self.debugger.apply(command))
    }

    // === Tool handlers ===

    fn handle_snapshot(&self, id: JsonValue) -> RpcResponse {
        match serde_json::to_value(self.debugger.snapshot()) {
            Ok(snapshot) => RpcResponse::success(id, snapshot),
            Err(e) => RpcResponse::error(id, -32000, format!("Snapshot failed: {e}")),
        }
    }

    fn handle_address_jump(
        &mut self,
        params: &JsonValue,
        id: JsonValue,
        target: fn(u32) -> NavTarget,
    ) -> RpcResponse {
        match param_u32(params, "address") {
            Some(addr) => self.apply(id, Command::Navigate(target(addr))),
            None => RpcResponse::bad_params(id, "Missing or invalid 'address' parameter"),
        }
    }

    fn handle_jump_to_bank(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        match param_usize(params, "bank") {
            Some(bank) => self.apply(id, Command::Navigate(NavTarget::Bank(bank))),
            None => RpcResponse::bad_params(id, "Missing 'bank' parameter"),
        }
    }

    fn handle_jump_to_region(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let Some(kind) = params
            .get("kind")
            .and_then(JsonValue::as_str)
            .and_then(MemoryRegionKind::from_name)
        else {
            return RpcResponse::bad_params(id, "Missing or unknown 'kind' parameter");
        };

        match self.debugger.jump_to_region(kind) {
            Ok(bank) => RpcResponse::success(id, serde_json::json!({"bank": bank})),
            Err(e) => RpcResponse::error(id, -32000, e.to_string()),
        }
    }

    fn handle_memory_lines(&self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let start = param_usize(params, "start").unwrap_or(0);
        let count = param_usize(params, "count").unwrap_or(16);
        let lines = self.debugger.memory_lines(start..start.saturating_add(count));
        match serde_json::to_value(lines) {
            Ok(lines) => RpcResponse::success(id, lines),
            Err(e) => RpcResponse::error(id, -32000, format!("Read failed: {e}")),
        }
    }

    fn handle_add_breakpoint(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let Some(kind) = param_kind(params) else {
            return RpcResponse::bad_params(id, "Unknown 'kind' (breakpoint or watchpoint)");
        };
        match param_u32(params, "address") {
            Some(address) => self.apply(id, Command::SetBreakpoint { kind, address }),
            None => RpcResponse::bad_params(id, "Missing or invalid 'address' parameter"),
        }
    }

    fn handle_slot(
        &mut self,
        params: &JsonValue,
        id: JsonValue,
        command: fn(GuardKind, usize) -> Command,
    ) -> RpcResponse {
        let Some(kind) = param_kind(params) else {
            return RpcResponse::bad_params(id, "Unknown 'kind' (breakpoint or watchpoint)");
        };
        match param_usize(params, "slot") {
            Some(slot) => self.apply(id, command(kind, slot)),
            None => RpcResponse::bad_params(id, "Missing 'slot' parameter"),
        }
    }

    fn handle_row(
        &mut self,
        params: &JsonValue,
        id: JsonValue,
        command: fn(usize) -> Command,
    ) -> RpcResponse {
        match param_usize(params, "row") {
            Some(row) => self.apply(id, command(row)),
            None => RpcResponse::bad_params(id, "Missing 'row' parameter"),
        }
    }

    fn handle_bus_visualize(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let group = match param_group(params) {
            Ok(group) => group,
            Err(resp) => return resp.with_id(id),
        };
        match params.get("visualize").and_then(JsonValue::as_bool) {
            Some(on) => self.apply(
                id,
                Command::SetBusOwnerVisual {
                    group,
                    field: VisualField::Visualize(on),
                },
            ),
            None => RpcResponse::bad_params(id, "Missing 'visualize' parameter"),
        }
    }

    fn handle_bus_color(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let group = match param_group(params) {
            Ok(group) => group,
            Err(resp) => return resp.with_id(id),
        };
        let color = match param_u32(params, "color") {
            Some(rgb) if rgb <= 0xFF_FFFF => {
                Rgb::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
            }
            Some(_) => return RpcResponse::bad_params(id, "Invalid 'color' (0xRRGGBB)"),
            None => {
                let channel = |name: &str| params.get(name).and_then(JsonValue::as_f64);
                match (channel("r"), channel("g"), channel("b")) {
                    (Some(r), Some(g), Some(b)) => Rgb::from_unit(r, g, b),
                    _ => {
                        return RpcResponse::bad_params(
                            id,
                            "Missing 'color' or 'r'/'g'/'b' parameters",
                        );
                    }
                }
            }
        };
        self.apply(
            id,
            Command::SetBusOwnerVisual {
                group,
                field: VisualField::Color(color),
            },
        )
    }

    fn handle_bus_display_mode(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let Some(tag) = params.get("mode").and_then(JsonValue::as_i64) else {
            return RpcResponse::bad_params(id, "Missing 'mode' parameter");
        };
        match DmaDisplayMode::from_tag(tag) {
            Some(mode) => self.apply(id, Command::SetBusDisplayMode(mode)),
            None => {
                let e = DebuggerError::InvalidDisplayMode(tag);
                RpcResponse::error(id, -32000, e.to_string())
            }
        }
    }

    fn handle_query(&self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let Some(path) = params.get("path").and_then(JsonValue::as_str) else {
            return RpcResponse::bad_params(id, "Missing 'path' parameter");
        };

        let value = self
            .debugger
            .query(path)
            .or_else(|| self.engine.with(|amiga| amiga.query(path)));
        match value {
            Some(value) => RpcResponse::success(
                id,
                serde_json::json!({"path": path, "value": observable_to_json(&value)}),
            ),
            None => RpcResponse::error(id, -32000, format!("Unknown query path: {path}")),
        }
    }

    fn handle_set_pc(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let Some(pc) = param_u32(params, "pc").filter(|&pc| pc <= emu_core::ADDRESS_MASK) else {
            return RpcResponse::bad_params(id, "Missing or invalid 'pc' (0-16777215, 24-bit)");
        };
        self.engine.with_mut(|amiga| amiga.set_pc(pc));
        self.apply(id, Command::Refresh)
    }
}

impl RpcResponse {
    fn with_id(mut self, id: JsonValue) -> Self {
        self.id = id;
        self
    }
}

fn param_u32(params: &JsonValue, name: &str) -> Option<u32> {
    params
        .get(name)
        .and_then(JsonValue::as_u64)
        .and_then(|v| u32::try_from(v).ok())
}

fn param_usize(params: &JsonValue, name: &str) -> Option<usize> {
    params
        .get(name)
        .and_then(JsonValue::as_u64)
        .and_then(|v| usize::try_from(v).ok())
}

/// Defaults to breakpoints when absent.
fn param_kind(params: &JsonValue) -> Option<GuardKind> {
    match params.get("kind").and_then(JsonValue::as_str) {
        None | Some("breakpoint") => Some(GuardKind::Breakpoint),
        Some("watchpoint") => Some(GuardKind::Watchpoint),
        Some(_) => None,
    }
}

/// `owner` as a panel tag (0-7) or a group name.
fn param_group(params: &JsonValue) -> Result<OwnerGroup, RpcResponse> {
    let owner = params.get("owner");
    if let Some(tag) = owner.and_then(JsonValue::as_i64) {
        return OwnerGroup::from_tag(tag)
            .map_err(|e| RpcResponse::error(JsonValue::Null, -32000, e.to_string()));
    }
    owner
        .and_then(JsonValue::as_str)
        .and_then(OwnerGroup::from_name)
        .ok_or_else(|| {
            RpcResponse::bad_params(JsonValue::Null, "Missing or unknown 'owner' parameter")
        })
}

fn observable_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(v) => serde_json::json!(v),
        Value::U8(v) => serde_json::json!(v),
        Value::U32(v) => serde_json::json!(v),
        Value::U64(v) => serde_json::json!(v),
        Value::F64(v) => serde_json::json!(v),
        Value::String(v) => serde_json::json!(v),
        Value::Array(v) => JsonValue::Array(v.iter().map(observable_to_json).collect()),
        Value::Map(v) => JsonValue::Object(
            v.iter()
                .map(|(k, v)| (k.clone(), observable_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DebuggerConfig;
    use machine_amiga::{AmigaModel, MachineConfig};

    fn server() -> McpServer {
        let config = MachineConfig::preset(AmigaModel::A500, vec![0; 256 * 1024]);
        let mut amiga = Amiga::new(&config).expect("valid config");
        amiga.set_pc(0x400);
        let engine = EngineHandle::new(amiga);
        McpServer::new(Debugger::new(
            engine,
            DebuggerConfig::default().with_window_rows(8),
        ))
    }

    fn error_code(resp: &RpcResponse) -> Option<i32> {
        resp.error.as_ref().map(|e| e.code)
    }

    #[test]
    fn unknown_method_returns_error() {
        let mut server = server();
        let resp = server.dispatch("nonexistent", &JsonValue::Null, JsonValue::from(1));
        assert_eq!(error_code(&resp), Some(-32601));
    }

    #[test]
    fn malformed_lines_are_reported() {
        let mut server = server();
        assert_eq!(error_code(&server.handle_line("{not json")), Some(-32700));
        let resp = server.handle_line(r#"{"jsonrpc":"1.0","method":"refresh","id":1}"#);
        assert_eq!(error_code(&resp), Some(-32600));
    }

    #[test]
    fn out_of_range_address_is_a_debugger_error() {
        let mut server = server();
        let resp = server.dispatch(
            "jump_to_address",
            &serde_json::json!({"address": 0x0100_0000}),
            JsonValue::from(1),
        );
        assert_eq!(error_code(&resp), Some(-32000));

        let resp = server.dispatch("jump_to_address", &serde_json::json!({}), JsonValue::from(2));
        assert_eq!(error_code(&resp), Some(-32602));
    }

    #[test]
    fn breakpoint_round_trip_through_rpc() {
        let mut server = server();
        let add = serde_json::json!({"address": 0x400});
        assert!(server.dispatch("add_breakpoint", &add, JsonValue::from(1)).error.is_none());
        let dup = server.dispatch("add_breakpoint", &add, JsonValue::from(2));
        assert_eq!(error_code(&dup), Some(-32000));

        let resp = server.dispatch(
            "query",
            &serde_json::json!({"path": "breakpoints.count"}),
            JsonValue::from(3),
        );
        assert_eq!(
            resp.result.as_ref().and_then(|r| r.get("value")).cloned(),
            Some(serde_json::json!(1))
        );
    }

    #[test]
    fn set_pc_moves_following_window() {
        let mut server = server();
        let resp = server.dispatch("set_pc", &serde_json::json!({"pc": 0x2000}), JsonValue::from(1));
        assert!(resp.error.is_none());
        let resp = server.dispatch(
            "query",
            &serde_json::json!({"path": "window.origin"}),
            JsonValue::from(2),
        );
        assert_eq!(
            resp.result.as_ref().and_then(|r| r.get("value")).cloned(),
            Some(serde_json::json!(0x2000))
        );
    }

    #[test]
    fn engine_paths_fall_through() {
        let mut server = server();
        let resp = server.dispatch("query", &serde_json::json!({"path": "pc"}), JsonValue::from(1));
        assert_eq!(
            resp.result.as_ref().and_then(|r| r.get("value")).cloned(),
            Some(serde_json::json!(0x400))
        );
    }

    #[test]
    fn snapshot_serializes() {
        let mut server = server();
        server.dispatch("refresh", &JsonValue::Null, JsonValue::from(1));
        let resp = server.dispatch("snapshot", &JsonValue::Null, JsonValue::from(2));
        let result = resp.result.expect("snapshot");
        assert_eq!(result["rows"].as_array().map(Vec::len), Some(8));
        assert_eq!(result["bank_strip"].as_array().map(Vec::len), Some(256));
        assert_eq!(result["rows"][0]["address"], serde_json::json!(0x400));
    }

    #[test]
    fn bus_owner_accepts_tag_or_name() {
        let mut server = server();
        let by_tag = serde_json::json!({"owner": 5, "visualize": false});
        assert!(server.dispatch("bus_set_visualize", &by_tag, JsonValue::from(1)).error.is_none());
        let by_name = serde_json::json!({"owner": "copper", "color": 0x00FF_0000});
        assert!(server.dispatch("bus_set_color", &by_name, JsonValue::from(2)).error.is_none());
        let bad = serde_json::json!({"owner": 12, "visualize": true});
        let resp = server.dispatch("bus_set_visualize", &bad, JsonValue::from(3));
        assert_eq!(error_code(&resp), Some(-32000));
        assert_eq!(resp.id, JsonValue::from(3));
    }
}

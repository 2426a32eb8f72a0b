use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use tracing::{info, warn};

use crate::use_cases::{BetUseCase, RegistryUseCase, SettlementUseCase};

#[derive(Debug, serde::Deserialize)]
struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

pub struct MCPHandler {
    bet_use_case: Arc<BetUseCase>,
    settlement_use_case: Arc<SettlementUseCase>,
    registry_use_case: Arc<RegistryUseCase>,
}

impl MCPHandler {
    pub fn new(
        bet_use_case: Arc<BetUseCase>,
        settlement_use_case: Arc<SettlementUseCase>,
        registry_use_case: Arc<RegistryUseCase>,
    ) -> Self {
        Self {
            bet_use_case,
            settlement_use_case,
            registry_use_case,
        }
    }

    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(req) => req,
                Err(e) => {
                    warn!("Failed to parse request: {} - Line: {}", e, line);
                    let error_response = JsonRpcResponse {
                        jsonrpc: "2.0".to_string(),
                        result: None,
                        error: Some(JsonRpcError {
                            code: -32700,
                            message: "Parse error".to_string(),
                            data: Some(json!(e.to_string())),
                        }),
                        id: None,
                    };
                    let response_json = serde_json::to_string(&error_response)?;
                    writeln!(writer, "{}", response_json)?;
                    writer.flush()?;
                    continue;
                }
            };

            // Notifications get no response
            let is_notification =
                request.id.is_none() || request.method.starts_with("notifications/");
            if is_notification {
                if request.method == "notifications/initialized" {
                    info!("Client initialized");
                }
                continue;
            }

            let response = self.handle_request(request).await;
            let response_json = serde_json::to_string(&response)?;
            writeln!(writer, "{}", response_json)?;
            writer.flush()?;
        }

        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id).await,
            "tools/list" => self.handle_list_tools(request.id).await,
            "tools/call" => self.handle_call_tool(request.params, request.id).await,
            _ => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(JsonRpcError {
                    code: -32601,
                    message: format!("Method not found: {}", request.method),
                    data: None,
                }),
                id: Some(request.id.unwrap_or(json!(1))),
            },
        }
    }

    async fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("Initializing xoso MCP server");
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "xoso-mcp-server",
                    "version": "0.1.0"
                }
            })),
            error: None,
            id: Some(id.unwrap_or(json!(1))),
        }
    }

    async fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = self.get_tools();
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(json!({ "tools": tools })),
            error: None,
            id: Some(id.unwrap_or(json!(1))),
        }
    }

    async fn handle_call_tool(&self, params: Option<Value>, id: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => {
                return JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32602,
                        message: "Missing params".to_string(),
                        data: None,
                    }),
                    id: Some(id.unwrap_or(json!(1))),
                };
            }
        };

        let tool_name = match params.get("name").and_then(|n| n.as_str()) {
            Some(name) => name,
            None => {
                return JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32602,
                        message: "Missing tool name".to_string(),
                        data: None,
                    }),
                    id: Some(id.unwrap_or(json!(1))),
                };
            }
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
        let arguments_map: HashMap<String, Value> =
            serde_json::from_value(arguments).unwrap_or_default();

        let result = self.execute_tool(tool_name, &arguments_map).await;

        match result {
            Ok(content) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(json!({
                    "content": [
                        {
                            "type": "text",
                            "text": content
                        }
                    ]
                })),
                error: None,
                id: Some(id.unwrap_or(json!(1))),
            },
            Err(e) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(JsonRpcError {
                    code: -32603,
                    message: format!("Tool execution error: {}", e),
                    data: None,
                }),
                id: Some(id.unwrap_or(json!(1))),
            },
        }
    }

    async fn execute_tool(
        &self,
        tool_name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<String> {
        match tool_name {
            "parse_message" => self.bet_use_case.parse_message(arguments).await,
            "quote_bet" => self.bet_use_case.quote_bet(arguments).await,
            "settle_bet" => self.settlement_use_case.settle_bet(arguments).await,
            "settle_ticket" => self.settlement_use_case.settle_ticket(arguments).await,
            "list_provinces" => self.registry_use_case.list_provinces(arguments).await,
            _ => Err(anyhow::anyhow!("Unknown tool: {}", tool_name)),
        }
    }

    fn get_tools(&self) -> Vec<Tool> {
        let region = json!({
            "type": "string",
            "enum": ["MN", "MT", "MB"],
            "description": "Draw region (default: MN)"
        });
        let date = json!({
            "type": "string",
            "description": "Draw date in YYYY-MM-DD format"
        });
        let bet = json!({
            "type": "object",
            "description": "A parsed bet: numbers, type, point, provinces"
        });
        let pair_policy = json!({
            "type": "string",
            "enum": ["min", "half"],
            "description": "How a winning Đá pair is counted (default: server setting)"
        });
        let da_scope = json!({
            "type": "string",
            "enum": ["province", "combined"],
            "description": "Settle Đá per station or over all stations pooled (default: server setting)"
        });
        let head_tier = json!({
            "type": "string",
            "enum": ["fixed", "regional"],
            "description": "Head bets read G.8/G.7 everywhere, or G.7/G.6 in the North (default: server setting)"
        });

        vec![
            Tool {
                name: "parse_message".to_string(),
                description: "Compile a wager message into priced bets and parse errors"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "Raw wager message, e.g. \"vl 12 34 dd 1\""
                        },
                        "date": date.clone(),
                        "region": region.clone()
                    },
                    "required": ["message", "date"]
                }),
            },
            Tool {
                name: "quote_bet".to_string(),
                description: "Price a single bet without settling it".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "bet": bet.clone(),
                        "region": region.clone()
                    },
                    "required": ["bet"]
                }),
            },
            Tool {
                name: "settle_bet".to_string(),
                description: "Settle one bet against the draw results of a day".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "bet": bet.clone(),
                        "date": date.clone(),
                        "region": region.clone(),
                        "pair_policy": pair_policy.clone(),
                        "da_scope": da_scope.clone(),
                        "head_tier": head_tier.clone()
                    },
                    "required": ["bet", "date"]
                }),
            },
            Tool {
                name: "settle_ticket".to_string(),
                description: "Settle every bet of a ticket and return the totals".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "bets": {
                            "type": "array",
                            "items": bet.clone()
                        },
                        "date": date.clone(),
                        "region": region.clone(),
                        "pair_policy": pair_policy.clone(),
                        "da_scope": da_scope.clone(),
                        "head_tier": head_tier.clone()
                    },
                    "required": ["bets", "date"]
                }),
            },
            Tool {
                name: "list_provinces".to_string(),
                description: "List the stations drawing on a day, in priority order".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "date": date.clone(),
                        "region": region.clone()
                    },
                    "required": ["date"]
                }),
            },
        ]
    }
}

pub fn stdio() -> (BufReader<io::Stdin>, io::Stdout) {
    (BufReader::new(io::stdin()), io::stdout())
}

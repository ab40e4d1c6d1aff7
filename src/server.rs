use axum::body::Bytes;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::registry::{self, ToolBinding, TOOLS_PREFIX};
use crate::tools::DynTool;

#[derive(Debug, Clone, Serialize)]
struct ToolInfo {
    name: String,
    description: String,
    path: String,
}

/// Build the router: `GET|POST /tools/{name}` per binding, plus the
/// `/tools` index and `/health`.
pub fn router(bindings: Vec<ToolBinding>) -> Router {
    let index: Vec<ToolInfo> = bindings
        .iter()
        .map(|b| ToolInfo {
            name: b.descriptor.name.clone(),
            description: b.descriptor.description.clone(),
            path: b.path.clone(),
        })
        .collect();

    let mut router = Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .route(TOOLS_PREFIX, get(move || async move { Json(index) }));

    for binding in bindings {
        let get_tool = Arc::clone(&binding.tool);
        let post_tool = Arc::clone(&binding.tool);

        router = router.route(
            &binding.path,
            get(move |Query(query): Query<HashMap<String, String>>| {
                run_tool(get_tool, Ok(query_params(query)))
            })
            .post(move |body: Bytes| run_tool(post_tool, body_params(&body))),
        );
    }

    router
}

/// Query string values all arrive as JSON strings.
fn query_params(query: HashMap<String, String>) -> Value {
    Value::Object(
        query
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect::<Map<String, Value>>(),
    )
}

/// An empty body means no parameters; anything else must be a JSON object.
fn body_params(body: &[u8]) -> Result<Value, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err("request body must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON body: {}", e)),
    }
}

async fn run_tool(tool: Arc<dyn DynTool>, params: Result<Value, String>) -> Response {
    let params = match params {
        Ok(params) => params,
        Err(message) => return error_response(message),
    };

    match registry::invoke(tool, params).await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => error_response(e.to_string()),
    }
}

fn error_response(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

//! AWS Lambda handler for running projections
//!
//! Accepts scenario inputs as JSON and returns the monthly records and
//! summary metrics. Inputs may be the event itself or, for Lambda Function
//! URLs, a JSON string in the event's "body" field.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::Serialize;
use serde_json::{json, Value};

use subscription_projection::{build_parameters, ProjectionEngine, ProjectionResult, RawInputs};

#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    #[serde(flatten)]
    pub result: ProjectionResult,
    pub execution_time_ms: u64,
}

fn response(status: u16, body: String) -> Value {
    json!({
        "statusCode": status,
        "headers": {
            "Content-Type": "application/json",
            "Access-Control-Allow-Origin": "*",
            "Access-Control-Allow-Methods": "POST, OPTIONS",
            "Access-Control-Allow-Headers": "Content-Type",
        },
        "body": body,
    })
}

fn error_response(status: u16, message: &str) -> Value {
    response(status, json!({ "error": message }).to_string())
}

/// Pull scenario inputs out of a direct invocation or a Function URL event
fn parse_inputs(event: Value) -> Result<RawInputs, serde_json::Error> {
    match event.get("body") {
        Some(Value::String(body)) if body.trim().is_empty() => Ok(RawInputs::default()),
        Some(Value::String(body)) => serde_json::from_str(body),
        Some(Value::Null) => Ok(RawInputs::default()),
        _ => serde_json::from_value(event),
    }
}

fn handle(event: Value) -> Value {
    let start = std::time::Instant::now();

    let method = event
        .pointer("/requestContext/http/method")
        .and_then(Value::as_str)
        .unwrap_or("POST");
    if method == "OPTIONS" {
        return response(200, String::new());
    }

    let raw = match parse_inputs(event) {
        Ok(raw) => raw,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    let result = match build_parameters(&raw).and_then(ProjectionEngine::new) {
        Ok(engine) => engine.project(),
        Err(e) => {
            warn!("rejected scenario: {}", e);
            return error_response(400, &e.to_string());
        }
    };

    let body = ProjectionResponse {
        result,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };
    info!("projection finished in {} ms", body.execution_time_ms);

    match serde_json::to_string(&body) {
        Ok(body) => response(200, body),
        Err(e) => error_response(500, &format!("Failed to serialize result: {}", e)),
    }
}

async fn handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    Ok(handle(event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

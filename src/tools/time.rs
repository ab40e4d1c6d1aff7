use anyhow::Result;
use chrono::{Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use super::Tool;

/// The time tool takes no parameters; anything sent is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TimeRequest {}

#[derive(Debug, Serialize)]
pub struct TimeResponse {
    pub utc: String,
    pub local: String,
    pub unix: i64,
}

/// Reports the current time.
pub struct TimeTool;

impl TimeTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Tool for TimeTool {
    type Input = TimeRequest;
    type Output = TimeResponse;

    fn name(&self) -> &str {
        "time"
    }

    fn description(&self) -> &str {
        "Current time as RFC 3339 (UTC and local) and Unix seconds"
    }

    async fn run(&self, _input: TimeRequest) -> Result<TimeResponse> {
        let now = Utc::now();
        Ok(TimeResponse {
            utc: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            local: now.with_timezone(&Local).to_rfc3339_opts(SecondsFormat::Secs, false),
            unix: now.timestamp(),
        })
    }
}

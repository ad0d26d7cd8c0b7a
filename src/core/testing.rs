use crate::domain::ports::{ControlMethod, ControlTransport};
use crate::utils::error::{ControlError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub method: ControlMethod,
    pub path: String,
    pub payload: Option<Value>,
}

/// 記錄所有呼叫的假傳輸層，可以針對特定路徑回傳非 2xx
#[derive(Default)]
pub(crate) struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    failures: Mutex<Vec<(ControlMethod, String, u16, String)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(self, method: ControlMethod, path: &str, status: u16, body: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .push((method, path.to_string(), status, body.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ControlTransport for RecordingTransport {
    async fn send(&self, method: ControlMethod, path: &str, payload: Option<&Value>) -> Result<()> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            payload: payload.cloned(),
        });

        let failures = self.failures.lock().unwrap();
        if let Some((_, _, status, body)) = failures
            .iter()
            .find(|(m, p, _, _)| *m == method && p == path)
        {
            return Err(ControlError::Protocol {
                operation: format!("{} {}", method, path),
                status: *status,
                body: body.clone(),
            });
        }
        Ok(())
    }
}

use crate::utils::error::{ControlError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Pact 檔案的寫入方式，整個 mock service 生命週期內有效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// 每次寫入都完整取代既有的 pact
    #[default]
    Overwrite,
    /// 將新的 interactions 合併進既有的 pact 檔案
    Update,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::Overwrite => "overwrite",
            WriteMode::Update => "update",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(WriteMode::Overwrite),
            "update" => Ok(WriteMode::Update),
            other => Err(ControlError::InvalidConfigValueError {
                field: "pact_file_write_mode".to_string(),
                value: other.to_string(),
                reason: "Valid modes: overwrite, update".to_string(),
            }),
        }
    }
}

/// mock service 的位置與 consumer/provider 身分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockServiceEndpoint {
    pub base_url: String,
    pub consumer: String,
    pub provider: String,
    pub write_mode: Option<WriteMode>,
}

impl MockServiceEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            consumer: String::new(),
            provider: String::new(),
            write_mode: None,
        }
    }

    pub fn with_consumer(mut self, consumer: impl Into<String>) -> Self {
        self.consumer = consumer.into();
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = Some(mode);
        self
    }

    /// 未設定時為 overwrite
    pub fn effective_write_mode(&self) -> WriteMode {
        self.write_mode.unwrap_or_default()
    }
}

/// 請求或回應中單一欄位的比對規則。
///
/// 序列化格式跟隨 mock service 的 JSON 約定 (`json_class`)，比對演算法本身由 mock service 負責。
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    Exact(Value),
    Like(Value),
    EachLike { contents: Value, min: usize },
    Term { generate: String, regex: String },
}

impl Matcher {
    pub fn exact(value: impl Into<Value>) -> Self {
        Matcher::Exact(value.into())
    }

    pub fn like(value: impl Into<Value>) -> Self {
        Matcher::Like(value.into())
    }

    pub fn each_like(contents: impl Into<Value>, min: usize) -> Self {
        Matcher::EachLike {
            contents: contents.into(),
            min: min.max(1),
        }
    }

    /// `generate` 必須符合 `regex`，否則 mock service 會產生無法驗證的範例
    pub fn term(generate: impl Into<String>, regex: impl Into<String>) -> Result<Self> {
        let generate = generate.into();
        let regex = regex.into();
        let compiled = Regex::new(&regex).map_err(|e| {
            ControlError::validation(format!("Invalid term regex '{}': {}", regex, e))
        })?;
        if !compiled.is_match(&generate) {
            return Err(ControlError::validation(format!(
                "Term example '{}' does not match regex '{}'",
                generate, regex
            )));
        }
        Ok(Matcher::Term { generate, regex })
    }

    pub fn to_value(&self) -> Value {
        match self {
            Matcher::Exact(value) => value.clone(),
            Matcher::Like(contents) => json!({
                "json_class": "Pact::SomethingLike",
                "contents": contents,
            }),
            Matcher::EachLike { contents, min } => json!({
                "json_class": "Pact::ArrayLike",
                "contents": contents,
                "min": min,
            }),
            Matcher::Term { generate, regex } => json!({
                "json_class": "Pact::Term",
                "data": {
                    "generate": generate,
                    "matcher": {
                        "json_class": "Regexp",
                        "o": 0,
                        "s": regex,
                    },
                },
            }),
        }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let class = value
            .get("json_class")
            .and_then(Value::as_str)
            .map(str::to_string);

        match class.as_deref() {
            Some("Pact::SomethingLike") => {
                let contents = value
                    .get("contents")
                    .cloned()
                    .ok_or_else(|| ControlError::validation("SomethingLike without contents"))?;
                Ok(Matcher::Like(contents))
            }
            Some("Pact::ArrayLike") => {
                let contents = value
                    .get("contents")
                    .cloned()
                    .ok_or_else(|| ControlError::validation("ArrayLike without contents"))?;
                let min = value.get("min").and_then(Value::as_u64).unwrap_or(1) as usize;
                Ok(Matcher::each_like(contents, min))
            }
            Some("Pact::Term") => {
                let data = value
                    .get("data")
                    .ok_or_else(|| ControlError::validation("Term without data"))?;
                let generate = data
                    .get("generate")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ControlError::validation("Term without generate"))?;
                let regex = data
                    .get("matcher")
                    .and_then(|m| m.get("s"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| ControlError::validation("Term without matcher"))?;
                // 載入時照原樣保留，regex 方言由 mock service 判斷
                Ok(Matcher::Term {
                    generate: generate.to_string(),
                    regex: regex.to_string(),
                })
            }
            _ => Ok(Matcher::Exact(value)),
        }
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        Matcher::Exact(Value::String(value.to_string()))
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        Matcher::Exact(Value::String(value))
    }
}

impl From<Matcher> for Value {
    fn from(matcher: Matcher) -> Self {
        matcher.to_value()
    }
}

impl Serialize for Matcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Matcher {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Matcher::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// 從 JSON 載入時與 `InteractionRequest::new` 一樣轉成大寫
fn uppercase_method<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    let method = String::deserialize(deserializer)?;
    Ok(method.to_ascii_uppercase())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRequest {
    #[serde(deserialize_with = "uppercase_method")]
    pub method: String,
    pub path: Matcher,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Matcher>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Matcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl InteractionRequest {
    pub fn new(method: &str, path: impl Into<Matcher>) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.into(),
            query: None,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<Matcher>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<Matcher>) -> Self {
        Self::new("POST", path)
    }

    pub fn query(mut self, query: impl Into<Matcher>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<Matcher>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Matcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl InteractionResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<Matcher>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// 一組預期的請求/回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub description: String,
    #[serde(
        rename = "providerState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_state: Option<String>,
    pub request: InteractionRequest,
    pub response: InteractionResponse,
}

impl Interaction {
    pub fn upon_receiving(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            provider_state: None,
            request: InteractionRequest::get("/"),
            response: InteractionResponse::new(200),
        }
    }

    pub fn given(mut self, provider_state: impl Into<String>) -> Self {
        self.provider_state = Some(provider_state.into());
        self
    }

    pub fn with_request(mut self, request: InteractionRequest) -> Self {
        self.request = request;
        self
    }

    pub fn will_respond_with(mut self, response: InteractionResponse) -> Self {
        self.response = response;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacticipant {
    pub name: String,
}

/// `POST /pact` 的內容：只有 consumer、provider 與寫入模式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PactFileRequest {
    pub consumer: Pacticipant,
    pub provider: Pacticipant,
    #[serde(rename = "pactFileWriteMode")]
    pub pact_file_write_mode: WriteMode,
}

impl PactFileRequest {
    pub fn from_endpoint(endpoint: &MockServiceEndpoint) -> Self {
        Self {
            consumer: Pacticipant {
                name: endpoint.consumer.clone(),
            },
            provider: Pacticipant {
                name: endpoint.provider.clone(),
            },
            pact_file_write_mode: endpoint.effective_write_mode(),
        }
    }
}

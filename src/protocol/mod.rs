//! JSON message contract between a host and the engine
//!
//! Hosts run pagination off their interaction thread (a Web Worker in the
//! browser, [`worker::PaginationWorker`] natively) and talk to it with tagged
//! JSON messages. Every paginate request carries a `requestId` that is echoed
//! back so responses can be matched in any order.

#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

use crate::error::{EngineError, Result};
use crate::model::{Element, ElementType, PageConfig, PaginationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use web_time::Instant;

/// Correlation id chosen by the host, a string or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Warm up the engine; required once before paginating
    Init,
    #[serde(rename_all = "camelCase")]
    Paginate {
        request_id: RequestId,
        elements: Vec<Element>,
        #[serde(default)]
        config: PageConfig,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Init {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Paginate {
        request_id: RequestId,
        result: PaginationResult,
    },
    /// Request failure; no `requestId` means the message itself was unreadable
    #[serde(rename_all = "camelCase")]
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<RequestId>,
        error: String,
    },
}

impl Response {
    pub fn error(request_id: Option<RequestId>, err: &EngineError) -> Self {
        Response::Error {
            request_id,
            error: err.to_string(),
        }
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            Response::Paginate { request_id, .. } => Some(request_id),
            Response::Error { request_id, .. } => request_id.as_ref(),
            Response::Init { .. } => None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            serde_json::json!({
                "type": "error",
                "error": format!("failed to encode response: {}", err),
            })
            .to_string()
        })
    }
}

type WarmUp = fn() -> Result<()>;

/// Engine state behind the message boundary
pub struct Engine {
    initialized: bool,
    warm_up: WarmUp,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_warm_up(warm_up)
    }

    fn with_warm_up(warm_up: WarmUp) -> Self {
        Self {
            initialized: false,
            warm_up,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the warm-up. May be retried after a failure.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        guarded(self.warm_up)?;
        self.initialized = true;
        debug!(version = crate::version(), "engine initialized");
        Ok(())
    }

    /// Paginate and stamp the wall-clock duration into the stats
    pub fn paginate(&self, elements: &[Element], config: &PageConfig) -> Result<PaginationResult> {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }
        let start = Instant::now();
        let mut result = guarded(|| crate::paginate(elements, config))?;
        result.stats.duration_micros = start.elapsed().as_micros() as u64;
        Ok(result)
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Init => match self.init() {
                Ok(()) => Response::Init {
                    success: true,
                    error: None,
                },
                Err(err) => {
                    warn!(error = %err, "engine initialization failed");
                    Response::Init {
                        success: false,
                        error: Some(err.to_string()),
                    }
                }
            },
            Request::Paginate {
                request_id,
                elements,
                config,
            } => match self.paginate(&elements, &config) {
                Ok(result) => {
                    debug!(
                        request = %request_id,
                        pages = result.stats.page_count,
                        micros = result.stats.duration_micros,
                        "request paginated"
                    );
                    Response::Paginate { request_id, result }
                }
                Err(err) => {
                    warn!(request = %request_id, error = %err, "request failed");
                    Response::error(Some(request_id), &err)
                }
            },
        }
    }

    /// Decode one message, handle it and encode the response
    pub fn handle_json(&mut self, message: &str) -> String {
        let response = match serde_json::from_str::<Request>(message) {
            Ok(request) => self.handle(request),
            Err(err) => {
                let err = EngineError::from(err);
                warn!(error = %err, "rejected message");
                Response::error(request_id_of(message), &err)
            }
        };
        response.to_json()
    }
}

/// Best-effort `requestId` of a message that failed to decode as a request
fn request_id_of(message: &str) -> Option<RequestId> {
    let value: serde_json::Value = serde_json::from_str(message).ok()?;
    serde_json::from_value(value.get("requestId")?.clone()).ok()
}

/// Paginate a small scene and check the outcome
fn warm_up() -> Result<()> {
    let elements = [
        Element::new("warm-up-1", ElementType::SceneHeading, "INT. ROOM - DAY"),
        Element::new("warm-up-2", ElementType::Action, "A test line."),
    ];
    let result = crate::paginate(&elements, &PageConfig::feature_film())?;
    if result.page_count() != 1 || result.element_positions.len() != elements.len() {
        return Err(EngineError::InitFailed {
            message: format!(
                "warm-up produced {} pages for {} elements",
                result.page_count(),
                result.element_positions.len()
            ),
        });
    }
    Ok(())
}

/// Turn a panic into an `Internal` error where unwinding is available
#[cfg(not(target_arch = "wasm32"))]
fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).unwrap_or_else(|panic| {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic during pagination".to_string());
        Err(EngineError::internal(message))
    })
}

#[cfg(target_arch = "wasm32")]
fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    f()
}

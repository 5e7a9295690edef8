//! Scripted provider and fakes for interpreter tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clonekit_bundle::{AssetSource, BundleLayout};
use clonekit_core::command::{Step, parse_response};
use clonekit_core::error::{BundleError, CaptureError, ProviderError};
use clonekit_core::message::{Conversation, Message, Role};
use clonekit_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use clonekit_core::snapshot::{PageCapture, PageSnapshot};
use clonekit_tools::Dispatcher;

/// Returns scripted results in order. Panics when the script runs out.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    request_sizes: Mutex<Vec<usize>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            request_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.request_sizes.lock().unwrap().len()
    }

    /// Message count of every request received.
    pub fn request_sizes(&self) -> Vec<usize> {
        self.request_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.request_sizes.lock().unwrap().push(request.messages.len());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedProvider: no more responses"));

        next.map(|text| ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: request.model,
        })
    }
}

pub struct FixedCapture;

#[async_trait]
impl PageCapture for FixedCapture {
    async fn capture(&self, url: &str) -> Result<PageSnapshot, CaptureError> {
        Ok(PageSnapshot {
            url: url.to_string(),
            title: "Fixture".into(),
            post_script_markup: "<main><h1>Fixture</h1></main>".into(),
            ..PageSnapshot::default()
        })
    }
}

pub struct NoAssets;

#[async_trait]
impl AssetSource for NoAssets {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BundleError> {
        Err(BundleError::Fetch {
            url: url.to_string(),
            reason: "HTTP 404".into(),
        })
    }
}

/// Dispatcher writing its bundle under `dir/website-clone`.
pub fn dispatcher_in(dir: &Path) -> Dispatcher {
    Dispatcher::new(
        Arc::new(FixedCapture),
        Arc::new(NoAssets),
        BundleLayout::new(dir.join("website-clone")),
    )
}

pub fn line(step: &str, content: &str) -> String {
    serde_json::json!({ "step": step, "content": content }).to_string()
}

pub fn tool_line(tool_name: &str, input: &str) -> String {
    serde_json::json!({
        "step": "TOOL",
        "content": "",
        "tool_name": tool_name,
        "input": input,
    })
    .to_string()
}

/// Contents of every OBSERVE the interpreter appended.
pub fn observe_messages(conversation: &Conversation) -> Vec<String> {
    conversation
        .messages()
        .iter()
        .filter(|m| m.role == Role::User)
        .flat_map(|m| parse_response(&m.content).commands)
        .filter(|c| c.step == Step::Observe)
        .map(|c| c.content)
        .collect()
}

//! The turn loop that drives the model through the command protocol.
//!
//! Each turn sends the (bounded) conversation to the provider, parses the
//! reply into commands and evaluates them in order. Nothing the model or a
//! tool does ends the loop except an OUTPUT command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clonekit_config::AppConfig;
use clonekit_core::command::{Command, Step, parse_response};
use clonekit_core::error::ProviderError;
use clonekit_core::message::{Conversation, Message};
use clonekit_core::provider::{Provider, ProviderRequest};
use clonekit_core::session::Session;
use clonekit_tools::{DispatchError, Dispatcher};
use tracing::{debug, info, warn};

use crate::history::HistoryPolicy;

/// Sent when a reply contains no parseable command.
pub const FORMAT_CORRECTION: &str =
    "Please respond in the correct JSON format with step, content, tool_name, and input fields.";

/// Sent after a failed completion request that was not about size.
pub const RETRY_INSTRUCTION: &str =
    "There was an error. Please try again with a clear website cloning request.";

const RAW_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    Output(String),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Content of the OUTPUT command.
    pub output: String,
    /// Where the bundle lives, when a page was analysed during the run.
    pub bundle_root: Option<PathBuf>,
    pub turns: usize,
}

pub struct Interpreter {
    provider: Arc<dyn Provider>,
    dispatcher: Dispatcher,
    history: HistoryPolicy,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    observe_limit: usize,
}

impl Interpreter {
    pub fn new(provider: Arc<dyn Provider>, dispatcher: Dispatcher, model: impl Into<String>) -> Self {
        Self {
            provider,
            dispatcher,
            history: HistoryPolicy::default(),
            model: model.into(),
            temperature: 0.1,
            max_tokens: Some(4000),
            observe_limit: 1000,
        }
    }

    /// Sampling settings, history thresholds and observation limit from `config`.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        dispatcher: Dispatcher,
        model: impl Into<String>,
    ) -> Self {
        Self::new(provider, dispatcher, model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_history_policy(HistoryPolicy::from(&config.agent))
            .with_observe_limit(config.agent.observe_limit)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_history_policy(mut self, history: HistoryPolicy) -> Self {
        self.history = history;
        self
    }

    /// Longest observation text fed back to the model, in characters.
    pub fn with_observe_limit(mut self, limit: usize) -> Self {
        self.observe_limit = limit;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run turns until the model emits OUTPUT.
    pub async fn run(&self, session: &mut Session, conversation: &mut Conversation) -> RunOutcome {
        let mut turns = 0;
        loop {
            turns += 1;
            debug!(turn = turns, conversation_id = %conversation.id, "Starting turn");

            if let TurnOutcome::Output(output) = self.run_turn(session, conversation).await {
                let bundle_root = session
                    .has_snapshot()
                    .then(|| self.dispatcher.layout().root().to_path_buf());
                info!(turns, "Agent finished");
                return RunOutcome {
                    output,
                    bundle_root,
                    turns,
                };
            }
        }
    }

    /// One request/response cycle.
    pub async fn run_turn(&self, session: &mut Session, conversation: &mut Conversation) -> TurnOutcome {
        self.history.bound(conversation);

        let request = ProviderRequest {
            model: self.model.clone(),
            messages: conversation.messages().to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                self.recover(conversation, e).await;
                return TurnOutcome::Continue;
            }
        };

        let reply = &response.message.content;
        let parsed = parse_response(reply);
        if parsed.rejected > 0 {
            debug!(rejected = parsed.rejected, "Dropped malformed command lines");
        }

        if parsed.is_empty() {
            let preview: String = reply.chars().take(RAW_PREVIEW_CHARS).collect();
            warn!(raw = %preview, "Reply contained no commands");
            conversation.push(Message::user(FORMAT_CORRECTION));
            return TurnOutcome::Continue;
        }

        for command in parsed.commands {
            conversation.push(Message::assistant(command.to_wire()));

            match command.step {
                Step::Start => info!(content = %command.content, "START"),
                Step::Think => info!(content = %command.content, "THINK"),
                Step::Observe => debug!("Ignoring OBSERVE written by the model"),
                Step::Tool => self.execute_tool(session, conversation, &command).await,
                Step::Output => {
                    info!(content = %command.content, "OUTPUT");
                    return TurnOutcome::Output(command.content);
                }
            }
        }

        TurnOutcome::Continue
    }

    async fn execute_tool(&self, session: &mut Session, conversation: &mut Conversation, command: &Command) {
        let Some(tool_name) = command.tool_name.as_deref() else {
            warn!("TOOL command without tool_name, skipping");
            return;
        };
        let input = command.input.as_deref().unwrap_or_default();

        match self.dispatcher.dispatch(session, tool_name, input).await {
            Ok(observation) => {
                let content = observation.into_observe_content(self.observe_limit);
                debug!(tool = tool_name, result = %content, "Observation");
                conversation.push(Message::user(Command::observe(content).to_wire()));
            }
            Err(e @ DispatchError::UnknownTool(_)) => warn!(error = %e, "No such tool, skipping"),
            Err(e @ DispatchError::MissingSnapshot { .. }) => {
                warn!(error = %e, "Tool needs an analysis first, skipping")
            }
        }
    }

    async fn recover(&self, conversation: &mut Conversation, error: ProviderError) {
        warn!(error = %error, "Completion request failed");

        if error.is_payload_too_large() {
            self.history.reset(conversation);
            return;
        }

        if let ProviderError::RateLimited { retry_after_secs } = error {
            tokio::time::sleep(Duration::from_secs(retry_after_secs)).await;
        }
        conversation.push(Message::user(RETRY_INSTRUCTION));
    }
}

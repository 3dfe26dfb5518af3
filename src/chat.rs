//! Assistant conversation
//!
//! Keeps the message history, assembles prompts that embed the current health
//! status, and hands them to an external text generator.

use crate::error::ComputeError;
use crate::store::MetricStore;
use crate::summary::latest_status_line;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default assistant instructions
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a concise, no-fluff health assistant. Use the provided health data to respond clearly and directly. Always reference actual numbers (e.g., 'You've walked 0 steps today'). Keep responses under 2 sentences. Avoid general advice unless directly asked. Do not use markdown, emojis, or filler phrases. Do not repeat motivational language unless necessary.";

/// Reply used when the generator fails or returns nothing
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response.";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
        }
    }

    fn transcript_line(&self) -> String {
        match self.role {
            Role::User => format!("User: {}", self.text),
            Role::Assistant => format!("Assistant: {}", self.text),
        }
    }
}

/// External text generator that completes a prompt
pub trait InsightService {
    fn complete(&self, prompt: &str) -> Result<String, ComputeError>;
}

/// Generator backed by an external program: the prompt goes to its stdin and
/// the reply is read from its stdout
#[derive(Debug, Clone)]
pub struct CommandInsight {
    program: String,
    args: Vec<String>,
}

impl CommandInsight {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line into program and arguments
    pub fn from_command_line(command: &str) -> Result<Self, ComputeError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| ComputeError::InsightError("empty insight command".to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }
}

impl InsightService for CommandInsight {
    fn complete(&self, prompt: &str) -> Result<String, ComputeError> {
        debug!(program = %self.program, "running insight command");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Stdin is fed concurrently with draining stdout and stderr
        let writer = child.stdin.take().map(|mut stdin| {
            let input = prompt.as_bytes().to_vec();
            thread::spawn(move || stdin.write_all(&input))
        });

        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => {
                    debug!(program = %self.program, "insight command closed stdin early");
                }
                Ok(Err(err)) => return Err(err.into()),
                Err(_) => {
                    return Err(ComputeError::InsightError(format!(
                        "stdin writer for {} panicked",
                        self.program
                    )))
                }
            }
        }
        if !output.status.success() {
            return Err(ComputeError::InsightError(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Offline generator that answers every prompt with a fixed status line
#[derive(Debug, Clone)]
pub struct StatusInsight {
    status: String,
}

impl StatusInsight {
    pub fn from_store(store: &MetricStore) -> Self {
        Self {
            status: latest_status_line(store),
        }
    }
}

impl InsightService for StatusInsight {
    fn complete(&self, _prompt: &str) -> Result<String, ComputeError> {
        Ok(self.status.clone())
    }
}

/// Conversation state for one chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    system_prompt: String,
    messages: Vec<ChatMessage>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
        }
    }

    /// Seed a fresh conversation with the status line as the opening message
    pub fn open(&mut self, store: &MetricStore) {
        if self.messages.is_empty() {
            self.messages
                .push(ChatMessage::new(Role::Assistant, latest_status_line(store)));
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Full prompt for the next assistant turn
    pub fn build_prompt(&self, store: &MetricStore) -> String {
        let health_context = format!("User's Health Summary:\n{}", latest_status_line(store));
        let history = self
            .messages
            .iter()
            .map(ChatMessage::transcript_line)
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\n\n{}\n\n{}\nAssistant:",
            self.system_prompt, health_context, history
        )
    }

    /// Record the user's input and the assistant's reply.
    ///
    /// Blank input is ignored and returns `None`. Generator failures are
    /// logged and answered with the fallback reply.
    pub fn send(
        &mut self,
        input: &str,
        store: &MetricStore,
        service: &dyn InsightService,
    ) -> Option<&ChatMessage> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::new(Role::User, trimmed));
        let prompt = self.build_prompt(store);

        let reply = match service.complete(&prompt) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("insight service returned an empty reply");
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                warn!(error = %e, "insight service failed");
                FALLBACK_REPLY.to_string()
            }
        };

        self.messages.push(ChatMessage::new(Role::Assistant, reply));
        self.messages.last()
    }
}

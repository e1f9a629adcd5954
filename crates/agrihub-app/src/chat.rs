// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Duration;

use time::OffsetDateTime;

use crate::Generation;

pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Sorry, I encountered an error connecting to the server. Please try again.";
pub const SERVER_FAILURE_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";
pub const DECODE_FAILURE_MESSAGE: &str =
    "Sorry, I encountered an error processing the response. Please try again.";

/// Canned questions offered under the chat input.
pub const SUGGESTIONS: [&str; 4] = [
    "Which crops grow best in the kharif season?",
    "How can I improve soil fertility naturally?",
    "What fertilizer should I use for wheat?",
    "How do I control pests without chemicals?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatEndpoint {
    Ask,
    #[default]
    ChatbotAsk,
}

impl ChatEndpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Ask => "ask",
            Self::ChatbotAsk => "chatbot/ask",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().trim_start_matches('/') {
            "ask" => Some(Self::Ask),
            "chatbot/ask" => Some(Self::ChatbotAsk),
            _ => None,
        }
    }

    /// The chatbot page holds the typing indicator for a second before
    /// showing the reply; the bare endpoint shows it immediately.
    pub const fn default_typing_delay(self) -> Duration {
        match self {
            Self::Ask => Duration::ZERO,
            Self::ChatbotAsk => Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

impl ChatRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "you",
            Self::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub body: String,
    pub sent_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub generation: Generation,
    pub message: String,
}

/// Why a chat request produced no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatFailure {
    Transport,
    Server {
        response: Option<String>,
        error_details: Option<String>,
        debug: bool,
    },
    Decode,
}

impl ChatFailure {
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport => TRANSPORT_FAILURE_MESSAGE.to_owned(),
            Self::Server {
                error_details: Some(details),
                debug: true,
                ..
            } => format!("Error: {details}"),
            Self::Server {
                response: Some(response),
                ..
            } if !response.trim().is_empty() => response.clone(),
            Self::Server { .. } => SERVER_FAILURE_MESSAGE.to_owned(),
            Self::Decode => DECODE_FAILURE_MESSAGE.to_owned(),
        }
    }
}

pub type ChatReply = std::result::Result<String, ChatFailure>;

#[derive(Debug, Clone, Default)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    pending: Option<Generation>,
    generation: Generation,
}

impl ChatTranscript {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether the typing indicator is showing.
    pub fn typing(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<Generation> {
        self.pending
    }

    /// Record the user's message and open a request for it. Blank input
    /// is ignored. A newer request supersedes any outstanding one.
    pub fn begin(&mut self, input: &str, now: OffsetDateTime) -> Option<ChatRequest> {
        let message = input.trim();
        if message.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage {
            role: ChatRole::User,
            body: message.to_owned(),
            sent_at: now,
        });
        self.generation = self.generation.next();
        self.pending = Some(self.generation);
        Some(ChatRequest {
            generation: self.generation,
            message: message.to_owned(),
        })
    }

    /// Apply a reply. Returns `false` when the reply is stale and was dropped.
    pub fn resolve(&mut self, generation: Generation, reply: ChatReply, now: OffsetDateTime) -> bool {
        if self.pending != Some(generation) {
            tracing::debug!(
                generation = generation.get(),
                latest = self.generation.get(),
                "dropping stale chat reply"
            );
            return false;
        }

        let body = match reply {
            Ok(text) => text,
            Err(failure) => {
                tracing::warn!(?failure, "chat request failed");
                failure.user_message()
            }
        };
        self.pending = None;
        self.messages.push(ChatMessage {
            role: ChatRole::Bot,
            body,
            sent_at: now,
        });
        true
    }
}

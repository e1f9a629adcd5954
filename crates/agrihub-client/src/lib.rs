// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Blocking HTTP client for the agrihub server: chat, soil assessment and
//! the crop catalogue.

use std::time::Duration;

use agrihub_app::{
    AssessmentFailure, ChatEndpoint, ChatFailure, Crop, CropId, SoilAssessment, SoilReading,
};
use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::blocking::multipart::Form;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("cannot reach {base_url} -- start the agrihub server or fix server.base_url ({source})")]
    Transport {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("build request URL for {path:?}: {source}")]
    Url {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("server error ({status}): {message}")]
    Server {
        status: u16,
        message: String,
        response: Option<String>,
        error_details: Option<String>,
        debug: bool,
    },
    #[error("prediction rejected: {0}")]
    Rejected(String),
    #[error("decode {what}: {detail}")]
    Decode { what: &'static str, detail: String },
}

impl From<ClientError> for ChatFailure {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Transport { .. } | ClientError::Url { .. } => Self::Transport,
            ClientError::Server {
                response,
                error_details,
                debug,
                ..
            } => Self::Server {
                response,
                error_details,
                debug,
            },
            ClientError::Rejected(message) => Self::Server {
                response: Some(message),
                error_details: None,
                debug: false,
            },
            ClientError::Decode { .. } => Self::Decode,
        }
    }
}

impl From<ClientError> for AssessmentFailure {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Rejected(message) => Self::Rejected(message),
            _ => Self::Unavailable,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let mut parsed = Url::parse(trimmed).with_context(|| {
            format!("parse server.base_url {trimmed:?} -- use a URL like http://localhost:5000")
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "server.base_url must use http or https, got {:?} -- use a URL like http://localhost:5000",
                parsed.scheme()
            );
        }
        if timeout.is_zero() {
            bail!("server.timeout must be positive");
        }
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url: parsed,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a chat message and return the bot's answer.
    pub fn ask(&self, endpoint: ChatEndpoint, message: &str) -> Result<String, ClientError> {
        let url = self.endpoint(endpoint.path())?;
        tracing::debug!(%url, "sending chat message");
        let response = self
            .http
            .post(url)
            .json(&AskRequest { message })
            .send()
            .map_err(|error| self.transport(error))?;

        let status = response.status();
        let body = response.text().map_err(|error| self.transport(error))?;
        if !status.is_success() {
            return Err(chat_error_response(status, &body));
        }

        let parsed: AskResponse = decode("chat response", &body)?;
        Ok(parsed.response)
    }

    /// Post a soil reading as multipart form data to `/predict`.
    pub fn predict(&self, reading: &SoilReading) -> Result<SoilAssessment, ClientError> {
        let url = self.endpoint("predict")?;
        let form = reading
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        tracing::debug!(%url, "submitting soil reading");
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .map_err(|error| self.transport(error))?;

        let status = response.status();
        let body = response.text().map_err(|error| self.transport(error))?;
        let parsed: PredictResponse = decode("prediction response", &body)?;
        if !parsed.success {
            let message = parsed
                .error
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| format!("server returned {}", status.as_u16()));
            return Err(ClientError::Rejected(message));
        }
        parsed.result.ok_or_else(|| ClientError::Decode {
            what: "prediction response",
            detail: "success without a result".to_owned(),
        })
    }

    pub fn list_crops(&self) -> Result<Vec<Crop>, ClientError> {
        let url = self.endpoint("api/crops")?;
        self.get_json(url, "crop list")
    }

    /// Fetch the subset of crops named by `ids`.
    pub fn compare_crops(&self, ids: &[CropId]) -> Result<Vec<Crop>, ClientError> {
        let mut url = self.endpoint("api/compare")?;
        {
            let mut query = url.query_pairs_mut();
            for id in ids {
                query.append_pair("crop_ids", &id.get().to_string());
            }
        }
        self.get_json(url, "crop comparison")
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, what: &'static str) -> Result<T, ClientError> {
        tracing::debug!(%url, "fetching {what}");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| self.transport(error))?;

        let status = response.status();
        let body = response.text().map_err(|error| self.transport(error))?;
        if !status.is_success() {
            return Err(clean_error_response(status, &body));
        }
        decode(what, &body)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url.join(path).map_err(|source| ClientError::Url {
            path: path.to_owned(),
            source,
        })
    }

    fn transport(&self, source: reqwest::Error) -> ClientError {
        ClientError::Transport {
            base_url: self.base_url().to_owned(),
            source,
        }
    }
}

fn decode<T: DeserializeOwned>(what: &'static str, body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|error| ClientError::Decode {
        what,
        detail: error.to_string(),
    })
}

/// Chat errors carry their own envelope; a body that is not JSON at all
/// counts as a decode failure, matching what the chat page shows.
fn chat_error_response(status: StatusCode, body: &str) -> ClientError {
    let envelope: ErrorEnvelope = match decode("chat error response", body) {
        Ok(envelope) => envelope,
        Err(error) => return error,
    };
    let message = envelope
        .error
        .clone()
        .or_else(|| envelope.error_details.clone())
        .or_else(|| envelope.response.clone())
        .unwrap_or_else(|| "no details".to_owned());
    ClientError::Server {
        status: status.as_u16(),
        message,
        response: envelope.response,
        error_details: envelope.error_details,
        debug: envelope.debug.unwrap_or(false),
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: Some(error), ..
        }) if !error.is_empty() => error,
        _ if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() => {
            body.trim().to_owned()
        }
        _ => format!("server returned {}", status.as_u16()),
    };
    ClientError::Server {
        status: status.as_u16(),
        message,
        response: None,
        error_details: None,
        debug: false,
    }
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_details: Option<String>,
    #[serde(default)]
    debug: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<SoilAssessment>,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{ClientError, chat_error_response, clean_error_response};
    use agrihub_app::{AssessmentFailure, ChatFailure};
    use reqwest::StatusCode;

    #[test]
    fn chat_error_keeps_debug_details() {
        let error = chat_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"response":"Sorry","error_details":"quota exceeded","debug":true}"#,
        );
        assert_eq!(error.to_string(), "server error (500): quota exceeded");
        assert_eq!(
            ChatFailure::from(error).user_message(),
            "Error: quota exceeded"
        );
    }

    #[test]
    fn chat_error_with_plain_body_is_a_decode_failure() {
        let error = chat_error_response(StatusCode::BAD_GATEWAY, "Bad Gateway");
        assert!(matches!(error, ClientError::Decode { .. }));
        assert_eq!(ChatFailure::from(error), ChatFailure::Decode);
    }

    #[test]
    fn clean_error_prefers_error_field_then_short_text() {
        let json = clean_error_response(StatusCode::NOT_FOUND, r#"{"error":"no such crop"}"#);
        assert_eq!(json.to_string(), "server error (404): no such crop");

        let text = clean_error_response(StatusCode::NOT_FOUND, "Crop not found");
        assert_eq!(text.to_string(), "server error (404): Crop not found");

        let opaque = clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, "{\"trace\":[1,2]}");
        assert_eq!(opaque.to_string(), "server error (500): server returned 500");
    }

    #[test]
    fn rejected_prediction_maps_to_assessment_failure() {
        let failure = AssessmentFailure::from(ClientError::Rejected("bad ph".to_owned()));
        assert_eq!(failure.user_message(), "Error: bad ph");

        let decode = AssessmentFailure::from(ClientError::Decode {
            what: "prediction response",
            detail: "eof".to_owned(),
        });
        assert_eq!(decode, AssessmentFailure::Unavailable);
    }
}

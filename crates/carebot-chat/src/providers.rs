//! External LLM provider calls.
//!
//! Every provider answers over SSE. The transport loop is shared; each
//! provider only supplies how a `data:` payload maps to a token.

use std::pin::Pin;

use carebot_core::{Error, Result};
use futures::Stream;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::config::ResolvedProvider;
use crate::types::{ChatMessage, LLMProvider};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token, the end marker, or an error.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// Generation knobs shared by all providers.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 600,
        }
    }
}

/// What one SSE `data:` payload means for the stream.
#[derive(Debug, PartialEq)]
enum SseEvent {
    Token(String),
    Done,
    Error(String),
    Skip,
}

/// Stream tokens from the resolved provider.
pub fn stream_llm(
    client: &Client,
    resolved: &ResolvedProvider,
    messages: Vec<ChatMessage>,
    params: GenerationParams,
) -> BoxedStream {
    let model = resolved.model.clone();
    let key = resolved.api_key.as_str();

    match resolved.provider {
        LLMProvider::OpenAI | LLMProvider::Groq => {
            let url = if resolved.provider == LLMProvider::OpenAI {
                OPENAI_URL
            } else {
                GROQ_URL
            };
            let msgs: Vec<Value> = messages
                .iter()
                .map(|m| json!({"role": m.role, "content": m.content}))
                .collect();
            let request = client
                .post(url)
                .bearer_auth(key)
                .json(&json!({
                    "model": model,
                    "messages": msgs,
                    "temperature": params.temperature,
                    "max_tokens": params.max_tokens,
                    "stream": true,
                }));
            Box::pin(stream_sse(request, url.to_string(), parse_openai_event))
        }
        LLMProvider::Anthropic => {
            let system = system_prompt(&messages);
            let conv: Vec<Value> = messages
                .iter()
                .filter(|m| m.role != "system")
                .map(|m| json!({"role": m.role, "content": m.content}))
                .collect();
            let mut body = json!({
                "model": model,
                "messages": conv,
                "temperature": params.temperature,
                "max_tokens": params.max_tokens,
                "stream": true,
            });
            if let Some(sys) = system {
                body["system"] = json!(sys);
            }
            let request = client
                .post(ANTHROPIC_URL)
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body);
            Box::pin(stream_sse(request, ANTHROPIC_URL.to_string(), parse_anthropic_event))
        }
        LLMProvider::Gemini => {
            let url = format!("{}/{}:streamGenerateContent?alt=sse", GEMINI_BASE, model);
            let request = client
                .post(&url)
                .header("x-goog-api-key", key)
                .json(&gemini_body(&messages, params));
            Box::pin(stream_sse(request, url, parse_gemini_event))
        }
    }
}

fn system_prompt(messages: &[ChatMessage]) -> Option<String> {
    messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.clone())
}

/// Gemini request body: `assistant` turns become `model`, the system turn
/// becomes `systemInstruction`.
fn gemini_body(messages: &[ChatMessage], params: GenerationParams) -> Value {
    let contents: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| {
            let role = if m.role == "assistant" { "model" } else { "user" };
            json!({"role": role, "parts": [{"text": m.content}]})
        })
        .collect();

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": params.temperature,
            "maxOutputTokens": params.max_tokens,
        },
    });
    if let Some(sys) = system_prompt(messages) {
        body["systemInstruction"] = json!({"parts": [{"text": sys}]});
    }
    body
}

fn parse_openai_event(parsed: &Value) -> SseEvent {
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return SseEvent::Error(msg.to_string());
    }
    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => SseEvent::Token(content.to_string()),
        _ => SseEvent::Skip,
    }
}

fn parse_anthropic_event(parsed: &Value) -> SseEvent {
    match parsed["type"].as_str() {
        Some("content_block_delta") => match parsed["delta"]["text"].as_str() {
            Some(text) if !text.is_empty() => SseEvent::Token(text.to_string()),
            _ => SseEvent::Skip,
        },
        Some("message_stop") => SseEvent::Done,
        Some("error") => SseEvent::Error(
            parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
        _ => SseEvent::Skip,
    }
}

fn parse_gemini_event(parsed: &Value) -> SseEvent {
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return SseEvent::Error(msg.to_string());
    }
    let text: String = parsed["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .concat()
        })
        .unwrap_or_default();

    if !text.is_empty() {
        SseEvent::Token(text)
    } else if parsed["promptFeedback"]["blockReason"].is_string() {
        SseEvent::Error("Prompt blocked by safety filters".into())
    } else {
        SseEvent::Skip
    }
}

/// Send `request` and turn its SSE body into [`StreamChunk`]s.
fn stream_sse(
    request: RequestBuilder,
    label: String,
    parse: fn(&Value) -> SseEvent,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        debug!("Streaming from {}", label);

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim().to_string();
                buffer.drain(..=line_end);

                let Some(data) = line.strip_prefix("data:").map(str::trim) else {
                    continue;
                };
                if data == "[DONE]" {
                    yield StreamChunk::Done { tokens_used: token_count };
                    return;
                }
                let Ok(parsed) = serde_json::from_str::<Value>(data) else {
                    continue;
                };

                match parse(&parsed) {
                    SseEvent::Token(text) => {
                        token_count += 1;
                        yield StreamChunk::Token(text);
                    }
                    SseEvent::Done => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                    SseEvent::Error(msg) => {
                        error!("{} error: {}", label, msg);
                        yield StreamChunk::Error(msg);
                        return;
                    }
                    SseEvent::Skip => {}
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

/// Drain a stream into the full answer text.
pub async fn collect_stream(mut stream: BoxedStream) -> Result<String> {
    let mut answer = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(text) => answer.push_str(&text),
            StreamChunk::Done { .. } => break,
            StreamChunk::Error(msg) => return Err(Error::Delegate(msg)),
        }
    }
    let answer = answer.trim().to_string();
    if answer.is_empty() {
        return Err(Error::Delegate("Empty response from provider".into()));
    }
    Ok(answer)
}

/// One-shot completion: stream and collect.
pub async fn complete(
    client: &Client,
    resolved: &ResolvedProvider,
    messages: Vec<ChatMessage>,
    params: GenerationParams,
) -> Result<String> {
    collect_stream(stream_llm(client, resolved, messages, params)).await
}

/// Check an API key with the cheapest request each provider offers.
pub async fn test_api_key(provider: &str, api_key: &str) -> Result<()> {
    let provider = LLMProvider::parse(provider)
        .ok_or_else(|| Error::Config(format!("Unknown provider: {}", provider)))?;
    let client = Client::new();

    let request = match provider {
        LLMProvider::OpenAI => client.get("https://api.openai.com/v1/models").bearer_auth(api_key),
        LLMProvider::Groq => client
            .get("https://api.groq.com/openai/v1/models")
            .bearer_auth(api_key),
        LLMProvider::Gemini => client.get(GEMINI_BASE).header("x-goog-api-key", api_key),
        LLMProvider::Anthropic => client
            .post(ANTHROPIC_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": crate::config::DEFAULT_ANTHROPIC_MODEL,
                "max_tokens": 1,
                "messages": [{"role": "user", "content": "Hi"}],
            })),
    };

    let resp = request
        .send()
        .await
        .map_err(|e| Error::Http(e.to_string()))?;
    let status = resp.status();
    // Anthropic answers 400 for quota/model problems on an otherwise valid key
    if status.is_success() || (provider == LLMProvider::Anthropic && status.as_u16() == 400) {
        Ok(())
    } else {
        Err(Error::Http(format!("API returned status {}", status)))
    }
}

//! OpenAI-compatible chat completion wire layer.

mod http;

pub use http::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, HttpTransport,
    TransportError, DEFAULT_BASE_URL,
};

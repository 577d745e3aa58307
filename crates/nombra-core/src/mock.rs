//! Hand-rolled test doubles for [`PdfBackend`] and [`TitleGenerator`].

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, PdfBackend};
use crate::llm::{TitleError, TitleGenerator};

/// A configurable mock response for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this text (may be empty).
    Text(String),
    /// Fail with [`BackendError::OpenError`] carrying this message.
    Error(String),
}

/// A mock extraction backend.
///
/// Supports a fixed response or a sequence (one per call, repeating the
/// last once exhausted), and counts calls.
pub struct MockBackend {
    name: &'static str,
    responses: Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    call_count: AtomicUsize,
}

impl MockBackend {
    /// Create a mock that always returns `response`.
    pub fn new(name: &'static str, response: MockResponse) -> Self {
        Self {
            name,
            responses: Mutex::new(Vec::new()),
            fallback: response,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(name: &'static str, mut responses: Vec<MockResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        let fallback = responses[responses.len() - 1].clone();
        responses.reverse();
        Self {
            name,
            responses: Mutex::new(responses),
            fallback,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `extract_text()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> MockResponse {
        let mut seq = self.responses.lock().unwrap();
        seq.pop().unwrap_or_else(|| self.fallback.clone())
    }
}

impl PdfBackend for MockBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn extract_text(&self, _path: &Path) -> Result<String, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.next_response() {
            MockResponse::Text(text) => Ok(text),
            MockResponse::Error(message) => Err(BackendError::OpenError(message)),
        }
    }
}

/// A mock title generator that returns a fixed answer and records the
/// content it was asked about.
pub struct MockTitleGenerator {
    answer: Result<String, String>,
    seen: Mutex<Vec<String>>,
}

impl MockTitleGenerator {
    /// Always answer with `title`.
    pub fn answering(title: &str) -> Self {
        Self {
            answer: Ok(title.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with an API error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Every content string passed to `generate()`, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl TitleGenerator for MockTitleGenerator {
    fn generate<'a>(
        &'a self,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TitleError>> + Send + 'a>> {
        self.seen.lock().unwrap().push(content.to_string());
        let answer = self.answer.clone();
        Box::pin(async move {
            answer.map_err(|message| TitleError::Api {
                status: 500,
                message,
            })
        })
    }
}

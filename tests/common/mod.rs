//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use notewise_core::{
    error::{NotewiseError, Result},
    DefinitionEntry, DefinitionRequest, InferenceRequest, InferenceService, TransformBackend,
    TransformRequest, TransformResult,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Responder = Box<dyn Fn(&InferenceRequest) -> Result<String> + Send + Sync>;

/// Inference stub answering from a script instead of the network
pub struct ScriptedInference {
    replies: Mutex<VecDeque<Responder>>,
    fallback: Responder,
    requests: Mutex<Vec<InferenceRequest>>,
    credentials: bool,
}

impl ScriptedInference {
    /// Every call gets `reply`
    pub fn replying(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::with_fallback(Box::new(move |_: &InferenceRequest| Ok(reply.clone())))
    }

    /// Every call fails with the error built by `make_error`
    pub fn failing<F>(make_error: F) -> Self
    where
        F: Fn() -> NotewiseError + Send + Sync + 'static,
    {
        Self::with_fallback(Box::new(move |_: &InferenceRequest| Err(make_error())))
    }

    /// Stub that reports no credential; any call is a test failure
    pub fn without_credentials() -> Self {
        let mut stub = Self::with_fallback(Box::new(|_: &InferenceRequest| -> Result<String> {
            panic!("inference must not be called without credentials")
        }));
        stub.credentials = false;
        stub
    }

    fn with_fallback(fallback: Responder) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback,
            requests: Mutex::new(Vec::new()),
            credentials: true,
        }
    }

    /// Queue a one-off reply ahead of the fallback
    pub fn then_reply(self, reply: &str) -> Self {
        let reply = reply.to_string();
        self.replies
            .lock()
            .unwrap()
            .push_back(Box::new(move |_: &InferenceRequest| Ok(reply.clone())));
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl InferenceService for ScriptedInference {
    async fn complete(&self, request: InferenceRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        let queued = self.replies.lock().unwrap().pop_front();
        match queued {
            Some(responder) => responder(&request),
            None => (self.fallback)(&request),
        }
    }

    fn has_credentials(&self) -> bool {
        self.credentials
    }
}

/// Backend stub with per-text highlights and per-term failure or gating
#[derive(Default)]
pub struct ScriptedBackend {
    highlights: HashMap<String, Vec<String>>,
    failing_terms: HashSet<String>,
    gates: HashMap<String, Arc<Notify>>,
    transform_error: Option<fn() -> NotewiseError>,
    define_calls: AtomicUsize,
    contexts: Mutex<Vec<String>>,
    /// Signalled whenever a definition lookup starts
    pub define_started: Notify,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transforming `text` yields `terms` as highlights
    pub fn with_highlights(mut self, text: &str, terms: &[&str]) -> Self {
        self.highlights.insert(
            text.to_string(),
            terms.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// Lookups for `term` fail
    pub fn failing_term(mut self, term: &str) -> Self {
        self.failing_terms.insert(term.to_string());
        self
    }

    /// Lookups for `term` wait until `gate` is notified
    pub fn gated_term(mut self, term: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(term.to_string(), gate);
        self
    }

    /// Every transform fails
    pub fn failing_transform(mut self, make_error: fn() -> NotewiseError) -> Self {
        self.transform_error = Some(make_error);
        self
    }

    pub fn define_calls(&self) -> usize {
        self.define_calls.load(Ordering::SeqCst)
    }

    /// Context strings received by definition lookups
    pub fn contexts(&self) -> Vec<String> {
        self.contexts.lock().unwrap().clone()
    }
}

/// Definition text the stub returns for `term`
pub fn definition_of(term: &str) -> String {
    format!("definition of {}", term)
}

#[async_trait]
impl TransformBackend for ScriptedBackend {
    async fn transform(&self, request: TransformRequest) -> Result<TransformResult> {
        if let Some(make_error) = self.transform_error {
            return Err(make_error());
        }
        Ok(TransformResult {
            formatted_text: request.text.clone(),
            highlights: self
                .highlights
                .get(&request.text)
                .cloned()
                .unwrap_or_default(),
            comments: vec!["Review this section".to_string()],
        })
    }

    async fn define(&self, request: DefinitionRequest) -> Result<DefinitionEntry> {
        self.define_calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(request.context.clone());
        self.define_started.notify_one();

        if let Some(gate) = self.gates.get(&request.term) {
            gate.notified().await;
        }
        if self.failing_terms.contains(&request.term) {
            return Err(NotewiseError::Upstream("lookup failed".to_string()));
        }
        Ok(DefinitionEntry {
            definition: definition_of(&request.term),
            term: request.term,
        })
    }
}

/// Well-formed transform reply in the shape the model is asked for
pub fn model_reply(formatted: &str, highlights: &[&str], comments: &[&str]) -> String {
    serde_json::json!({
        "formattedText": formatted,
        "highlights": highlights,
        "comments": comments,
    })
    .to_string()
}

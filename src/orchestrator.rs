//! Client-side transform orchestration
//!
//! Owns the option switches, runs a transform through a [`TransformBackend`],
//! then fans out one definition lookup per distinct key term and fans back in
//! once every lookup has settled. Two state machines are tracked:
//!
//! ```text
//! Idle -> Transforming -> Succeeded | Failed
//! DefinitionsIdle -> DefinitionsLoading -> DefinitionsReady
//! ```
//!
//! Every transform (and every note switch) starts a new generation. A batch
//! only writes the definition cache if its generation is still current when
//! it completes; results of superseded batches are dropped. In-flight lookups
//! are not cancelled.

use crate::client::TransformBackend;
use crate::error::Result;
use crate::highlight::highlight_terms;
use crate::types::{
    DefinitionEntry, DefinitionRequest, NoteId, TransformOption, TransformOptions,
    TransformRequest, TransformResult,
};
use crate::utils::string::dedup_preserving_order;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Shown in place of a definition whose lookup failed
pub const DEFINITION_FALLBACK: &str = "Failed to load definition";

/// Transform state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformPhase {
    Idle,
    Transforming,
    Succeeded,
    Failed,
}

/// Definition batch state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionsPhase {
    Idle,
    Loading,
    Ready,
}

/// Term → definition mapping for one transform cycle.
///
/// Keys are the exact, case-sensitive strings emitted by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionCache {
    entries: HashMap<String, String>,
}

impl DefinitionCache {
    pub fn get(&self, term: &str) -> Option<&str> {
        self.entries.get(term).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached terms, in no particular order
    pub fn terms(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Sorted copy of the entries
    pub fn to_sorted(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Outcome of selecting a term for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionLookup {
    Ready(String),
    /// The current batch has not resolved yet
    Loading,
    /// No entry and no batch in flight
    Absent,
}

/// Read-only view of the orchestrator
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorSnapshot {
    pub generation: u64,
    pub note_id: Option<NoteId>,
    pub options: TransformOptions,
    pub phase: TransformPhase,
    pub definitions_phase: DefinitionsPhase,
    pub result: Option<TransformResult>,
    pub error: Option<String>,
    pub definitions: BTreeMap<String, String>,
}

struct OrchestratorState {
    generation: u64,
    note_id: Option<NoteId>,
    options: TransformOptions,
    phase: TransformPhase,
    definitions_phase: DefinitionsPhase,
    result: Option<TransformResult>,
    error: Option<String>,
    cache: DefinitionCache,
}

impl OrchestratorState {
    /// Start a new generation with nothing adopted yet
    fn reset(&mut self, phase: TransformPhase) -> u64 {
        self.generation += 1;
        self.phase = phase;
        self.definitions_phase = DefinitionsPhase::Idle;
        self.result = None;
        self.error = None;
        self.cache = DefinitionCache::default();
        self.generation
    }
}

/// Drives transforms and definition batches for one editing session
pub struct TransformOrchestrator {
    backend: Arc<dyn TransformBackend>,
    state: RwLock<OrchestratorState>,
}

impl TransformOrchestrator {
    pub fn new(backend: Arc<dyn TransformBackend>) -> Self {
        Self::with_options(backend, TransformOptions::default())
    }

    pub fn with_options(backend: Arc<dyn TransformBackend>, options: TransformOptions) -> Self {
        Self {
            backend,
            state: RwLock::new(OrchestratorState {
                generation: 0,
                note_id: None,
                options,
                phase: TransformPhase::Idle,
                definitions_phase: DefinitionsPhase::Idle,
                result: None,
                error: None,
                cache: DefinitionCache::default(),
            }),
        }
    }

    pub async fn options(&self) -> TransformOptions {
        self.state.read().await.options
    }

    pub async fn set_options(&self, options: TransformOptions) {
        self.state.write().await.options = options;
    }

    pub async fn set_option(&self, option: TransformOption, enabled: bool) {
        self.state.write().await.options.set(option, enabled);
    }

    /// Flip one switch and return its new value
    pub async fn toggle_option(&self, option: TransformOption) -> bool {
        self.state.write().await.options.toggle(option)
    }

    /// Make `note_id` the active note, discarding everything from the last one
    pub async fn switch_note(&self, note_id: Option<NoteId>) {
        let mut state = self.state.write().await;
        let generation = state.reset(TransformPhase::Idle);
        state.note_id = note_id;
        debug!("Switched note (generation {})", generation);
    }

    /// Transform `text` with the current options.
    ///
    /// Returns once the transform and, when key terms were requested, the
    /// whole definition batch have settled. If a newer transform or note
    /// switch started meanwhile, the result is returned but not adopted.
    pub async fn transform(&self, text: &str) -> Result<TransformResult> {
        let (generation, options) = {
            let mut state = self.state.write().await;
            let generation = state.reset(TransformPhase::Transforming);
            (generation, state.options)
        };
        debug!("Transform dispatched (generation {})", generation);

        let outcome = match TransformRequest::new(text, options) {
            Ok(request) => self.backend.transform(request).await,
            Err(e) => Err(e),
        };

        let result = match outcome {
            Ok(result) => result.enforce_options(&options),
            Err(e) => {
                let mut state = self.state.write().await;
                if state.generation == generation {
                    state.phase = TransformPhase::Failed;
                    state.error = Some(e.to_string());
                }
                warn!("Transform failed (generation {}): {}", generation, e);
                return Err(e);
            }
        };

        let terms: Vec<String> = if options.highlight_key_terms {
            dedup_preserving_order(
                result
                    .highlights
                    .iter()
                    .filter(|term| !term.trim().is_empty())
                    .cloned(),
            )
        } else {
            Vec::new()
        };

        {
            let mut state = self.state.write().await;
            if state.generation != generation {
                debug!("Discarding superseded transform (generation {})", generation);
                return Ok(result);
            }
            state.phase = TransformPhase::Succeeded;
            state.result = Some(result.clone());
            if !terms.is_empty() {
                state.definitions_phase = DefinitionsPhase::Loading;
            }
        }

        if !terms.is_empty() {
            let cache = self.load_definitions(terms, text).await;

            let mut state = self.state.write().await;
            if state.generation == generation {
                info!(
                    "Definitions ready: {} terms (generation {})",
                    cache.len(),
                    generation
                );
                state.cache = cache;
                state.definitions_phase = DefinitionsPhase::Ready;
            } else {
                debug!(
                    "Discarding stale definition batch (generation {}, current {})",
                    generation, state.generation
                );
            }
        }

        Ok(result)
    }

    /// Fan out one lookup per term, fan in once all have settled.
    ///
    /// A failed lookup becomes [`DEFINITION_FALLBACK`]; it never fails the batch.
    async fn load_definitions(&self, terms: Vec<String>, context: &str) -> DefinitionCache {
        debug!("Fetching {} definitions", terms.len());

        let handles: Vec<(String, JoinHandle<Result<DefinitionEntry>>)> = terms
            .into_iter()
            .map(|term| {
                let backend = Arc::clone(&self.backend);
                let context = context.to_string();
                let task_term = term.clone();
                let handle = tokio::spawn(async move {
                    let request = DefinitionRequest::new(task_term, context)?;
                    backend.define(request).await
                });
                (term, handle)
            })
            .collect();

        let mut entries = HashMap::with_capacity(handles.len());
        for (term, handle) in handles {
            let definition = match handle.await {
                Ok(Ok(entry)) => entry.definition,
                Ok(Err(e)) => {
                    warn!("Definition lookup for '{}' failed: {}", term, e);
                    DEFINITION_FALLBACK.to_string()
                }
                Err(e) => {
                    warn!("Definition task for '{}' aborted: {}", term, e);
                    DEFINITION_FALLBACK.to_string()
                }
            };
            entries.insert(term, definition);
        }

        DefinitionCache { entries }
    }

    /// Cache lookup for a selected term; never issues a request
    pub async fn definition(&self, term: &str) -> DefinitionLookup {
        let state = self.state.read().await;
        match state.cache.get(term) {
            Some(definition) => DefinitionLookup::Ready(definition.to_string()),
            None if state.definitions_phase == DefinitionsPhase::Loading => {
                DefinitionLookup::Loading
            }
            None => DefinitionLookup::Absent,
        }
    }

    /// Current formatted text with cached terms highlighted
    pub async fn render(&self) -> Option<String> {
        let state = self.state.read().await;
        state
            .result
            .as_ref()
            .map(|result| highlight_terms(&result.formatted_text, &state.cache.terms()))
    }

    pub async fn snapshot(&self) -> OrchestratorSnapshot {
        let state = self.state.read().await;
        OrchestratorSnapshot {
            generation: state.generation,
            note_id: state.note_id,
            options: state.options,
            phase: state.phase,
            definitions_phase: state.definitions_phase,
            result: state.result.clone(),
            error: state.error.clone(),
            definitions: state.cache.to_sorted(),
        }
    }
}

//! Action Executor
//!
//! Runs resolved actions through a small state machine:
//!
//! ```text
//! Idle ──(confirm?)──> AwaitingConfirmation ──confirm()──> Executing
//!   │                        └──cancel()──> Idle (handler never runs)
//!   └──(no confirm)──────────────────────────────────────> Executing
//! Executing ──ok──> onSuccess ──> Idle
//!           └─err─> onError   ──> Idle
//! ```
//!
//! # Collaborators
//!
//! Everything the executor touches is injected at construction:
//!
//! - an [`ActionRegistry`] mapping action names to async [`ActionHandler`]s;
//! - an [`ActionHost`] bound to the data model, providing reads, `set_data`
//!   writes and `navigate`.
//!
//! Chained actions (`{ "action": "name" }` effects) run the registry's
//! definition for that name through the same executor, bounded by
//! `ExecutorConfig::max_chain_depth`.
//!
//! # Concurrency
//!
//! Loading state is counted per action name. Invoking the same name again
//! while it is in flight starts a second independent invocation; the name
//! stays loading until the last one settles. Nothing serializes concurrent
//! invocations against the shared data model.
//!
//! Only one confirmation is pending at a time. A newer request replaces an
//! unanswered one, and the replaced invocation resolves as
//! [`ActionOutcome::Cancelled`].

use crate::config::ExecutorConfig;
use crate::data::{get_by_path, DataModel};
use crate::models::{display_value, Action, ConfirmSpec, DynamicValue, Effect, ResolvedAction};
use crate::operations::error::ActionError;
use crate::services::resolve_action;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{oneshot, watch};
use uuid::Uuid;

// ============================================================================
// Handlers
// ============================================================================

/// Caller-supplied asynchronous work behind an action name
///
/// Returning `Err` routes the action into its `onError` continuation; the
/// error's display string is the message used for `$error.message`.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, params: Map<String, Value>) -> anyhow::Result<()>;
}

/// Adapter turning an async closure into an [`ActionHandler`]
pub struct FnHandler<F>(F);

/// Wrap an async closure as a handler
///
/// ```rust
/// use dynui_core::operations::{handler_fn, ActionRegistry};
///
/// let registry = ActionRegistry::new().with_handler(
///     "refresh",
///     handler_fn(|_params| async { anyhow::Ok(()) }),
/// );
/// assert!(registry.contains("refresh"));
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, params: Map<String, Value>) -> anyhow::Result<()> {
        (self.0)(params).await
    }
}

/// Map of action name to handler, plus optional named definitions
///
/// A definition is the full [`Action`] (params, confirmation, continuations)
/// used when the action is invoked by name, either through
/// [`ActionExecutor::execute_named`] or a chained `{ "action": name }`
/// effect. Names without a definition run with no params and no
/// continuations.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
    definitions: HashMap<String, Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler (builder form)
    pub fn with_handler(mut self, name: impl Into<String>, handler: impl ActionHandler + 'static) -> Self {
        self.register(name, handler);
        self
    }

    /// Register a handler, replacing any previous one with that name
    pub fn register(&mut self, name: impl Into<String>, handler: impl ActionHandler + 'static) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    /// Register a named definition (builder form)
    pub fn with_definition(mut self, action: Action) -> Self {
        self.define(action);
        self
    }

    /// Register the definition used when `action.name` is invoked by name
    pub fn define(&mut self, action: Action) {
        self.definitions.insert(action.name.clone(), action);
    }

    /// Definition for `name`, or a bare action with that name
    pub fn definition(&self, name: &str) -> Action {
        self.definitions
            .get(name)
            .cloned()
            .unwrap_or_else(|| Action::new(name))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ============================================================================
// Host
// ============================================================================

/// The executor's view of the outside world
///
/// `set_data` is bound to the data model; `navigate` hands a URL to the
/// caller's router.
pub trait ActionHost: Send + Sync {
    /// Current data model, used to resolve params and confirmation text
    fn snapshot(&self) -> Value;

    /// Write `value` at `path`
    fn set_data(&self, path: &str, value: Value);

    /// Navigate to `url`
    fn navigate(&self, url: &str);

    /// Read the value at `path`
    fn get_data(&self, path: &str) -> Option<Value> {
        get_by_path(&self.snapshot(), path).cloned()
    }
}

type Navigator = Arc<dyn Fn(&str) + Send + Sync>;

/// [`ActionHost`] backed by a [`DataModel`] and an optional navigate callback
#[derive(Clone)]
pub struct ModelHost {
    data: DataModel,
    navigator: Option<Navigator>,
}

impl ModelHost {
    pub fn new(data: DataModel) -> Self {
        Self {
            data,
            navigator: None,
        }
    }

    pub fn with_navigator(mut self, navigate: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.navigator = Some(Arc::new(navigate));
        self
    }

    pub fn data(&self) -> &DataModel {
        &self.data
    }
}

impl ActionHost for ModelHost {
    fn snapshot(&self) -> Value {
        self.data.snapshot()
    }

    fn set_data(&self, path: &str, value: Value) {
        self.data.set(path, value);
    }

    fn navigate(&self, url: &str) {
        match &self.navigator {
            Some(navigate) => navigate(url),
            None => tracing::warn!("No navigator configured; dropping navigation to '{}'", url),
        }
    }

    fn get_data(&self, path: &str) -> Option<Value> {
        self.data.get(path)
    }
}

// ============================================================================
// Execution state
// ============================================================================

/// A confirmation the caller must answer before the handler runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    /// Invocation this confirmation gates
    pub id: Uuid,
    pub action: String,
    /// Confirmation text with placeholders already interpolated
    pub confirm: ConfirmSpec,
    pub requested_at: DateTime<Utc>,
}

/// How an invocation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ActionOutcome {
    /// Handler succeeded; `onSuccess` (if any) was applied
    Succeeded,
    /// Handler failed; `onError` (if any) was applied
    Failed { message: String },
    /// Confirmation was declined; the handler never ran
    Cancelled,
}

struct PendingConfirmation {
    id: Uuid,
    responder: oneshot::Sender<bool>,
}

#[derive(Default)]
struct ExecutorState {
    /// In-flight invocation count per action name
    loading: HashMap<String, usize>,
    pending: Option<PendingConfirmation>,
}

struct ExecutorInner {
    registry: ActionRegistry,
    host: Arc<dyn ActionHost>,
    config: ExecutorConfig,
    state: Mutex<ExecutorState>,
    confirmations: watch::Sender<Option<ConfirmationRequest>>,
}

impl ExecutorInner {
    fn state(&self) -> MutexGuard<'_, ExecutorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks an action name as loading for as long as it lives
struct LoadingGuard {
    inner: Arc<ExecutorInner>,
    name: String,
}

impl LoadingGuard {
    fn begin(inner: &Arc<ExecutorInner>, name: &str) -> Self {
        *inner.state().loading.entry(name.to_string()).or_insert(0) += 1;
        Self {
            inner: Arc::clone(inner),
            name: name.to_string(),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut state = self.inner.state();
        if let Some(count) = state.loading.get_mut(&self.name) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                state.loading.remove(&self.name);
            }
        }
    }
}

/// Clears the pending slot if its invocation is dropped while waiting
struct ConfirmationGuard {
    inner: Arc<ExecutorInner>,
    id: Uuid,
}

impl Drop for ConfirmationGuard {
    fn drop(&mut self) {
        let mut state = self.inner.state();
        if state.pending.as_ref().is_some_and(|p| p.id == self.id) {
            state.pending = None;
            self.inner.confirmations.send_replace(None);
        }
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Resolves and runs actions
///
/// Cheap to clone; clones share handlers, loading state and the pending
/// confirmation.
///
/// # Example
///
/// ```rust
/// use dynui_core::data::DataModel;
/// use dynui_core::models::{Action, Effect};
/// use dynui_core::operations::{handler_fn, ActionExecutor, ActionOutcome, ActionRegistry};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let data = DataModel::new(json!({}));
/// let registry = ActionRegistry::new()
///     .with_handler("save", handler_fn(|_params| async { anyhow::Ok(()) }));
/// let executor = ActionExecutor::for_model(registry, data.clone());
///
/// let action = Action::new("save").on_success(Effect::set([("/saved", json!(true))]));
/// assert_eq!(executor.execute(&action).await.unwrap(), ActionOutcome::Succeeded);
/// assert_eq!(data.get("/saved"), Some(json!(true)));
/// # });
/// ```
#[derive(Clone)]
pub struct ActionExecutor {
    inner: Arc<ExecutorInner>,
}

impl ActionExecutor {
    /// Executor with the default configuration
    pub fn new(registry: ActionRegistry, host: Arc<dyn ActionHost>) -> Self {
        Self::build(registry, host, ExecutorConfig::default())
    }

    /// Executor with a validated custom configuration
    pub fn with_config(
        registry: ActionRegistry,
        host: Arc<dyn ActionHost>,
        config: ExecutorConfig,
    ) -> Result<Self, ActionError> {
        config.validate().map_err(ActionError::InvalidConfig)?;
        Ok(Self::build(registry, host, config))
    }

    /// Executor writing into `data` with no navigator
    pub fn for_model(registry: ActionRegistry, data: DataModel) -> Self {
        Self::new(registry, Arc::new(ModelHost::new(data)))
    }

    fn build(registry: ActionRegistry, host: Arc<dyn ActionHost>, config: ExecutorConfig) -> Self {
        let (confirmations, _) = watch::channel(None);
        Self {
            inner: Arc::new(ExecutorInner {
                registry,
                host,
                config,
                state: Mutex::new(ExecutorState::default()),
                confirmations,
            }),
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.inner.config
    }

    /// Resolve and run `action`
    ///
    /// Handler failures are not errors: they resolve to
    /// [`ActionOutcome::Failed`] after `onError` is applied. A declined
    /// confirmation resolves to [`ActionOutcome::Cancelled`].
    pub async fn execute(&self, action: &Action) -> Result<ActionOutcome, ActionError> {
        self.run(action.clone(), 0).await
    }

    /// Run the action defined as `name`, or a bare action with no params
    pub async fn execute_named(&self, name: &str) -> Result<ActionOutcome, ActionError> {
        self.run(self.inner.registry.definition(name), 0).await
    }

    /// The confirmation currently awaiting an answer
    pub fn pending_confirmation(&self) -> Option<ConfirmationRequest> {
        self.inner.confirmations.borrow().clone()
    }

    /// Watch the pending confirmation slot
    pub fn subscribe_confirmations(&self) -> watch::Receiver<Option<ConfirmationRequest>> {
        self.inner.confirmations.subscribe()
    }

    /// Accept the pending confirmation; returns `false` if none was pending
    pub fn confirm(&self) -> bool {
        self.answer(None, true)
    }

    /// Decline the pending confirmation; returns `false` if none was pending
    pub fn cancel(&self) -> bool {
        self.answer(None, false)
    }

    /// Answer the confirmation with id `id`, ignoring any other request
    pub fn respond(&self, id: Uuid, accepted: bool) -> bool {
        self.answer(Some(id), accepted)
    }

    /// Whether at least one invocation of `name` is in flight
    pub fn is_loading(&self, name: &str) -> bool {
        self.inner.state().loading.contains_key(name)
    }

    /// Names with in-flight invocations, sorted
    pub fn loading_actions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.state().loading.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn answer(&self, id: Option<Uuid>, accepted: bool) -> bool {
        let pending = {
            let mut state = self.inner.state();
            let matches = state.pending.as_ref().is_some_and(|p| match id {
                Some(id) => p.id == id,
                None => true,
            });
            if !matches {
                return false;
            }
            self.inner.confirmations.send_replace(None);
            state.pending.take()
        };

        match pending {
            Some(pending) => pending.responder.send(accepted).is_ok(),
            None => false,
        }
    }

    fn run(&self, action: Action, depth: usize) -> BoxFuture<'_, Result<ActionOutcome, ActionError>> {
        async move {
            let max_depth = self.inner.config.max_chain_depth;
            if depth > max_depth {
                tracing::warn!(
                    "Action chain exceeded max depth {} at action '{}'",
                    max_depth,
                    action.name
                );
                return Err(ActionError::chain_depth_exceeded(&action.name, max_depth));
            }

            let Some(handler) = self.inner.registry.get(&action.name) else {
                tracing::warn!("No handler registered for action: {}", action.name);
                return Err(ActionError::unknown_action(&action.name));
            };

            let invocation = Uuid::new_v4();
            let resolved = resolve_action(&action, &self.inner.host.snapshot());

            if let Some(confirm) = resolved.confirm.clone() {
                tracing::debug!(
                    "[{}] Action '{}' awaiting confirmation",
                    invocation,
                    resolved.name
                );
                if !self.await_confirmation(invocation, &resolved.name, confirm).await {
                    tracing::debug!("[{}] Action '{}' cancelled", invocation, resolved.name);
                    return Ok(ActionOutcome::Cancelled);
                }
            }

            let _loading = LoadingGuard::begin(&self.inner, &resolved.name);
            tracing::debug!("[{}] Executing action '{}'", invocation, resolved.name);

            match self.invoke_handler(handler.as_ref(), &resolved).await {
                Ok(()) => {
                    if let Some(effect) = &resolved.on_success {
                        tracing::debug!(
                            "[{}] Action '{}' succeeded; applying onSuccess",
                            invocation,
                            resolved.name
                        );
                        self.apply_effect(effect, None, depth).await?;
                    }
                    Ok(ActionOutcome::Succeeded)
                }
                Err(error) => {
                    let message = error.to_string();
                    match &resolved.on_error {
                        Some(effect) => {
                            tracing::debug!(
                                "[{}] Action '{}' failed ({}); applying onError",
                                invocation,
                                resolved.name,
                                message
                            );
                            let substitute = (!message.is_empty()).then_some(message.as_str());
                            self.apply_effect(effect, substitute, depth).await?;
                        }
                        None => tracing::debug!(
                            "[{}] Action '{}' failed with no onError: {}",
                            invocation,
                            resolved.name,
                            message
                        ),
                    }
                    Ok(ActionOutcome::Failed { message })
                }
            }
        }
        .boxed()
    }

    /// Suspend until the caller answers; `true` means confirmed
    async fn await_confirmation(&self, id: Uuid, action: &str, confirm: ConfirmSpec) -> bool {
        let (responder, answer) = oneshot::channel();
        let request = ConfirmationRequest {
            id,
            action: action.to_string(),
            confirm,
            requested_at: Utc::now(),
        };

        {
            let mut state = self.inner.state();
            if let Some(previous) = state.pending.replace(PendingConfirmation { id, responder }) {
                tracing::debug!("[{}] Confirmation superseded by [{}]", previous.id, id);
            }
            self.inner.confirmations.send_replace(Some(request));
        }

        let _guard = ConfirmationGuard {
            inner: Arc::clone(&self.inner),
            id,
        };
        matches!(answer.await, Ok(true))
    }

    async fn invoke_handler(
        &self,
        handler: &dyn ActionHandler,
        resolved: &ResolvedAction,
    ) -> anyhow::Result<()> {
        let call = handler.handle(resolved.params.clone());
        match self.inner.config.handler_timeout() {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        "Action '{}' timed out after {}ms",
                        resolved.name,
                        limit.as_millis()
                    );
                    Err(anyhow::anyhow!(
                        "Action '{}' timed out after {}ms",
                        resolved.name,
                        limit.as_millis()
                    ))
                }
            },
            None => call.await,
        }
    }

    /// Apply a continuation
    ///
    /// `error_message` is set only on the error path; it replaces `set`
    /// values equal to the configured sentinel.
    async fn apply_effect(
        &self,
        effect: &Effect,
        error_message: Option<&str>,
        depth: usize,
    ) -> Result<(), ActionError> {
        match effect {
            Effect::Navigate(target) => {
                let url = match target {
                    DynamicValue::Literal(value) => Some(value.clone()),
                    DynamicValue::Path(path) => self.inner.host.get_data(path),
                };
                match url {
                    None | Some(Value::Null) => {
                        tracing::warn!("Navigate target {:?} resolved to nothing", target)
                    }
                    Some(url) => self.inner.host.navigate(&display_value(Some(&url))),
                }
            }
            Effect::Set(entries) => {
                let sentinel = self.inner.config.error_message_sentinel.as_str();
                for (path, value) in entries {
                    let value = match (error_message, value) {
                        (Some(message), Value::String(s)) if s == sentinel => {
                            Value::String(message.to_string())
                        }
                        _ => value.clone(),
                    };
                    self.inner.host.set_data(path, value);
                }
            }
            Effect::Chain(name) => {
                tracing::debug!("Chaining to action '{}' (depth {})", name, depth + 1);
                self.run(self.inner.registry.definition(name), depth + 1).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "action_executor_test.rs"]
mod action_executor_test;

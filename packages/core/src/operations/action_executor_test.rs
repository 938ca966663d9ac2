//! Tests for the action executor internals
//!
//! Confirmation bookkeeping, loading guards and registry behavior. End-to-end
//! action flows live in `tests/action_execution_test.rs`.

#[cfg(test)]
mod tests {
    use crate::config::ExecutorConfig;
    use crate::data::DataModel;
    use crate::models::{Action, ConfirmSpec, DynamicValue, Effect};
    use crate::operations::action_executor::{
        handler_fn, ActionExecutor, ActionHost, ActionOutcome, ActionRegistry,
        ConfirmationRequest, ModelHost,
    };
    use crate::operations::error::ActionError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    fn counting_registry(name: &str, calls: &Arc<AtomicUsize>) -> ActionRegistry {
        let calls = Arc::clone(calls);
        ActionRegistry::new().with_handler(
            name,
            handler_fn(move |_params| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { anyhow::Ok(()) }
            }),
        )
    }

    async fn wait_for_action(executor: &ActionExecutor, action: &str) -> ConfirmationRequest {
        let mut rx = executor.subscribe_confirmations();
        let current = rx
            .wait_for(|pending| pending.as_ref().is_some_and(|r| r.action == action))
            .await
            .expect("executor alive");
        (*current).clone().expect("pending confirmation")
    }

    fn confirmable(name: &str) -> Action {
        Action::new(name).with_confirm(ConfirmSpec::new("Sure?", "Proceed with ${/item}?"))
    }

    #[test]
    fn test_registry_names_sorted_and_replaceable() {
        let mut registry = ActionRegistry::new()
            .with_handler("zeta", handler_fn(|_| async { anyhow::Ok(()) }))
            .with_handler("alpha", handler_fn(|_| async { anyhow::Ok(()) }));
        registry.register("alpha", handler_fn(|_| async { anyhow::Ok(()) }));

        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert!(registry.contains("zeta"));
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn test_unknown_action_is_an_error() {
        let executor = ActionExecutor::for_model(ActionRegistry::new(), DataModel::default());

        let result = executor.execute_named("ghost").await;

        assert_eq!(result, Err(ActionError::unknown_action("ghost")));
        assert!(executor.loading_actions().is_empty());
    }

    #[test]
    fn test_with_config_rejects_invalid_config() {
        let host = Arc::new(ModelHost::new(DataModel::default()));
        let config = ExecutorConfig {
            max_chain_depth: 0,
            ..Default::default()
        };

        let result = ActionExecutor::with_config(ActionRegistry::new(), host, config);

        assert!(matches!(result, Err(ActionError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_confirmation_text_is_interpolated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let data = DataModel::new(json!({"item": "invoice #7"}));
        let executor = ActionExecutor::for_model(counting_registry("delete", &calls), data);

        let task = tokio::spawn({
            let executor = executor.clone();
            async move { executor.execute(&confirmable("delete")).await }
        });
        let request = wait_for_action(&executor, "delete").await;

        assert_eq!(request.confirm.message, "Proceed with invoice #7?");
        assert_eq!(executor.pending_confirmation(), Some(request));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(executor.confirm());
        assert_eq!(task.await.unwrap(), Ok(ActionOutcome::Succeeded));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(executor.pending_confirmation(), None);
    }

    #[tokio::test]
    async fn test_newer_confirmation_supersedes_pending_one() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = ActionExecutor::for_model(
            counting_registry("first", &calls)
                .with_handler("second", handler_fn(|_| async { anyhow::Ok(()) })),
            DataModel::default(),
        );

        let first = tokio::spawn({
            let executor = executor.clone();
            async move { executor.execute(&confirmable("first")).await }
        });
        wait_for_action(&executor, "first").await;

        let second = tokio::spawn({
            let executor = executor.clone();
            async move { executor.execute(&confirmable("second")).await }
        });
        wait_for_action(&executor, "second").await;

        assert_eq!(first.await.unwrap(), Ok(ActionOutcome::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            executor.pending_confirmation().map(|r| r.action),
            Some("second".to_string())
        );

        assert!(executor.confirm());
        assert_eq!(second.await.unwrap(), Ok(ActionOutcome::Succeeded));
    }

    #[tokio::test]
    async fn test_respond_ignores_stale_id() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = ActionExecutor::for_model(counting_registry("go", &calls), DataModel::default());

        let task = tokio::spawn({
            let executor = executor.clone();
            async move { executor.execute(&confirmable("go")).await }
        });
        let request = wait_for_action(&executor, "go").await;

        assert!(!executor.respond(uuid::Uuid::new_v4(), true));
        assert!(executor.pending_confirmation().is_some());

        assert!(executor.respond(request.id, false));
        assert_eq!(task.await.unwrap(), Ok(ActionOutcome::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_confirm_without_pending_returns_false() {
        let executor = ActionExecutor::for_model(ActionRegistry::new(), DataModel::default());
        assert!(!executor.confirm());
        assert!(!executor.cancel());
    }

    #[tokio::test]
    async fn test_dropped_invocation_clears_pending_confirmation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let executor = ActionExecutor::for_model(counting_registry("go", &calls), DataModel::default());

        let task = tokio::spawn({
            let executor = executor.clone();
            async move { executor.execute(&confirmable("go")).await }
        });
        wait_for_action(&executor, "go").await;

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert_eq!(executor.pending_confirmation(), None);
        assert!(!executor.confirm());
    }

    #[tokio::test]
    async fn test_dropped_invocation_clears_loading() {
        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let registry = ActionRegistry::new().with_handler(
            "hang",
            handler_fn(move |_| {
                let started = started_tx.clone();
                async move {
                    let _ = started.send(());
                    std::future::pending::<()>().await;
                    anyhow::Ok(())
                }
            }),
        );
        let executor = ActionExecutor::for_model(registry, DataModel::default());

        let task = tokio::spawn({
            let executor = executor.clone();
            async move { executor.execute_named("hang").await }
        });
        started_rx.recv().await.expect("handler started");
        assert!(executor.is_loading("hang"));
        assert_eq!(executor.loading_actions(), vec!["hang".to_string()]);

        task.abort();
        let _ = task.await;
        assert!(!executor.is_loading("hang"));
    }

    #[tokio::test]
    async fn test_model_host_navigator() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let data = DataModel::new(json!({"next": "/orders/9"}));
        let host = ModelHost::new(data.clone()).with_navigator({
            let visited = Arc::clone(&visited);
            move |url: &str| visited.lock().unwrap().push(url.to_string())
        });
        let registry = ActionRegistry::new().with_handler("open", handler_fn(|_| async { anyhow::Ok(()) }));
        let executor = ActionExecutor::new(registry, Arc::new(host));

        let action = Action::new("open").on_success(Effect::navigate(DynamicValue::path("/next")));
        assert_eq!(executor.execute(&action).await, Ok(ActionOutcome::Succeeded));

        assert_eq!(*visited.lock().unwrap(), vec!["/orders/9".to_string()]);
    }

    #[tokio::test]
    async fn test_navigate_to_absent_path_is_skipped() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let host = ModelHost::new(DataModel::default()).with_navigator({
            let visited = Arc::clone(&visited);
            move |url: &str| visited.lock().unwrap().push(url.to_string())
        });
        let registry = ActionRegistry::new().with_handler("open", handler_fn(|_| async { anyhow::Ok(()) }));
        let executor = ActionExecutor::new(registry, Arc::new(host));

        let action = Action::new("open").on_success(Effect::navigate(DynamicValue::path("/missing")));
        assert_eq!(executor.execute(&action).await, Ok(ActionOutcome::Succeeded));

        assert!(visited.lock().unwrap().is_empty());
    }

    #[test]
    fn test_model_host_reads_and_writes_data() {
        let host = ModelHost::new(DataModel::default());
        host.set_data("/form/name", json!("Ada"));

        assert_eq!(host.get_data("/form/name"), Some(json!("Ada")));
        assert_eq!(host.snapshot(), json!({"form": {"name": "Ada"}}));
        assert_eq!(host.data().get("/form"), Some(json!({"name": "Ada"})));
    }
}

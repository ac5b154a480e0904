//! One-shot hooks run by the host process when it starts.

use crate::error::UpdaterError;
use crate::statistics::Statistics;
use std::cmp::Reverse;
use std::pin::Pin;

type HookFuture = Pin<Box<dyn Future<Output = Result<Statistics, UpdaterError>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HookPriority {
    Low,
    Normal,
    High,
}

struct StartupHook {
    name: String,
    priority: HookPriority,
    run: Box<dyn FnOnce() -> HookFuture>,
}

/// Hooks registered by the host, each run exactly once by [`StartupHooks::run_all`].
#[derive(Default)]
pub struct StartupHooks {
    hooks: Vec<StartupHook>,
}

#[derive(Debug)]
pub struct HookReport {
    pub name: String,
    pub result: Result<Statistics, UpdaterError>,
}

impl StartupHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(&mut self, name: impl Into<String>, priority: HookPriority, hook: F)
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<Statistics, UpdaterError>> + 'static,
    {
        self.hooks.push(StartupHook {
            name: name.into(),
            priority,
            run: Box::new(move || -> HookFuture { Box::pin(hook()) }),
        });
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run all hooks one after another, highest priority first.
    ///
    /// Hooks of equal priority keep their registration order.
    pub async fn run_all(mut self) -> Vec<HookReport> {
        self.hooks.sort_by_key(|hook| Reverse(hook.priority));

        let mut reports = Vec::with_capacity(self.hooks.len());
        for hook in self.hooks {
            tracing::debug!("Running startup hook {}", hook.name);

            let result = (hook.run)().await;
            match &result {
                Ok(statistics) => statistics.log_summary(&hook.name),
                Err(err) => tracing::error!("Startup hook {} failed: {}", hook.name, err),
            }

            reports.push(HookReport {
                name: hook.name,
                result,
            });
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_hook(
        log: &Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
    ) -> impl FnOnce() -> std::future::Ready<Result<Statistics, UpdaterError>> + 'static {
        let log = Rc::clone(log);
        move || {
            log.borrow_mut().push(name);
            std::future::ready(Ok(Statistics::new()))
        }
    }

    #[tokio::test]
    async fn runs_by_priority_then_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = StartupHooks::new();

        hooks.register("low", HookPriority::Low, recording_hook(&log, "low"));
        hooks.register("high-1", HookPriority::High, recording_hook(&log, "high-1"));
        hooks.register("normal", HookPriority::Normal, recording_hook(&log, "normal"));
        hooks.register("high-2", HookPriority::High, recording_hook(&log, "high-2"));
        assert_eq!(hooks.len(), 4);

        let reports = hooks.run_all().await;

        assert_eq!(*log.borrow(), vec!["high-1", "high-2", "normal", "low"]);
        assert_eq!(
            reports.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["high-1", "high-2", "normal", "low"]
        );
    }

    #[tokio::test]
    async fn failing_hook_does_not_stop_the_rest() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = StartupHooks::new();

        hooks.register("broken", HookPriority::High, || async {
            Err(UpdaterError::UnexpectedStatus(StatusCode::INTERNAL_SERVER_ERROR))
        });
        hooks.register("after", HookPriority::Normal, recording_hook(&log, "after"));

        let reports = hooks.run_all().await;

        assert!(reports[0].result.is_err());
        assert!(reports[1].result.is_ok());
        assert_eq!(*log.borrow(), vec!["after"]);
    }

    #[tokio::test]
    async fn empty_hook_list_runs_nothing() {
        let hooks = StartupHooks::new();
        assert!(hooks.is_empty());

        assert!(hooks.run_all().await.is_empty());
    }
}

//! Suite model
//!
//! A suite is an ordered registry of test slots plus lifecycle hooks and
//! one shared context. `run()` picks an execution strategy (parallel
//! fan-out unless per-test hooks are registered, serial otherwise) and
//! produces per-slot results in registration order together with
//! aggregate stats.
//!
//! ```no_run
//! use attest::suite;
//!
//! # async fn demo() -> Result<(), attest::SuiteError> {
//! let mut math = suite("math");
//! math.test("adds", |_cx| async {
//!     attest::assert::is(2 + 2, 4, None)?;
//!     Ok(())
//! });
//! math.exec().await?;
//! # Ok(())
//! # }
//! ```

mod parallel;
mod serial;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;
use tracing::debug;

use crate::models::Results;
use crate::output;
use crate::utils::Timer;

pub type TestFn<C> = Arc<dyn Fn(Arc<C>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
pub type HookFn<C> = Arc<dyn Fn(Arc<C>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// One registered test: position, human-readable title, and the body.
pub struct TestCase<C> {
    pub id: usize,
    pub title: String,
    pub run: TestFn<C>,
}

impl<C> Clone for TestCase<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            title: self.title.clone(),
            run: Arc::clone(&self.run),
        }
    }
}

/// One slot in a suite: either a runnable test or permanently skipped.
pub enum Slot<C> {
    Runnable(TestCase<C>),
    Skipped,
}

impl<C> Slot<C> {
    pub fn is_runnable(&self) -> bool {
        matches!(self, Slot::Runnable(_))
    }
}

impl<C> Clone for Slot<C> {
    fn clone(&self) -> Self {
        match self {
            Slot::Runnable(case) => Slot::Runnable(case.clone()),
            Slot::Skipped => Slot::Skipped,
        }
    }
}

/// Lifecycle hooks; absent means no-op.
pub struct Hooks<C> {
    pub before_suite: Option<HookFn<C>>,
    pub before_each: Option<HookFn<C>>,
    pub after_suite: Option<HookFn<C>>,
    pub after_each: Option<HookFn<C>>,
}

impl<C> Default for Hooks<C> {
    fn default() -> Self {
        Self {
            before_suite: None,
            before_each: None,
            after_suite: None,
            after_each: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SuiteError {
    /// A lifecycle hook failed. Fatal for the suite run: no partial
    /// stats are salvaged.
    #[error("`{phase}` hook failed: {source:#}")]
    Hook {
        phase: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// A named, ordered group of tests sharing one context and one set of
/// lifecycle hooks.
///
/// `only_slots` mirrors `all_slots` position for position; a slot is
/// runnable there only when the test was registered via [`Suite::only`].
/// If any such slot exists, the run is restricted to it.
pub struct Suite<C = ()> {
    name: String,
    context: Arc<C>,
    all_slots: Vec<Slot<C>>,
    only_slots: Vec<Slot<C>>,
    hooks: Hooks<C>,
}

/// Convenience constructor for a context-free suite.
pub fn suite(name: impl Into<String>) -> Suite {
    Suite::new(name)
}

impl<C: Default + Send + Sync + 'static> Suite<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_context(name, C::default())
    }
}

impl<C: Send + Sync + 'static> Suite<C> {
    /// Build a suite around an explicit context value. The context is
    /// created once, shared by reference with every hook and test, and
    /// never reset.
    pub fn with_context(name: impl Into<String>, context: C) -> Self {
        Self {
            name: name.into(),
            context: Arc::new(context),
            all_slots: Vec::new(),
            only_slots: Vec::new(),
            hooks: Hooks::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> Arc<C> {
        Arc::clone(&self.context)
    }

    /// Register a test.
    pub fn test<F, Fut>(&mut self, title: impl Into<String>, test: F)
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let case = self.case(title, test);
        self.all_slots.push(Slot::Runnable(case));
        self.only_slots.push(Slot::Skipped);
    }

    /// Register a test and restrict the run to `only` registrations.
    pub fn only<F, Fut>(&mut self, title: impl Into<String>, test: F)
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let case = self.case(title, test);
        self.all_slots.push(Slot::Runnable(case.clone()));
        self.only_slots.push(Slot::Runnable(case));
    }

    /// Register a permanently skipped slot. The function is never
    /// invoked, not even once.
    pub fn skip<F, Fut>(&mut self, _title: impl Into<String>, _test: F)
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.all_slots.push(Slot::Skipped);
        self.only_slots.push(Slot::Skipped);
    }

    pub fn before<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.before_suite = Some(boxed(hook));
    }

    pub fn before_each<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.before_each = Some(boxed(hook));
    }

    pub fn after<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.after_suite = Some(boxed(hook));
    }

    pub fn after_each<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.after_each = Some(boxed(hook));
    }

    fn case<F, Fut>(&self, title: impl Into<String>, test: F) -> TestCase<C>
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        TestCase {
            id: self.all_slots.len(),
            title: title.into(),
            run: boxed(test),
        }
    }

    /// Run the suite and return its results.
    ///
    /// Consumes the suite: results accumulate exactly once. Per-test
    /// hooks force the serial strategy; otherwise every runnable slot
    /// fans out concurrently against the shared context.
    pub async fn run(self) -> Result<Results, SuiteError> {
        let Suite {
            name,
            context,
            all_slots,
            only_slots,
            hooks,
        } = self;

        let slots = if only_slots.iter().any(Slot::is_runnable) {
            only_slots
        } else {
            all_slots
        };

        if let Some(hook) = &hooks.before_suite {
            hook(Arc::clone(&context))
                .await
                .map_err(|source| SuiteError::Hook {
                    phase: "before.suite",
                    source,
                })?;
        }

        let serial_mode = hooks.before_each.is_some() || hooks.after_each.is_some();
        debug!(
            "running suite `{name}` with {} slots ({})",
            slots.len(),
            if serial_mode { "serial" } else { "parallel" }
        );

        let results = if serial_mode {
            serial::run(slots, Arc::clone(&context), &hooks).await?
        } else {
            parallel::run(slots, Arc::clone(&context)).await
        };

        if let Some(hook) = &hooks.after_suite {
            hook(Arc::clone(&context))
                .await
                .map_err(|source| SuiteError::Hook {
                    phase: "after.suite",
                    source,
                })?;
        }

        Ok(results)
    }

    /// Run the suite and report: a protocol message when running inside
    /// an isolated unit, a human-readable summary otherwise.
    pub async fn exec(self) -> Result<Results, SuiteError> {
        let name = self.name.clone();
        let timer = Timer::start(&name);
        let results = self.run().await?;
        output::emit_suite(&name, &results, timer.elapsed());
        Ok(results)
    }
}

fn boxed<C, F, Fut>(f: F) -> TestFn<C>
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |context| Box::pin(f(context)))
}

// Shared by both strategies: a test body that panics is captured as a
// plain failed outcome, never a crash of the run.
pub(crate) async fn run_case<C>(run: TestFn<C>, context: Arc<C>) -> anyhow::Result<()> {
    match AssertUnwindSafe(run(context)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => Err(anyhow::anyhow!("test panicked: {}", panic_text(&payload))),
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use super::RenderContext;
use super::slide::{PrecacheHook, SlideRegistry};

/// Where precache hooks run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrecacheDispatch {
    /// On the rayon pool; never awaited by navigation.
    #[default]
    Background,
    /// On the caller's thread, before the call returns.
    Inline,
}

/// Fires the precache hook of slides that are about to become reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecacheScheduler {
    dispatch: PrecacheDispatch,
}

impl PrecacheScheduler {
    pub fn new(dispatch: PrecacheDispatch) -> Self {
        Self { dispatch }
    }

    #[cfg(test)]
    pub fn dispatch(&self) -> PrecacheDispatch {
        self.dispatch
    }

    /// Run the hook of the slide at `index`, once. Out-of-range indices and
    /// slides without a hook are ignored. Returns whether a hook was
    /// dispatched.
    pub fn precache<C>(&self, slides: &SlideRegistry<C>, index: isize, ctx: &RenderContext) -> bool {
        let Some(hook) = slides.get_signed(index).and_then(|s| s.precache_hook()) else {
            return false;
        };
        let hook = Arc::clone(hook);

        tracing::trace!(index, dispatch = ?self.dispatch, "precache");
        match self.dispatch {
            PrecacheDispatch::Inline => run_hook(&hook, ctx, index),
            PrecacheDispatch::Background => {
                let ctx = ctx.clone();
                rayon::spawn(move || run_hook(&hook, &ctx, index));
            }
        }
        true
    }
}

/// Hook failures belong to the hook; they are logged and dropped here.
fn run_hook(hook: &PrecacheHook, ctx: &RenderContext, index: isize) {
    match catch_unwind(AssertUnwindSafe(|| hook(ctx))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(index, error = %format!("{e:#}"), "precache hook failed"),
        Err(_) => tracing::warn!(index, "precache hook panicked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Slide;
    use std::sync::Mutex;
    use std::sync::mpsc;
    use std::time::Duration;

    fn recording_registry(calls: &Arc<Mutex<Vec<usize>>>, count: usize) -> SlideRegistry<usize> {
        let slides = (0..count)
            .map(|i| {
                let calls = Arc::clone(calls);
                Slide::new(move |_| i).on_precache(move |_| {
                    calls.lock().unwrap().push(i);
                    Ok(())
                })
            })
            .collect();
        SlideRegistry::new(slides).unwrap()
    }

    #[test]
    fn test_inline_runs_hook_once() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(&calls, 3);
        let scheduler = PrecacheScheduler::new(PrecacheDispatch::Inline);
        assert!(scheduler.precache(&registry, 1, &RenderContext::default()));
        assert_eq!(*calls.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(&calls, 3);
        let scheduler = PrecacheScheduler::new(PrecacheDispatch::Inline);
        let ctx = RenderContext::default();
        assert!(!scheduler.precache(&registry, -1, &ctx));
        assert!(!scheduler.precache(&registry, 3, &ctx));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_slide_without_hook_is_ignored() {
        let registry = SlideRegistry::new(vec![Slide::new(|_| ())]).unwrap();
        let scheduler = PrecacheScheduler::new(PrecacheDispatch::Inline);
        assert!(!scheduler.precache(&registry, 0, &RenderContext::default()));
    }

    #[test]
    fn test_failing_hooks_are_contained() {
        let registry = SlideRegistry::new(vec![
            Slide::new(|_| ()).on_precache(|_| anyhow::bail!("cache miss")),
            Slide::new(|_| ()).on_precache(|_| panic!("hook exploded")),
        ])
        .unwrap();
        let scheduler = PrecacheScheduler::new(PrecacheDispatch::Inline);
        let ctx = RenderContext::default();
        assert!(scheduler.precache(&registry, 0, &ctx));
        assert!(scheduler.precache(&registry, 1, &ctx));
    }

    #[test]
    fn test_background_dispatch_does_not_block() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let registry = SlideRegistry::new(vec![Slide::new(|_| ()).on_precache(move |_| {
            started_tx.send(()).ok();
            // Held until the test releases it
            release_rx.lock().unwrap().recv().ok();
            Ok(())
        })])
        .unwrap();

        let scheduler = PrecacheScheduler::default();
        assert_eq!(scheduler.dispatch(), PrecacheDispatch::Background);
        // Returns while the hook is still blocked
        assert!(scheduler.precache(&registry, 0, &RenderContext::default()));
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("hook should start on the pool");
        release_tx.send(()).unwrap();
    }
}

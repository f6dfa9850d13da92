//! Process-exit coordination for shared client resources.
//!
//! Backend integrations that hold a process-wide client object (as opposed
//! to per-provider connections) register a release hook here once, at first
//! use. The hosting process invokes [`ShutdownCoordinator::shutdown`] at
//! exit; hooks run exactly once, each bounded by a quiet period and a
//! forced-termination period, so shutdown can never block process exit
//! indefinitely. Overruns are logged, never raised.

use std::sync::OnceLock;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use parking_lot::Mutex;

/// Grace period granted to each release hook before a warning is logged.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(100);

/// Additional window after the quiet period before a hook is abandoned.
pub const DEFAULT_FORCE_PERIOD: Duration = Duration::from_millis(100);

struct Hook {
    name: &'static str,
    release: Box<dyn FnOnce() + Send + 'static>,
}

struct Inner {
    hooks: Vec<Hook>,
    finished: bool,
}

/// Runs registered release hooks exactly once at process exit.
pub struct ShutdownCoordinator {
    inner: Mutex<Inner>,
}

static COORDINATOR: OnceLock<ShutdownCoordinator> = OnceLock::new();

/// The process-wide coordinator instance.
pub fn coordinator() -> &'static ShutdownCoordinator {
    COORDINATOR.get_or_init(ShutdownCoordinator::new)
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    /// Creates an empty coordinator.
    ///
    /// Hosts normally use the process-wide [`coordinator()`]; constructing
    /// an instance directly is useful in tests.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                hooks: Vec::new(),
                finished: false,
            }),
        }
    }

    /// Registers a release hook to run at shutdown.
    ///
    /// Registering after shutdown has already run logs a warning and drops
    /// the hook; the shared resource it would have released is torn down by
    /// process exit instead.
    pub fn register(&self, name: &'static str, release: impl FnOnce() + Send + 'static) {
        let mut inner = self.inner.lock();
        if inner.finished {
            tracing::warn!(hook = name, "shutdown already ran, dropping release hook");
            return;
        }
        inner.hooks.push(Hook {
            name,
            release: Box::new(release),
        });
    }

    /// Runs all registered hooks exactly once.
    ///
    /// Each hook runs on a helper thread and is granted `quiet` to finish;
    /// a hook that overruns gets `force` more before being abandoned with
    /// an error log. A second call is a no-op.
    pub fn shutdown(&self, quiet: Duration, force: Duration) {
        let hooks = {
            let mut inner = self.inner.lock();
            if inner.finished {
                return;
            }
            inner.finished = true;
            std::mem::take(&mut inner.hooks)
        };

        for hook in hooks {
            let name = hook.name;
            let (done_tx, done_rx) = mpsc::channel();
            let release = hook.release;
            let spawned = std::thread::Builder::new()
                .name(format!("{name}-release"))
                .spawn(move || {
                    release();
                    let _ = done_tx.send(());
                });
            if let Err(e) = spawned {
                tracing::error!(hook = name, error = %e, "failed to spawn release thread");
                continue;
            }

            match done_rx.recv_timeout(quiet) {
                Ok(()) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::error!(hook = name, "release hook panicked");
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(
                        hook = name,
                        quiet_ms = quiet.as_millis() as u64,
                        "release hook exceeded quiet period"
                    );
                }
            }

            match done_rx.recv_timeout(force) {
                Ok(()) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::error!(hook = name, "release hook panicked");
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::error!(
                        hook = name,
                        force_ms = force.as_millis() as u64,
                        "release hook exceeded forced window, abandoning"
                    );
                }
            }
        }
    }

    /// Runs all registered hooks with the default quiet/force periods.
    pub fn shutdown_with_defaults(&self) {
        self.shutdown(DEFAULT_QUIET_PERIOD, DEFAULT_FORCE_PERIOD);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use super::*;

    #[test]
    fn hooks_run_exactly_once() {
        let coordinator = ShutdownCoordinator::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let hook_calls = Arc::clone(&calls);
        coordinator.register("counter", move || {
            hook_calls.fetch_add(1, Ordering::SeqCst);
        });

        coordinator.shutdown_with_defaults();
        coordinator.shutdown_with_defaults();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shutdown_without_hooks_is_safe() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.shutdown_with_defaults();
    }

    #[test]
    fn slow_hook_is_abandoned_within_the_two_windows() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.register("sleeper", || {
            std::thread::sleep(Duration::from_secs(5));
        });

        let started = Instant::now();
        coordinator.shutdown(Duration::from_millis(20), Duration::from_millis(20));
        // Bounded well below the hook's own sleep.
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn late_registration_is_dropped() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.shutdown_with_defaults();

        let calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = Arc::clone(&calls);
        coordinator.register("late", move || {
            hook_calls.fetch_add(1, Ordering::SeqCst);
        });
        coordinator.shutdown_with_defaults();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let coordinator = ShutdownCoordinator::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second"] {
            let order = Arc::clone(&order);
            coordinator.register(name, move || {
                order.lock().push(name);
            });
        }

        coordinator.shutdown_with_defaults();
        assert_eq!(*order.lock(), vec!["first", "second"]);
    }
}

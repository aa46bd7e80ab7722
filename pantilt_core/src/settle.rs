//! Settle/debounce state machine.
//!
//! After the mount moves, the camera sees the whole scene shift. `SettleCore`
//! tracks whether we are still inside the quiet period that follows a move;
//! `SettleMonitor` owns a timer thread that expires that period on its own
//! schedule, independent of the frame loop.
//!
//! The frame loop and the timer thread share one `Mutex<SettleCore>`. Every
//! transition happens under that lock and expiry re-checks the deadline
//! against the clock before firing, so a restart that races a timeout simply
//! pushes the deadline out and the stale wakeup is ignored.

use crossbeam_channel as xch;
use pantilt_traits::Screen;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::util::human_duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleState {
    /// Mount stationary; detections are trusted.
    Idle,
    /// Mount was just commanded; detections may be self-induced.
    InMotion,
}

/// Clock-free settle logic. Callers pass `now` explicitly.
#[derive(Debug)]
pub struct SettleCore {
    state: SettleState,
    interval: Duration,
    deadline: Option<Instant>,
    settled: u64,
}

impl SettleCore {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: SettleState::Idle,
            interval,
            deadline: None,
            settled: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> SettleState {
        self.state
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Completed countdowns so far.
    #[inline]
    pub fn settled_count(&self) -> u64 {
        self.settled
    }

    /// Record an actuator move at `now` and (re)start the countdown.
    /// Returns `true` only on the `Idle -> InMotion` edge.
    pub fn on_move(&mut self, now: Instant) -> bool {
        let entered = self.state == SettleState::Idle;
        self.state = SettleState::InMotion;
        self.deadline = Some(now + self.interval);
        entered
    }

    /// Change the quiet period. A running countdown restarts from `now` with
    /// the new interval; when idle only the next countdown is affected.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if self.deadline.is_some() {
            self.deadline = Some(now + interval);
        }
    }

    /// Complete the countdown if it is due. Returns `true` exactly once per countdown.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                self.state = SettleState::Idle;
                self.settled += 1;
                true
            }
            _ => false,
        }
    }
}

struct Shared {
    core: Mutex<SettleCore>,
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SettleCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Settle state machine with a background countdown.
///
/// Spawns exactly one timer thread, shut down and joined on drop.
pub struct SettleMonitor {
    shared: Arc<Shared>,
    wake: xch::Sender<()>,
    shutdown: Arc<AtomicBool>,
    screen: Arc<dyn Screen>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl core::fmt::Debug for SettleMonitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let core = self.shared.lock();
        f.debug_struct("SettleMonitor")
            .field("state", &core.state())
            .field("interval", &core.interval())
            .field("settled", &core.settled_count())
            .finish()
    }
}

impl SettleMonitor {
    pub fn spawn(interval: Duration, screen: Arc<dyn Screen>) -> Self {
        let shared = Arc::new(Shared {
            core: Mutex::new(SettleCore::new(interval)),
            idle: Condvar::new(),
        });
        // Capacity 1: a pending wakeup already covers any later deadline change.
        let (wake, rx) = xch::bounded::<()>(1);
        let shutdown = Arc::new(AtomicBool::new(false));

        let shared_bg = shared.clone();
        let shutdown_bg = shutdown.clone();
        let screen_bg = screen.clone();
        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_bg.load(Ordering::Relaxed) {
                    tracing::trace!("settle timer received shutdown signal");
                    break;
                }
                let deadline = shared_bg.lock().deadline();
                let waited = match deadline {
                    Some(d) => rx.recv_deadline(d),
                    None => rx.recv().map_err(|_| xch::RecvTimeoutError::Disconnected),
                };
                match waited {
                    Ok(()) => continue,
                    Err(xch::RecvTimeoutError::Disconnected) => break,
                    Err(xch::RecvTimeoutError::Timeout) => {
                        let mut core = shared_bg.lock();
                        // The diagnostic is written before Idle becomes observable.
                        if core.expire(Instant::now()) {
                            tracing::info!(settled = core.settled_count(), "motion settled");
                            screen_bg.write_line("Motion settled");
                            shared_bg.idle.notify_all();
                        }
                    }
                }
            }
            tracing::trace!("settle timer thread exiting cleanly");
        });

        Self {
            shared,
            wake,
            shutdown,
            screen,
            join_handle: Some(join_handle),
        }
    }

    fn kick(&self) {
        // Full means a wakeup is already queued; the worker re-reads the deadline.
        let _ = self.wake.try_send(());
    }

    pub fn state(&self) -> SettleState {
        self.shared.lock().state()
    }

    #[inline]
    pub fn in_motion(&self) -> bool {
        self.state() == SettleState::InMotion
    }

    pub fn settle_time(&self) -> Duration {
        self.shared.lock().interval()
    }

    pub fn settled_count(&self) -> u64 {
        self.shared.lock().settled_count()
    }

    /// Record that the mount moved. Returns `true` on the `Idle -> InMotion` edge.
    pub fn notify_moved(&self) -> bool {
        let entered = self.shared.lock().on_move(Instant::now());
        self.kick();
        entered
    }

    /// Update the live settle time and report the change on the screen.
    pub fn set_settle_time(&self, interval: Duration) {
        self.shared.lock().set_interval(interval, Instant::now());
        self.kick();
        tracing::info!(settle_ms = interval.as_millis() as u64, "servo settle time changed");
        self.screen.write_fmt_line(format_args!(
            "Servo settle time changed to {}",
            human_duration(interval)
        ));
    }

    /// Block until the state machine is idle or `timeout` elapses.
    /// Returns whether it is idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let guard = self.shared.lock();
        let (guard, _) = self
            .shared
            .idle
            .wait_timeout_while(guard, timeout, |c| c.state() == SettleState::InMotion)
            .unwrap_or_else(PoisonError::into_inner);
        guard.state() == SettleState::Idle
    }
}

impl Drop for SettleMonitor {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.kick();
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("settle timer thread joined"),
                Err(e) => tracing::warn!(?e, "settle timer thread panicked during shutdown"),
            }
        }
    }
}

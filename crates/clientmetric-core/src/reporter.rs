//! Background delta reporter.
//!
//! Periodically asks a registry for a delta frame and hands non-empty frames
//! to a [`FrameSink`]. Shipping the frame anywhere is the sink's job.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::ReporterConfig;
use crate::registry::SharedRegistry;

/// Destination for encoded delta frames.
pub trait FrameSink: Send + Sync {
    /// Accept one non-empty frame.
    fn deliver(&self, frame: &str) -> io::Result<()>;
}

impl<F> FrameSink for F
where
    F: Fn(&str) -> io::Result<()> + Send + Sync,
{
    fn deliver(&self, frame: &str) -> io::Result<()> {
        self(frame)
    }
}

/// Background thread that encodes and delivers delta frames.
pub struct DeltaReporter {
    /// Shutdown signal.
    shutdown: Arc<AtomicBool>,
    /// Worker thread handle.
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DeltaReporter {
    /// Start reporting `registry` to `sink`.
    pub fn start(
        registry: SharedRegistry,
        sink: Arc<dyn FrameSink>,
        config: ReporterConfig,
    ) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("clientmetric-reporter".into())
            .spawn(move || {
                Self::worker_loop(registry, sink, config, shutdown_clone);
            })?;

        Ok(Self {
            shutdown,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Stop the reporter and wait for it to finish.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("metrics reporter thread panicked");
            }
        }
    }

    /// Check if the reporter thread is still running.
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    fn worker_loop(
        registry: SharedRegistry,
        sink: Arc<dyn FrameSink>,
        config: ReporterConfig,
        shutdown: Arc<AtomicBool>,
    ) {
        info!(
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "metrics reporter started"
        );

        // Frames the sink rejected. The encoder has already advanced past
        // them, so they are resent ahead of the next frame.
        let mut undelivered = String::new();

        while !shutdown.load(Ordering::SeqCst) {
            let frame = registry.encode_delta();
            undelivered.push_str(&frame);
            drop(frame);

            if !undelivered.is_empty() {
                match sink.deliver(&undelivered) {
                    Ok(()) => undelivered.clear(),
                    Err(e) => {
                        warn!(error = %e, bytes = undelivered.len(), "failed to deliver metrics delta");
                    }
                }
            }
            thread::park_timeout(config.poll_interval);
        }

        if !undelivered.is_empty() {
            warn!(bytes = undelivered.len(), "metrics reporter stopped with undelivered delta");
        }

        info!("metrics reporter stopped");
    }
}

impl Drop for DeltaReporter {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use clientmetric_proto::ReplayState;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::EncoderConfig;
    use crate::registry::Registry;

    fn wait_for<F: Fn() -> bool>(cond: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_reporter_delivers_frames() {
        let clock = Arc::new(ManualClock::new());
        let registry = Arc::new(Registry::new().with_clock(clock.clone()));
        let counter = registry.new_counter("reported_total");
        counter.add(5);

        let frames = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink_frames = frames.clone();
        let sink = Arc::new(move |frame: &str| -> io::Result<()> {
            sink_frames.lock().push(frame.to_string());
            Ok(())
        });

        let reporter = DeltaReporter::start(
            registry.clone(),
            sink,
            ReporterConfig::new().with_poll_interval(Duration::from_millis(5)),
        )
        .unwrap();
        assert!(wait_for(|| frames.lock().len() == 1));

        // Rate limited until the clock moves.
        counter.add(3);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(frames.lock().len(), 1);

        clock.advance(Duration::from_secs(16));
        assert!(wait_for(|| frames.lock().len() == 2));

        reporter.stop();
        assert!(!reporter.is_running());

        let mut state = ReplayState::new();
        for frame in frames.lock().iter() {
            state.apply_frame(frame).unwrap();
        }
        assert_eq!(state.value("reported_total"), Some(8));
    }

    #[test]
    fn test_sink_errors_do_not_stop_reporter() {
        let registry = Arc::new(Registry::with_config(
            EncoderConfig::new().with_min_encode_interval(Duration::ZERO),
        ));
        let gauge = registry.new_gauge("flaky");
        gauge.set(1);

        let attempts = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink_attempts = attempts.clone();
        let sink = Arc::new(move |frame: &str| -> io::Result<()> {
            sink_attempts.lock().push(frame.to_string());
            Err(io::Error::new(io::ErrorKind::Other, "collector down"))
        });

        let reporter = DeltaReporter::start(
            registry.clone(),
            sink,
            ReporterConfig::new().with_poll_interval(Duration::from_millis(5)),
        )
        .unwrap();
        assert!(wait_for(|| !attempts.lock().is_empty()));

        // Every retry carries the rejected changes plus the new ones.
        gauge.set(2);
        assert!(wait_for(|| {
            let attempts = attempts.lock();
            let Some(last) = attempts.last() else {
                return false;
            };
            let mut state = ReplayState::new();
            state.apply_frame(last).is_ok() && state.value("flaky") == Some(2)
        }));
        assert!(reporter.is_running());
    }

    #[test]
    fn test_failed_delivery_is_resent() {
        let registry = Arc::new(Registry::with_config(
            EncoderConfig::new().with_min_encode_interval(Duration::ZERO),
        ));
        let counter = registry.new_counter("resent_total");

        let attempts = Arc::new(Mutex::new(0usize));
        let delivered = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink_attempts = attempts.clone();
        let sink_delivered = delivered.clone();
        let sink = Arc::new(move |frame: &str| -> io::Result<()> {
            let mut attempts = sink_attempts.lock();
            *attempts += 1;
            if *attempts == 2 {
                return Err(io::Error::new(io::ErrorKind::Other, "collector down"));
            }
            sink_delivered.lock().push(frame.to_string());
            Ok(())
        });

        let replayed = || {
            let mut state = ReplayState::new();
            for frame in delivered.lock().iter() {
                state.apply_frame(frame).unwrap();
            }
            state.value("resent_total")
        };

        let reporter = DeltaReporter::start(
            registry.clone(),
            sink,
            ReporterConfig::new().with_poll_interval(Duration::from_millis(5)),
        )
        .unwrap();

        counter.add(5);
        assert!(wait_for(|| *attempts.lock() >= 1));
        counter.add(3);
        assert!(wait_for(|| *attempts.lock() >= 2));
        counter.add(1);

        assert!(wait_for(|| replayed() == Some(9)));
        reporter.stop();
        assert_eq!(replayed(), Some(counter.value()));
    }

    #[test]
    fn test_stop_after_sink_panic() {
        let registry = Arc::new(Registry::new());
        registry.new_gauge("boom").set(1);
        let sink = Arc::new(|_frame: &str| -> io::Result<()> { panic!("sink exploded") });

        let reporter = DeltaReporter::start(
            registry,
            sink,
            ReporterConfig::new().with_poll_interval(Duration::from_millis(5)),
        )
        .unwrap();
        assert!(wait_for(|| !reporter.is_running()));

        // The panic is logged, not propagated.
        reporter.stop();
        assert!(!reporter.is_running());
    }

    #[test]
    fn test_stop_is_prompt_with_long_interval() {
        let registry = Arc::new(Registry::new());
        let sink = Arc::new(|_frame: &str| -> io::Result<()> { Ok(()) });
        let reporter =
            DeltaReporter::start(registry, sink, ReporterConfig::default()).unwrap();

        let started = Instant::now();
        reporter.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!reporter.is_running());
    }
}

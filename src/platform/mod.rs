//! Platform abstraction layer
//!
//! Handles the outside world for:
//! - Tilt input (any 2-axis source)
//! - Fixed-rate drivers (tick loop, sensor polling)
//!
//! Drivers measure their own elapsed time; the simulation only consumes the
//! `dt` it is handed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::Result;

/// A 2-axis accelerometer-like input
pub trait TiltSource: Send {
    /// Next `(ax, ay)` reading, or None when no reading is available
    fn read(&mut self) -> Option<(f32, f32)>;
}

/// Deterministic side-to-side sway, for headless runs and demos
#[derive(Debug, Clone)]
pub struct SineTilt {
    /// Time of the next sample, in seconds
    t: f32,
    /// Seconds between samples
    step: f32,
    amplitude: f32,
    period: f32,
}

impl SineTilt {
    pub fn new(amplitude: f32, period: f32, step: f32) -> Self {
        Self {
            t: 0.0,
            step,
            amplitude,
            period: period.max(f32::EPSILON),
        }
    }
}

impl TiltSource for SineTilt {
    fn read(&mut self) -> Option<(f32, f32)> {
        let phase = self.t / self.period * std::f32::consts::TAU;
        self.t += self.step;
        Some((self.amplitude * phase.sin(), 0.0))
    }
}

/// Calls a closure at a fixed cadence on its own thread.
///
/// The closure receives the measured seconds since its previous call.
#[derive(Debug)]
pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<F>(name: &str, interval: Duration, mut f: F) -> Result<Self>
    where
        F: FnMut(f32) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            let mut last = Instant::now();
            while !flag.load(Ordering::Relaxed) {
                thread::sleep(interval);
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f32();
                last = now;
                f(dt);
            }
        })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the driver and wait for its last call to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

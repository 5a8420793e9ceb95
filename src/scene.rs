// Copyright (c) 2026 rezky_nightky

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info};
use parking_lot::RwLock;

use crate::error::RainError;
use crate::field::RainField;

pub struct Stage {
    field: RwLock<Arc<RainField>>,
    scenes: AtomicU64,
}

impl Stage {
    pub fn new(field: RainField) -> Self {
        Self {
            field: RwLock::new(Arc::new(field)),
            scenes: AtomicU64::new(1),
        }
    }

    pub fn current(&self) -> Arc<RainField> {
        self.field.read().clone()
    }

    pub fn replace(&self, field: RainField) {
        *self.field.write() = Arc::new(field);
        let n = self.scenes.fetch_add(1, Ordering::Relaxed) + 1;
        info!("scene {} started", n);
    }

    #[cfg(test)]
    pub fn scenes(&self) -> u64 {
        self.scenes.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct ElapsedMillis {
    last: Instant,
    carry_us: u64,
}

impl ElapsedMillis {
    pub fn new(now: Instant) -> Self {
        Self { last: now, carry_us: 0 }
    }

    pub fn tick(&mut self, now: Instant) -> u64 {
        let us = now.saturating_duration_since(self.last).as_micros() as u64 + self.carry_us;
        self.last = now;
        self.carry_us = us % 1000;
        us / 1000
    }

    pub fn restart(&mut self, now: Instant) {
        self.last = now;
        self.carry_us = 0;
    }
}

struct ClockShared {
    running: AtomicBool,
    paused: AtomicBool,
    updates: AtomicU64,
}

pub struct UpdateClock {
    shared: Arc<ClockShared>,
    handle: Option<JoinHandle<()>>,
}

impl UpdateClock {
    pub fn start(
        stage: Arc<Stage>,
        period: Duration,
        fatal: Sender<RainError>,
    ) -> io::Result<Self> {
        let shared = Arc::new(ClockShared {
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            updates: AtomicU64::new(0),
        });
        let worker = shared.clone();
        let handle = thread::Builder::new()
            .name("rain-update".to_string())
            .spawn(move || run(stage, period, worker, fatal))?;
        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    pub fn toggle_pause(&self) -> bool {
        !self.shared.paused.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Relaxed)
    }

    pub fn updates(&self) -> u64 {
        self.shared.updates.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Relaxed)
    }

    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for UpdateClock {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(stage: Arc<Stage>, period: Duration, shared: Arc<ClockShared>, fatal: Sender<RainError>) {
    let mut elapsed = ElapsedMillis::new(Instant::now());
    let mut next = Instant::now() + period;
    while shared.running.load(Ordering::Relaxed) {
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        }
        next += period;
        let now = Instant::now();
        if now > next {
            next = now;
        }

        if shared.paused.load(Ordering::Relaxed) {
            elapsed.restart(now);
            continue;
        }
        let ms = elapsed.tick(now);
        if ms == 0 {
            continue;
        }
        if let Err(e) = stage.current().advance(ms) {
            error!("update stopped: {}", e);
            shared.running.store(false, Ordering::Relaxed);
            let _ = fatal.send(e);
            break;
        }
        shared.updates.fetch_add(1, Ordering::Relaxed);
    }
}

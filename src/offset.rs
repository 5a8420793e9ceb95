// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;
use std::sync::Arc;

use log::warn;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::OffsetError;
use crate::runtime::OffsetPreset;

pub type OffsetPair = (i32, i32);

pub trait OffsetFunction: Send + Sync {
    fn name(&self) -> &str;
    fn compute(&self, y: i32) -> Result<OffsetPair, OffsetError>;
}

pub struct NoOffset;

impl OffsetFunction for NoOffset {
    fn name(&self) -> &str {
        "none"
    }

    fn compute(&self, _y: i32) -> Result<OffsetPair, OffsetError> {
        Ok((0, 0))
    }
}

pub struct Wave {
    pub amplitude: f32,
    pub wavelength: f32,
}

impl OffsetFunction for Wave {
    fn name(&self) -> &str {
        "wave"
    }

    fn compute(&self, y: i32) -> Result<OffsetPair, OffsetError> {
        let phase = (y as f32) / self.wavelength.max(1.0) * std::f32::consts::TAU;
        Ok(((phase.sin() * self.amplitude).round() as i32, 0))
    }
}

pub struct Zigzag {
    pub step: i32,
    pub teeth: i32,
    pub shift: i32,
}

impl OffsetFunction for Zigzag {
    fn name(&self) -> &str {
        "zigzag"
    }

    fn compute(&self, y: i32) -> Result<OffsetPair, OffsetError> {
        let teeth = self.teeth.max(1);
        let stage = y.div_euclid(self.step.max(1)).rem_euclid(teeth);
        Ok(((stage - teeth / 2) * self.shift, 0))
    }
}

pub fn preset(preset: OffsetPreset, glyph_width: i32) -> Arc<dyn OffsetFunction> {
    let footprint = glyph_width + 1;
    match preset {
        OffsetPreset::None => Arc::new(NoOffset),
        OffsetPreset::Wave => Arc::new(Wave {
            amplitude: footprint as f32 * 1.5,
            wavelength: 400.0,
        }),
        OffsetPreset::Zigzag => Arc::new(Zigzag {
            step: 68,
            teeth: 4,
            shift: footprint,
        }),
    }
}

pub struct OffsetCycle {
    script: Option<Arc<dyn OffsetFunction>>,
    preset: OffsetPreset,
    on_script: bool,
    glyph_width: i32,
}

impl OffsetCycle {
    pub fn new(
        start: OffsetPreset,
        script: Option<Arc<dyn OffsetFunction>>,
        glyph_width: i32,
    ) -> Self {
        let on_script = script.is_some();
        Self {
            script,
            preset: start,
            on_script,
            glyph_width,
        }
    }

    pub fn current(&self) -> Arc<dyn OffsetFunction> {
        match &self.script {
            Some(script) if self.on_script => script.clone(),
            _ => preset(self.preset, self.glyph_width),
        }
    }

    pub fn advance(&mut self) -> Arc<dyn OffsetFunction> {
        if self.on_script {
            self.on_script = false;
            self.preset = OffsetPreset::None;
        } else if self.script.is_some() && self.preset.next() == OffsetPreset::None {
            self.on_script = true;
        } else {
            self.preset = self.preset.next();
        }
        self.current()
    }
}

const MAX_REPEATS_PER_MESSAGE: u32 = 3;
const MAX_ENTRIES: usize = 64;

#[derive(Default)]
struct ErrorLogState {
    entries: VecDeque<String>,
    seen: FxHashMap<String, u32>,
    total: u64,
}

#[derive(Default)]
pub struct OffsetErrorLog {
    state: Mutex<ErrorLogState>,
}

impl OffsetErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset_function_error(&self, message: &str) {
        let mut st = self.state.lock();
        st.total += 1;
        let count = st.seen.entry(message.to_string()).or_insert(0);
        if *count >= MAX_REPEATS_PER_MESSAGE {
            return;
        }
        *count += 1;
        let last_time = *count == MAX_REPEATS_PER_MESSAGE;
        warn!("offset function error: {}", message);

        let entry = if last_time {
            format!("Error: {} (repeated too often, further reports suppressed)", message)
        } else {
            format!("Error: {}", message)
        };
        if st.entries.len() == MAX_ENTRIES {
            st.entries.pop_front();
        }
        st.entries.push_back(entry);
    }

    pub fn latest(&self) -> Option<String> {
        self.state.lock().entries.back().cloned()
    }

    #[cfg(test)]
    pub fn entries(&self) -> Vec<String> {
        self.state.lock().entries.iter().cloned().collect()
    }

    pub fn total_reports(&self) -> u64 {
        self.state.lock().total
    }

    pub fn clear(&self) {
        *self.state.lock() = ErrorLogState::default();
    }
}

struct MapState {
    function: Arc<dyn OffsetFunction>,
    by_x: FxHashMap<i32, OffsetPair>,
    by_y: FxHashMap<i32, OffsetPair>,
}

pub struct OffsetAnimationMap {
    state: Mutex<MapState>,
    errors: Arc<OffsetErrorLog>,
}

impl OffsetAnimationMap {
    pub fn new(function: Arc<dyn OffsetFunction>, errors: Arc<OffsetErrorLog>) -> Self {
        Self {
            state: Mutex::new(MapState {
                function,
                by_x: FxHashMap::default(),
                by_y: FxHashMap::default(),
            }),
            errors,
        }
    }

    pub fn x_offset(&self, y: i32) -> i32 {
        let mut st = self.state.lock();
        if let Some(pair) = st.by_x.get(&y) {
            return pair.0;
        }
        let pair = evaluate(st.function.as_ref(), y, &self.errors);
        st.by_x.insert(y, pair);
        pair.0
    }

    pub fn y_offset(&self, y: i32) -> i32 {
        let mut st = self.state.lock();
        if let Some(pair) = st.by_y.get(&y) {
            return pair.1;
        }
        let pair = evaluate(st.function.as_ref(), y, &self.errors);
        st.by_y.insert(y, pair);
        pair.1
    }

    pub fn replace_function(&self, function: Arc<dyn OffsetFunction>) {
        let mut st = self.state.lock();
        st.function = function;
        st.by_x.clear();
        st.by_y.clear();
    }

    pub fn function_name(&self) -> String {
        self.state.lock().function.name().to_string()
    }
}

fn evaluate(function: &dyn OffsetFunction, y: i32, errors: &OffsetErrorLog) -> OffsetPair {
    match function.compute(y) {
        Ok(pair) => pair,
        Err(e) => {
            errors.offset_function_error(&e.to_string());
            (0, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Counting {
        calls: AtomicUsize,
    }

    impl OffsetFunction for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn compute(&self, y: i32) -> Result<OffsetPair, OffsetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((y * 2, -y))
        }
    }

    struct Failing;

    impl OffsetFunction for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn compute(&self, _y: i32) -> Result<OffsetPair, OffsetError> {
            Err(OffsetError::WrongArity(1))
        }
    }

    fn counting() -> Arc<Counting> {
        Arc::new(Counting {
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn x_offset_is_memoized_per_y() {
        let f = counting();
        let map = OffsetAnimationMap::new(f.clone(), Arc::new(OffsetErrorLog::new()));
        assert_eq!(map.x_offset(5), 10);
        assert_eq!(map.x_offset(5), 10);
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);

        assert_eq!(map.x_offset(6), 12);
        assert_eq!(f.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn axes_cache_independently() {
        let f = counting();
        let map = OffsetAnimationMap::new(f.clone(), Arc::new(OffsetErrorLog::new()));
        assert_eq!(map.y_offset(3), -3);
        assert_eq!(map.y_offset(3), -3);
        assert_eq!(map.x_offset(3), 6);
        assert_eq!(f.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failures_default_to_zero_and_are_not_retried() {
        let log = Arc::new(OffsetErrorLog::new());
        let map = OffsetAnimationMap::new(Arc::new(Failing), log.clone());
        assert_eq!(map.x_offset(1), 0);
        assert_eq!(map.x_offset(1), 0);
        assert_eq!(map.y_offset(1), 0);
        assert_eq!(log.total_reports(), 2);
        assert!(log.latest().unwrap().contains("2 values"));
    }

    #[test]
    fn replacing_the_function_clears_the_caches() {
        let log = Arc::new(OffsetErrorLog::new());
        let map = OffsetAnimationMap::new(Arc::new(Failing), log);
        assert_eq!(map.x_offset(4), 0);
        map.replace_function(counting());
        assert_eq!(map.x_offset(4), 8);
        assert_eq!(map.function_name(), "counting");
    }

    #[test]
    fn error_log_stops_repeating_a_message() {
        let log = OffsetErrorLog::new();
        for _ in 0..10 {
            log.offset_function_error("boom");
        }
        log.offset_function_error("other");
        let entries = log.entries();
        assert_eq!(entries.len(), 4);
        assert!(entries[2].contains("suppressed"));
        assert_eq!(log.total_reports(), 11);
        log.clear();
        assert!(log.latest().is_none());
    }

    #[test]
    fn zigzag_steps_through_its_teeth() {
        let z = Zigzag {
            step: 10,
            teeth: 4,
            shift: 3,
        };
        let xs: Vec<i32> = [0, 10, 20, 30, 40, -1]
            .iter()
            .map(|&y| z.compute(y).unwrap().0)
            .collect();
        assert_eq!(xs, vec![-6, -3, 0, 3, -6, 3]);
    }

    #[test]
    fn cycle_without_a_script_rotates_presets() {
        let mut cycle = OffsetCycle::new(OffsetPreset::Wave, None, 9);
        assert_eq!(cycle.current().name(), "wave");
        let names: Vec<String> = (0..4).map(|_| cycle.advance().name().to_string()).collect();
        assert_eq!(names, ["zigzag", "none", "wave", "zigzag"]);
    }

    #[test]
    fn cycle_comes_back_to_the_loaded_script() {
        let script: Arc<dyn OffsetFunction> = counting();
        let mut cycle = OffsetCycle::new(OffsetPreset::Zigzag, Some(script), 9);
        assert_eq!(cycle.current().name(), "counting");
        let names: Vec<String> = (0..8).map(|_| cycle.advance().name().to_string()).collect();
        assert_eq!(
            names,
            ["none", "wave", "zigzag", "counting", "none", "wave", "zigzag", "counting"]
        );
    }

    #[test]
    fn wave_stays_within_its_amplitude() {
        let w = Wave {
            amplitude: 15.0,
            wavelength: 100.0,
        };
        for y in -500..500 {
            let (x, dy) = w.compute(y).unwrap();
            assert!(x.abs() <= 15);
            assert_eq!(dy, 0);
        }
    }
}

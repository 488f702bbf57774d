//! Fixed-step clock. The game logic counts every wait in frames, so the
//! simulation only ever advances in whole 1/60 s steps regardless of the
//! display refresh rate.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

pub const STEPS_PER_SECOND: u32 = 60;

pub struct TimeState {
    pub fixed_dt: f64,
    /// Longest real frame fed into the accumulator.
    pub max_frame_time: f64,
    accumulator: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,
    pub paused: bool,
    step_once: bool,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self {
            fixed_dt: 1.0 / f64::from(STEPS_PER_SECOND),
            max_frame_time: 0.25,
            accumulator: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            paused: false,
            step_once: false,
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Feed one real frame of `real_dt` seconds into the accumulator.
    pub fn advance(&mut self, real_dt: f64) {
        self.real_dt = real_dt;
        if self.real_dt > self.max_frame_time {
            log::warn!(
                "Frame took {:.1}ms, clamping to {:.0}ms",
                self.real_dt * 1000.0,
                self.max_frame_time * 1000.0
            );
            self.real_dt = self.max_frame_time;
        }

        if self.paused {
            // A paused clock never accumulates; only explicit single steps run.
            self.accumulator = if self.step_once { self.fixed_dt } else { 0.0 };
            self.step_once = false;
        } else {
            self.accumulator += self.real_dt;
        }
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Queue exactly one step for the next frame while paused.
    pub fn request_single_step(&mut self) {
        self.step_once = true;
    }

    /// Elapsed simulated time in seconds.
    pub fn sim_seconds(&self) -> f64 {
        self.fixed_step_count as f64 * self.fixed_dt
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

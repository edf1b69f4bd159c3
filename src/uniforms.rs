//! The standard uniform set: resolution, time, frame, mouse and date.

use std::time::{Duration, Instant};

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use shared::ShaderConstants;

/// Playback clock. Time only advances while running.
#[derive(Debug)]
pub struct FrameClock {
    started: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
    last_tick: Option<f32>,
    time: f32,
    time_delta: f32,
    frame: u32,
    frame_rate: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            started: now,
            paused_at: None,
            paused_total: Duration::ZERO,
            last_tick: None,
            time: 0.0,
            time_delta: 0.0,
            frame: 0,
            frame_rate: 0.0,
        }
    }

    /// Advances to `now`. Call once per rendered frame, before building uniforms.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        let paused = self.paused_at.map_or(Duration::ZERO, |at| now - at);
        let elapsed = now
            .saturating_duration_since(self.started)
            .saturating_sub(self.paused_total + paused);
        self.advance_to(elapsed.as_secs_f32());
    }

    /// Steps to an explicit time, for offline rendering at a fixed rate.
    pub fn advance_to(&mut self, time: f32) {
        self.time_delta = self.last_tick.map_or(0.0, |last| (time - last).max(0.0));
        self.time = time;
        if self.time_delta > 0.0 {
            // smoothed so the title doesn't flicker
            let instant = 1.0 / self.time_delta;
            self.frame_rate = if self.frame_rate == 0.0 {
                instant
            } else {
                self.frame_rate * 0.9 + instant * 0.1
            };
        }
        self.last_tick = Some(time);
    }

    /// Marks the current frame as drawn.
    pub fn end_frame(&mut self) {
        if !self.is_paused() {
            self.frame += 1;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    pub fn resume(&mut self) {
        if let Some(at) = self.paused_at.take() {
            self.paused_total += at.elapsed();
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Back to time zero, frame zero. Keeps the paused state.
    pub fn reset(&mut self) {
        let paused = self.is_paused();
        *self = Self::new();
        if paused {
            self.pause();
        }
    }

    /// Restarts the frame counter without touching time, so feedback units
    /// seed again.
    pub fn restart_frames(&mut self) {
        self.frame = 0;
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn time_delta(&self) -> f32 {
        self.time_delta
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the left mouse button with `iMouse` semantics:
/// `xy` is the last position while held, `zw` the click position, `z` negated
/// once released, and `w` negated after the frame the click happened on.
#[derive(Debug, Default)]
pub struct MouseTracker {
    cursor: [f32; 2],
    position: [f32; 2],
    click: [f32; 2],
    down: bool,
    clicked: bool,
    window_height: f32,
}

impl MouseTracker {
    pub fn new(window_height: u32) -> Self {
        Self {
            window_height: window_height as f32,
            ..Default::default()
        }
    }

    pub fn resize(&mut self, window_height: u32) {
        self.window_height = window_height as f32;
    }

    /// Cursor moved, in window coordinates (origin top-left).
    pub fn moved(&mut self, x: f64, y: f64) {
        self.cursor = [x as f32, self.window_height - y as f32];
        if self.down {
            self.position = self.cursor;
        }
    }

    pub fn pressed(&mut self) {
        self.down = true;
        self.clicked = true;
        self.position = self.cursor;
        self.click = self.cursor;
    }

    pub fn released(&mut self) {
        self.down = false;
    }

    /// `[x, y, z, w]` as a shader sees it this frame.
    pub fn uniform(&self) -> [f32; 4] {
        let [x, y] = self.position;
        let [cx, cy] = self.click;
        [
            x,
            y,
            if self.down { cx } else { -cx },
            if self.clicked { cy } else { -cy },
        ]
    }

    /// Clears the click flag once the frame that saw it has been drawn.
    pub fn end_frame(&mut self) {
        self.clicked = false;
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.window_height as u32);
    }
}

/// `iDate`: year, month (0-based), day of month, seconds since midnight.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DateStamp {
    pub year: f32,
    pub month: f32,
    pub day: f32,
    pub seconds: f32,
}

impl DateStamp {
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    pub fn from_datetime(at: NaiveDateTime) -> Self {
        let seconds = at.num_seconds_from_midnight() as f64 + at.nanosecond() as f64 * 1e-9;
        Self {
            year: at.year() as f32,
            month: at.month0() as f32,
            day: at.day() as f32,
            seconds: seconds as f32,
        }
    }
}

/// Assembles push constants from the standard inputs of one frame.
#[derive(Debug)]
pub struct StandardUniforms {
    pub width: u32,
    pub height: u32,
    pub shader: u32,
    pub time: f32,
    pub time_delta: f32,
    pub frame: u32,
    pub frame_rate: f32,
    pub mouse: [f32; 4],
    pub date: DateStamp,
}

impl StandardUniforms {
    pub fn from_clock(
        shader: u32,
        (width, height): (u32, u32),
        clock: &FrameClock,
        mouse: &MouseTracker,
        date: DateStamp,
    ) -> Self {
        Self {
            width,
            height,
            shader,
            time: clock.time(),
            time_delta: clock.time_delta(),
            frame: clock.frame(),
            frame_rate: clock.frame_rate(),
            mouse: mouse.uniform(),
            date,
        }
    }

    /// Constants for pass 0 with no channels bound; callers fill in the pass
    /// index, channel resolutions and parameters.
    pub fn constants(&self) -> ShaderConstants {
        let [mouse_x, mouse_y, click_x, click_y] = self.mouse;
        ShaderConstants {
            width: self.width,
            height: self.height,
            time: self.time,
            time_delta: self.time_delta,
            frame: self.frame,
            shader: self.shader,
            pass: 0,
            frame_rate: self.frame_rate,
            mouse_x,
            mouse_y,
            click_x,
            click_y,
            date_year: self.date.year,
            date_month: self.date.month,
            date_day: self.date.day,
            date_seconds: self.date.seconds,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn clock_reports_delta_and_rate() {
        let mut clock = FrameClock::new();
        clock.advance_to(0.0);
        assert_eq!(clock.time_delta(), 0.0);
        clock.end_frame();
        clock.advance_to(0.5);
        assert_eq!(clock.time(), 0.5);
        assert_eq!(clock.time_delta(), 0.5);
        assert_eq!(clock.frame_rate(), 2.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.paused_at = Some(start + Duration::from_secs(1));
        clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(clock.time(), 1.0);

        clock.end_frame();
        assert_eq!(clock.frame(), 0);
    }

    #[test]
    fn clock_reset_restarts_frames() {
        let mut clock = FrameClock::new();
        clock.end_frame();
        clock.end_frame();
        clock.restart_frames();
        assert_eq!(clock.frame(), 0);
        clock.end_frame();
        clock.pause();
        clock.reset();
        assert_eq!(clock.frame(), 0);
        assert!(clock.is_paused());
    }

    #[test]
    fn mouse_follows_imouse_conventions() {
        let mut mouse = MouseTracker::new(100);
        mouse.moved(10.0, 30.0);
        assert_eq!(mouse.uniform(), [0.0, 0.0, -0.0, -0.0]);

        mouse.pressed();
        assert_eq!(mouse.uniform(), [10.0, 70.0, 10.0, 70.0]);
        mouse.end_frame();

        mouse.moved(20.0, 40.0);
        assert_eq!(mouse.uniform(), [20.0, 60.0, 10.0, -70.0]);

        mouse.released();
        mouse.moved(50.0, 50.0);
        assert_eq!(mouse.uniform(), [20.0, 60.0, -10.0, -70.0]);
    }

    #[test]
    fn date_month_is_zero_based() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_milli_opt(13, 2, 3, 500)
            .unwrap();
        let date = DateStamp::from_datetime(at);
        assert_eq!(date.year, 2024.0);
        assert_eq!(date.month, 0.0);
        assert_eq!(date.day, 31.0);
        assert_eq!(date.seconds, 13.0 * 3600.0 + 2.0 * 60.0 + 3.5);
    }

    #[test]
    fn constants_carry_every_standard_uniform() {
        let mut clock = FrameClock::new();
        clock.advance_to(2.0);
        let mut mouse = MouseTracker::new(50);
        mouse.moved(5.0, 5.0);
        mouse.pressed();
        let date = DateStamp {
            year: 2024.0,
            month: 5.0,
            day: 2.0,
            seconds: 60.0,
        };

        let constants = StandardUniforms::from_clock(3, (80, 50), &clock, &mouse, date).constants();
        assert_eq!((constants.width, constants.height), (80, 50));
        assert_eq!(constants.shader, 3);
        assert_eq!(constants.time, 2.0);
        assert_eq!((constants.mouse_x, constants.mouse_y), (5.0, 45.0));
        assert_eq!((constants.click_x, constants.click_y), (5.0, 45.0));
        assert_eq!(constants.date_month, 5.0);
        assert_eq!(constants.params, [0.0; 8]);
    }
}

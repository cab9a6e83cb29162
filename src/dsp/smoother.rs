//! Linear ramp smoothing for control signals.

/*
A smoother turns a stepped control value into a short linear ramp so that
abrupt changes (a square LFO flipping, a shape swap, an amount jump) do not
click.

    target changes ──┐
                     ▼
    current ────────╱──────── target
                   ╱
                  ╱  ramp_samples = floor(ramp_seconds * sample_rate)

Setting the same target again is a no-op, so a caller may push its target
every sample: the ramp only restarts when the value actually changes. A
target that keeps moving every sample (a sine LFO) therefore restarts the
ramp each time, which behaves like a lag that trails the input.
*/

#[derive(Debug, Clone)]
pub struct LinearSmoother {
    current: f32,
    target: f32,
    step: f32,
    countdown: u32,
    ramp_samples: u32,
}

impl LinearSmoother {
    pub fn new() -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            step: 0.0,
            countdown: 0,
            ramp_samples: 0,
        }
    }

    /// Set the ramp length and jump straight to the current target.
    pub fn reset(&mut self, sample_rate: f32, ramp_seconds: f32) {
        self.ramp_samples = (ramp_seconds * sample_rate).max(0.0).floor() as u32;
        self.set_current_and_target(self.target);
    }

    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.countdown = 0;
    }

    pub fn set_target(&mut self, value: f32) {
        if value == self.target {
            return;
        }

        if self.ramp_samples == 0 {
            self.set_current_and_target(value);
            return;
        }

        self.target = value;
        self.countdown = self.ramp_samples;
        self.step = (self.target - self.current) / self.countdown as f32;
    }

    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.countdown == 0 {
            return self.target;
        }

        self.countdown -= 1;
        if self.countdown == 0 {
            self.current = self.target;
        } else {
            self.current += self.step;
        }
        self.current
    }

    pub fn current(&self) -> f32 {
        if self.countdown == 0 {
            self.target
        } else {
            self.current
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }
}

impl Default for LinearSmoother {
    fn default() -> Self {
        Self::new()
    }
}

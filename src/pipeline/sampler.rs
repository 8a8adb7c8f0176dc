// src/pipeline/sampler.rs
//
// Caps the analysed rate: an instant is due once 1/target_fps seconds of
// media time have passed since the last accepted one.

/// What the sampler made of one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    Due,
    /// Too soon after the last accepted instant.
    NotDue,
    /// Not after the last accepted instant (or not a number).
    Backwards,
}

#[derive(Debug, Clone)]
pub struct FrameSampler {
    interval_secs: f64,
    last_accepted: Option<f64>,
}

impl FrameSampler {
    pub fn new(target_fps: f64) -> Self {
        let interval_secs = if target_fps > 0.0 { 1.0 / target_fps } else { 0.0 };
        Self {
            interval_secs,
            last_accepted: None,
        }
    }

    /// Classifies `time` and remembers it when due.
    pub fn sample(&mut self, time: f64) -> Sample {
        let decision = match self.last_accepted {
            None => Sample::Due,
            Some(last) if time <= last || time.is_nan() => Sample::Backwards,
            // small slack so 30fps sources land on every third frame at 12fps
            Some(last) if time - last >= self.interval_secs - 1e-6 => Sample::Due,
            Some(_) => Sample::NotDue,
        };
        if decision == Sample::Due {
            self.last_accepted = Some(time);
        }
        decision
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_instant_always_due() {
        let mut sampler = FrameSampler::new(12.0);
        assert_eq!(sampler.sample(3.7), Sample::Due);
    }

    #[test]
    fn test_caps_thirty_fps_source() {
        let mut sampler = FrameSampler::new(12.0);
        let accepted = (0..30)
            .map(|i| i as f64 / 30.0)
            .filter(|t| sampler.sample(*t) == Sample::Due)
            .count();
        // one second of 30fps input, accepted every 3rd frame (0.1s apart)
        assert_eq!(accepted, 10);
    }

    #[test]
    fn test_going_backwards_is_not_just_early() {
        let mut sampler = FrameSampler::new(12.0);
        assert_eq!(sampler.sample(1.0), Sample::Due);
        assert_eq!(sampler.sample(1.05), Sample::NotDue);
        assert_eq!(sampler.sample(0.5), Sample::Backwards);
        assert_eq!(sampler.sample(1.0), Sample::Backwards);
        assert_eq!(sampler.sample(f64::NAN), Sample::Backwards);
        assert_eq!(sampler.sample(1.1), Sample::Due);
    }

    #[test]
    fn test_reset_forgets_last_instant() {
        let mut sampler = FrameSampler::new(12.0);
        assert_eq!(sampler.sample(1.0), Sample::Due);
        sampler.reset();
        assert_eq!(sampler.sample(0.0), Sample::Due);
    }
}

use serde::{Deserialize, Serialize};

/// 30 ms at 16 kHz
pub const FRAME_SAMPLES: usize = 480;

/// RMS thresholds indexed by sensitivity level
const THRESHOLDS: [f64; 4] = [150.0, 300.0, 500.0, 800.0];

/// Energy gate sensitivity: 0 keeps the most audio, 3 keeps only loud frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VadLevel(u8);

impl VadLevel {
    pub fn new(level: u8) -> Self {
        Self(level.min(3))
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    pub fn threshold(&self) -> f64 {
        THRESHOLDS[self.0 as usize]
    }
}

impl Default for VadLevel {
    fn default() -> Self {
        Self(1)
    }
}

/// Drop frames whose RMS energy is under the level's threshold.
///
/// The final short frame is measured as if zero-padded to a full frame.
pub fn energy_gate(samples: &[i16], level: VadLevel) -> Vec<i16> {
    let threshold = level.threshold();
    let mut kept = Vec::with_capacity(samples.len());

    for frame in samples.chunks(FRAME_SAMPLES) {
        let energy: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let rms = (energy / FRAME_SAMPLES as f64).sqrt();
        if rms >= threshold {
            kept.extend_from_slice(frame);
        }
    }

    kept
}

/// Characters counted as one "word" by typing convention
pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub words_per_minute: f64,
    pub characters_per_second: f64,
}

impl Metrics {
    /// Derive metrics from the characters completed over a session of
    /// `duration_secs`. The duration is validated non-zero at configuration
    /// time; a zero here still yields zeros instead of NaN.
    pub fn compute(total_characters_typed: usize, duration_secs: u32) -> Self {
        if total_characters_typed == 0 || duration_secs == 0 {
            return Self::default();
        }
        let chars = total_characters_typed as f64;
        let secs = duration_secs as f64;
        Self {
            words_per_minute: (chars / CHARS_PER_WORD) / (secs / 60.0),
            characters_per_second: chars / secs,
        }
    }

    pub fn cps_display(&self) -> String {
        format!("{:.2}", self.characters_per_second)
    }

    pub fn wpm_display(&self) -> String {
        // Whole numbers print without a fraction, like 12 rather than 12.0
        if self.words_per_minute.fract() == 0.0 {
            format!("{:.0}", self.words_per_minute)
        } else {
            format!("{:.1}", self.words_per_minute)
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            words_per_minute: 0.0,
            characters_per_second: 0.0,
        }
    }
}

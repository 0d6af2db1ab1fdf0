/// Streaming autocorrelation accumulator over a ring buffer.
///
/// Computes the normalized autocorrelation function Γ(δ) of one time series
/// without storing the full history. Memory is O(max_lag).
#[derive(Debug, Clone)]
pub struct AutocorrAccum {
    max_lag: usize,
    /// Last `max_lag` values.
    ring: Vec<f64>,
    sum_o: f64,
    sum_o2: f64,
    /// Running sum of o(t)·o(t−δ), length `max_lag + 1`.
    sum_prod: Vec<f64>,
    n_recorded: usize,
    ring_pos: usize,
}

impl AutocorrAccum {
    /// `max_lag` is clamped to at least 1.
    pub fn new(max_lag: usize) -> Self {
        let max_lag = max_lag.max(1);
        Self {
            max_lag,
            ring: vec![0.0; max_lag],
            sum_o: 0.0,
            sum_o2: 0.0,
            sum_prod: vec![0.0; max_lag + 1],
            n_recorded: 0,
            ring_pos: 0,
        }
    }

    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    pub fn len(&self) -> usize {
        self.n_recorded
    }

    pub fn is_empty(&self) -> bool {
        self.n_recorded == 0
    }

    pub fn push(&mut self, o: f64) {
        let ml = self.max_lag;
        let pos = self.ring_pos;
        self.sum_o += o;
        self.sum_o2 += o * o;

        // lag 0 against itself, lags 1..=n_back against the ring
        self.sum_prod[0] += o * o;
        let n_back = self.n_recorded.min(ml);
        for delta in 1..=n_back {
            let idx = (pos + ml - delta) % ml;
            self.sum_prod[delta] += o * self.ring[idx];
        }

        self.ring[pos] = o;
        self.n_recorded += 1;
        self.ring_pos = (pos + 1) % ml;
    }

    /// Γ(δ) for `δ = 0..=max_lag`. Γ(0) is 1; lags with no pairs, or a
    /// constant series, give 0.
    pub fn finish(&self) -> Vec<f64> {
        let m = self.n_recorded as f64;
        let mean = if self.n_recorded > 0 { self.sum_o / m } else { 0.0 };
        let var = if self.n_recorded > 0 {
            self.sum_o2 / m - mean * mean
        } else {
            0.0
        };
        (0..=self.max_lag)
            .map(|delta| {
                let count = self.n_recorded.saturating_sub(delta);
                if delta == 0 {
                    return 1.0;
                }
                if count == 0 || var <= 0.0 {
                    return 0.0;
                }
                (self.sum_prod[delta] / count as f64 - mean * mean) / var
            })
            .collect()
    }
}

/// Γ(δ) of a stored series.
pub fn autocorrelation(series: &[f64], max_lag: usize) -> Vec<f64> {
    let mut acc = AutocorrAccum::new(max_lag);
    for &o in series {
        acc.push(o);
    }
    acc.finish()
}

/// Integrated autocorrelation time with Sokal's self-consistent window
/// (`W ≥ 5·τ`).
pub fn sokal_tau(gamma: &[f64]) -> f64 {
    let mut tau = 0.5;
    for (w, &g) in gamma.iter().enumerate().skip(1) {
        tau += g;
        if w as f64 >= 5.0 * tau {
            return tau;
        }
    }
    tau
}

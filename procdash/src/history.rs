//! Bounded history buffer for the CPU sparkline.

use std::collections::VecDeque;

pub const CPU_HISTORY_CAP: usize = 600;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// Scale a 0..=100 percentage to the sparkline's integer domain.
pub fn pct_point(pct: f32) -> u64 {
    pct.clamp(0.0, 100.0).round() as u64
}

use crate::config::ProposalPolicy;
use crate::orientation::SpinState;

#[inline]
fn step_up(i: u16, n: usize) -> u16 {
    ((i as usize + 1) % n) as u16
}

#[inline]
fn step_down(i: u16, n: usize) -> u16 {
    if i == 0 {
        (n - 1) as u16
    } else {
        i - 1
    }
}

/// Candidate state one wrapped unit away from `state` on a `dims` table.
///
/// Only the two low bits of `bits` are used.
#[inline]
pub fn propose(
    policy: ProposalPolicy,
    state: SpinState,
    dims: (usize, usize),
    bits: u32,
) -> SpinState {
    let (nx, ny) = dims;
    match policy {
        ProposalPolicy::Axial => match bits & 3 {
            0 => SpinState::new(step_up(state.x, nx), state.y),
            1 => SpinState::new(step_down(state.x, nx), state.y),
            2 => SpinState::new(state.x, step_up(state.y, ny)),
            _ => SpinState::new(state.x, step_down(state.y, ny)),
        },
        ProposalPolicy::Diagonal => {
            let x = if bits & 1 != 0 {
                step_up(state.x, nx)
            } else {
                step_down(state.x, nx)
            };
            let y = if bits & 2 != 0 {
                step_up(state.y, ny)
            } else {
                step_down(state.y, ny)
            };
            SpinState::new(x, y)
        }
    }
}

/// Metropolis acceptance probability `min(1, exp((E_cur − E_cand)/T))`.
#[inline]
pub fn acceptance_probability(current: f64, candidate: f64, temperature: f64) -> f64 {
    if candidate <= current {
        1.0
    } else {
        ((current - candidate) / temperature).exp()
    }
}

/// Downhill and level moves are always taken; uphill ones iff `toss` falls
/// below the Boltzmann factor.
#[inline]
pub fn accept(current: f64, candidate: f64, temperature: f64, toss: f64) -> bool {
    candidate <= current || toss < ((current - candidate) / temperature).exp()
}

use std::sync::atomic::{AtomicU32, Ordering};

use tracing::debug;

use super::init::{CouplingField, Couplings, OrientationInit};
use crate::config::ProposalPolicy;
use crate::error::SimError;
use crate::geometry::Grid;
use crate::orientation::{OrientationTable, SpinState};
use crate::vector::Vector;

/// Periodic 2D/3D lattice of discrete-orientation spins.
///
/// Each site stores a packed [`SpinState`] in an `AtomicU32`. All accesses use
/// `Ordering::Relaxed`: partition workers write only their own sites and may
/// observe a neighbour's state from before or after a concurrent update, but
/// never a torn one. Couplings and the orientation table never change after
/// construction.
pub struct SpinLattice {
    pub(crate) grid: Grid,
    pub(crate) table: OrientationTable,
    pub(crate) states: Vec<AtomicU32>,
    pub(crate) couplings: Couplings,
    pub(crate) proposal: ProposalPolicy,
}

impl SpinLattice {
    /// Build a lattice of the given `shape` (2 or 3 extents).
    ///
    /// Orientation indices come from `init` and are wrapped into `table`.
    /// Couplings come from `coupling`: a uniform field is stored as one scalar,
    /// anything else as a per-edge forward table filled in the same pass.
    pub fn new(
        shape: Vec<usize>,
        table: OrientationTable,
        mut init: impl OrientationInit,
        coupling: impl CouplingField,
    ) -> Result<Self, SimError> {
        let grid = Grid::new(shape)?;
        coupling.check_shape(&grid.shape)?;
        let n_sites = grid.n_sites;
        let n_dims = grid.n_dims;

        let uniform = coupling.uniform();
        if let Some(c) = uniform {
            if !c.is_finite() {
                return Err(SimError::NonFiniteCoupling { site: 0, axis: 0 });
            }
        }
        let mut per_edge = if uniform.is_none() {
            Vec::with_capacity(n_sites * n_dims)
        } else {
            Vec::new()
        };

        let mut states = Vec::with_capacity(n_sites);
        for i in 0..n_sites {
            let c = grid.coords(i);
            let coords = &c[..n_dims];

            let s = init.initial_state(coords, &table);
            let s = table.wrap(s.x as usize, s.y as usize);
            states.push(AtomicU32::new(s.pack()));

            if uniform.is_none() {
                for d in 0..n_dims {
                    let j = coupling.coupling(coords, d);
                    if !j.is_finite() {
                        return Err(SimError::NonFiniteCoupling { site: i, axis: d });
                    }
                    per_edge.push(j);
                }
            }
        }

        let couplings = match uniform {
            Some(c) => Couplings::Uniform(c),
            None => Couplings::PerEdge(per_edge),
        };

        debug!(
            shape = ?grid.shape,
            n_sites,
            table = ?table.dims(),
            uniform_coupling = couplings.is_uniform(),
            "built spin lattice"
        );

        Ok(Self {
            grid,
            table,
            states,
            couplings,
            proposal: ProposalPolicy::default(),
        })
    }

    pub fn with_proposal(mut self, proposal: ProposalPolicy) -> Self {
        self.proposal = proposal;
        self
    }

    pub fn proposal(&self) -> ProposalPolicy {
        self.proposal
    }

    pub fn shape(&self) -> &[usize] {
        &self.grid.shape
    }

    pub fn n_sites(&self) -> usize {
        self.grid.n_sites
    }

    pub fn n_dims(&self) -> usize {
        self.grid.n_dims
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn table(&self) -> &OrientationTable {
        &self.table
    }

    pub fn couplings(&self) -> &Couplings {
        &self.couplings
    }

    #[inline]
    pub fn site_index(&self, coords: &[usize]) -> usize {
        self.grid.index(coords)
    }

    #[inline]
    pub fn state(&self, site: usize) -> SpinState {
        SpinState::unpack(self.states[site].load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn store_state(&self, site: usize, state: SpinState) {
        self.states[site].store(state.pack(), Ordering::Relaxed);
    }

    /// Overwrite one site's state (wrapped into the table). Meant for test
    /// setups and external drivers between sweeps.
    pub fn set_state(&mut self, coords: &[usize], state: SpinState) {
        let site = self.grid.index(coords);
        let s = self.table.wrap(state.x as usize, state.y as usize);
        *self.states[site].get_mut() = s.pack();
    }

    /// Re-draw every site's state from `init`, keeping couplings.
    pub fn reinitialize(&mut self, mut init: impl OrientationInit) {
        let n_dims = self.grid.n_dims;
        for (i, slot) in self.states.iter_mut().enumerate() {
            let c = self.grid.coords(i);
            let s = init.initial_state(&c[..n_dims], &self.table);
            *slot.get_mut() = self.table.wrap(s.x as usize, s.y as usize).pack();
        }
    }

    /// State at `coords`, for renderers.
    pub fn get(&self, coords: &[usize]) -> SpinState {
        self.state(self.grid.index(coords))
    }

    #[inline]
    pub fn direction(&self, site: usize) -> Vector {
        self.table.get_state(self.state(site))
    }

    /// Copy of every site's state in row-major order.
    pub fn states(&self) -> Vec<SpinState> {
        (0..self.n_sites()).map(|i| self.state(i)).collect()
    }

    /// Coupling between `site` and its neighbour along `dim`.
    ///
    /// The backward coupling is read from the backward neighbour's forward
    /// entry, so `coupling(i, d, false) == coupling(neighbor(i, d, false), d, true)`.
    #[inline]
    pub fn coupling(&self, site: usize, dim: usize, forward: bool) -> f64 {
        let owner = if forward {
            site
        } else {
            self.grid.neighbor(site, dim, false)
        };
        self.couplings.forward(owner, dim, self.grid.n_dims)
    }

    /// Coupling-weighted neighbour directions plus the external field.
    #[inline]
    pub fn local_field(&self, site: usize, field: Vector) -> Vector {
        let mut h = field;
        for d in 0..self.grid.n_dims {
            let j_fwd = self.grid.neighbor(site, d, true);
            h += self.direction(j_fwd) * self.coupling(site, d, true);

            let j_bwd = self.grid.neighbor(site, d, false);
            h += self.direction(j_bwd) * self.coupling(site, d, false);
        }
        h
    }
}

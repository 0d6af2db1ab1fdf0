use super::SpinLattice;
use crate::vector::Vector;

impl SpinLattice {
    /// Total energy.
    ///
    /// Each bond is counted once through its forward end:
    /// `E = −Σ_i Σ_d J(i,d) s_i·s_fwd(i,d) − Σ_i s_i·field`.
    pub fn calculate_energy(&self, field: Vector) -> f64 {
        let n_dims = self.grid.n_dims;
        let mut total = 0.0;
        for i in 0..self.grid.n_sites {
            let si = self.direction(i);
            let mut h = field;
            for d in 0..n_dims {
                let j = self.grid.neighbor(i, d, true);
                h += self.direction(j) * self.couplings.forward(i, d, n_dims);
            }
            total -= si.dot(&h);
        }
        total
    }

    pub fn energy_per_site(&self, field: Vector) -> f64 {
        self.calculate_energy(field) / self.grid.n_sites as f64
    }

    /// Mean z-component of the site directions, in `[−1, 1]`.
    pub fn calculate_magnetization(&self) -> f64 {
        let sum: f64 = (0..self.grid.n_sites).map(|i| self.direction(i).z()).sum();
        sum / self.grid.n_sites as f64
    }

    /// Mean direction vector over all sites.
    pub fn magnetization_vector(&self) -> Vector {
        let mut sum = Vector::zero();
        for i in 0..self.grid.n_sites {
            sum += self.direction(i);
        }
        sum / self.grid.n_sites as f64
    }
}

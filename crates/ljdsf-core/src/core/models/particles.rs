use nalgebra::Point3;

/// Read access to the per-particle data the pair style consumes.
///
/// Indices `0..nlocal()` are owned particles; indices `nlocal()..len()` are ghosts, copies of
/// particles owned elsewhere that only receive reaction forces when the ownership rule allows.
pub trait ParticleStore {
    /// Number of owned particles.
    fn nlocal(&self) -> usize;

    /// Number of owned plus ghost particles.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self, index: usize) -> Point3<f64>;

    /// 1-based type identifier.
    fn particle_type(&self, index: usize) -> usize;

    /// Whether the store carries a charge attribute at all.
    fn has_charges(&self) -> bool;

    /// Charge of the particle; zero when the store has no charge attribute.
    fn charge(&self, index: usize) -> f64;

    /// Counts owned particles of each type, indexed by `type - 1`.
    fn local_type_counts(&self, ntypes: usize) -> Vec<f64> {
        let mut counts = vec![0.0; ntypes];
        for i in 0..self.nlocal() {
            let t = self.particle_type(i);
            if (1..=ntypes).contains(&t) {
                counts[t - 1] += 1.0;
            }
        }
        counts
    }
}

/// A plain in-memory particle store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Particles {
    positions: Vec<Point3<f64>>,
    types: Vec<usize>,
    charges: Option<Vec<f64>>,
    nlocal: usize,
}

impl Particles {
    /// Creates an empty store that carries charges.
    pub fn new() -> Self {
        Self {
            charges: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Creates an empty store without a charge attribute.
    pub fn uncharged() -> Self {
        Self::default()
    }

    /// Appends an owned particle. Owned particles must be added before any ghost.
    pub fn push_local(&mut self, position: Point3<f64>, particle_type: usize, charge: f64) {
        debug_assert_eq!(
            self.nlocal,
            self.positions.len(),
            "owned particles must precede ghosts"
        );
        self.push(position, particle_type, charge);
        self.nlocal += 1;
    }

    pub fn push_ghost(&mut self, position: Point3<f64>, particle_type: usize, charge: f64) {
        self.push(position, particle_type, charge);
    }

    fn push(&mut self, position: Point3<f64>, particle_type: usize, charge: f64) {
        self.positions.push(position);
        self.types.push(particle_type);
        if let Some(charges) = self.charges.as_mut() {
            charges.push(charge);
        }
    }
}

impl ParticleStore for Particles {
    fn nlocal(&self) -> usize {
        self.nlocal
    }

    fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    fn position(&self, index: usize) -> Point3<f64> {
        self.positions[index]
    }

    #[inline]
    fn particle_type(&self, index: usize) -> usize {
        self.types[index]
    }

    fn has_charges(&self) -> bool {
        self.charges.is_some()
    }

    #[inline]
    fn charge(&self, index: usize) -> f64 {
        self.charges.as_ref().map_or(0.0, |q| q[index])
    }
}

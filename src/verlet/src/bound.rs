use crate::particle::Particle;

/// Axis-aligned bounds of a particle set, radius included. Broad-phase
/// reject for body pairs.
#[derive(Clone, Copy, Debug)]
pub struct Bound {
	pub xmin: f64,
	pub xmax: f64,
	pub ymin: f64,
	pub ymax: f64,
}

impl Bound {
	pub fn from_particles(particles: &[Particle]) -> Self {
		let mut b = Self {
			xmin: f64::INFINITY,
			xmax: f64::NEG_INFINITY,
			ymin: f64::INFINITY,
			ymax: f64::NEG_INFINITY,
		};
		for p in particles.iter() {
			b.xmin = b.xmin.min(p.pos[0] - p.radius);
			b.xmax = b.xmax.max(p.pos[0] + p.radius);
			b.ymin = b.ymin.min(p.pos[1] - p.radius);
			b.ymax = b.ymax.max(p.pos[1] + p.radius);
		}
		b
	}

	pub fn overlaps(&self, other: &Bound) -> bool {
		self.xmin <= other.xmax
			&& other.xmin <= self.xmax
			&& self.ymin <= other.ymax
			&& other.ymin <= self.ymax
	}
}

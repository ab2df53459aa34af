use crate::math;
use crate::particle::Particle;

/// Distance constraint between two particles of the same body,
/// referenced by index into the body's particle store.
///
/// Correction is inverse-mass weighted: two equal unpinned masses each
/// absorb half the positional error, a pinned side forfeits its share to
/// the other.
#[derive(Clone, Copy, Debug)]
pub struct Constraint {
	pub ps: [usize; 2],
	pub rest_length: f64,
	pub stiffness: f64,
	pub damping: f64,
}

impl Constraint {
	/// Rest length is captured from the current particle distance.
	pub fn new(particles: &[Particle], p1: usize, p2: usize) -> Self {
		let l0 = math::dist(particles[p1].pos, particles[p2].pos);
		Self::new_with_l0(p1, p2, l0)
	}

	pub fn new_with_l0(p1: usize, p2: usize, l0: f64) -> Self {
		Self {
			ps: [p1, p2],
			rest_length: l0,
			stiffness: 1.0,
			damping: 0.0,
		}
	}

	pub fn with_stiffness(mut self, stiffness: f64) -> Self {
		self.stiffness = stiffness;
		self
	}

	pub fn with_damping(mut self, damping: f64) -> Self {
		self.damping = damping;
		self
	}

	/// One positional relaxation pass. Coincident endpoints are a no-op.
	pub fn apply(&self, particles: &mut [Particle]) {
		let mut p1 = particles[self.ps[0]];
		let mut p2 = particles[self.ps[1]];
		let im1 = p1.inv_mass();
		let im2 = p2.inv_mass();
		let im = im1 + im2;
		if im == 0. {
			return;
		}

		let delta = p2.pos - p1.pos;
		let l = delta.magnitude();
		if l < math::EPS {
			return;
		}
		let diff = (l - self.rest_length) / l;
		let corr = delta * (self.stiffness * diff);
		p1.pos += corr * (im1 / im);
		p2.pos -= corr * (im2 / im);

		if self.damping > 0. {
			// bleed relative velocity along the axis through ppos
			let dir = delta / l;
			let vrel = (p2.velocity() - p1.velocity()).dot(&dir);
			let damp = dir * (0.5 * self.damping * vrel);
			if im1 > 0. {
				p1.ppos -= damp;
			}
			if im2 > 0. {
				p2.ppos += damp;
			}
		}

		particles[self.ps[0]] = p1;
		particles[self.ps[1]] = p2;
	}
}

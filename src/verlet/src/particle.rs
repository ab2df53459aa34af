use crate::V2;

/// Point mass with Verlet position history. Velocity is implicit:
/// `pos - ppos` is the displacement of the last step.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
	pub pos: V2,
	pub ppos: V2,
	pub radius: f64,
	pub mass: f64,
	pub pinned: bool,
	force: V2,
}

impl Particle {
	pub fn new(pos: V2, mass: f64, radius: f64) -> Self {
		Self {
			pos,
			ppos: pos,
			radius,
			mass,
			pinned: false,
			force: V2::new(0., 0.),
		}
	}

	pub fn with_pinned(mut self) -> Self {
		self.pinned = true;
		self
	}

	/// Seeds the implicit velocity by backdating `ppos`.
	pub fn with_velocity(mut self, v: V2) -> Self {
		self.ppos = self.pos - v;
		self
	}

	pub fn velocity(&self) -> V2 {
		self.pos - self.ppos
	}

	/// Zero for pinned or non-positive mass, both mean immovable.
	pub fn inv_mass(&self) -> f64 {
		if self.pinned || self.mass <= 0. {
			0.
		} else {
			1. / self.mass
		}
	}

	/// Accumulates into the per-step force scratch, no immediate effect.
	pub fn apply_force(&mut self, f: V2) {
		self.force += f;
	}

	/// One Verlet step. `ppos` keeps the position from before this call;
	/// the force accumulator is drained either way.
	pub fn update(&mut self, dt: f64) {
		if self.inv_mass() == 0. {
			self.force = V2::new(0., 0.);
			return;
		}
		let ppos = self.pos;
		let dp = self.pos - self.ppos;
		let accel = self.force * self.inv_mass();
		self.pos += dp + accel * dt.powi(2);
		self.ppos = ppos;
		self.force = V2::new(0., 0.);
	}
}

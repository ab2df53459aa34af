use crate::bound::Bound;
use crate::constraint::Constraint;
use crate::mesh;
use crate::particle::Particle;
use crate::V2;

/// A deformable body: a particle store, the distance constraints
/// connecting it, and the body's surface material. Owns its particles
/// and constraints by value; constraints index into the store.
#[derive(Clone, Debug)]
pub struct SoftBody {
	pub particles: Vec<Particle>,
	pub constraints: Vec<Constraint>,
	/// Ordered indices of the particles at the original polygon
	/// vertices, for outline rendering and boundary queries.
	pub border: Vec<usize>,
	pub friction: f64,
	pub restitution: f64,
	/// Mesh spacing the body was generated with, zero for hand-built
	/// bodies.
	pub unit: f64,
}

impl SoftBody {
	pub fn new(
		particles: Vec<Particle>,
		constraints: Vec<Constraint>,
		friction: f64,
		restitution: f64,
	) -> Self {
		Self {
			particles,
			constraints,
			border: Vec::new(),
			friction,
			restitution,
			unit: 0.,
		}
	}

	/// Meshes a simple polygon into a particle-and-constraint graph:
	/// outline subdivision at `unit` spacing, then interior rings grown
	/// inward, one particle per unique point and one constraint per
	/// unique edge. `pin_border` pins the whole outline ring.
	#[allow(clippy::too_many_arguments)]
	pub fn from_polygon(
		polygon: &[V2],
		unit: f64,
		mass: f64,
		radius: f64,
		stiffness: f64,
		damping: f64,
		friction: f64,
		restitution: f64,
		pin_border: bool,
	) -> Self {
		let mesh = mesh::mesh_polygon(polygon, unit);
		let mut particles: Vec<Particle> = mesh
			.points
			.iter()
			.map(|&p| Particle::new(p, mass, radius))
			.collect();
		if pin_border {
			for &i in mesh.outline.iter() {
				particles[i].pinned = true;
			}
		}
		let constraints = mesh
			.edges
			.iter()
			.map(|&[a, b]| {
				Constraint::new(&particles, a, b)
					.with_stiffness(stiffness)
					.with_damping(damping)
			})
			.collect();

		let mut body = Self::new(particles, constraints, friction, restitution);
		body.border = mesh.border;
		body.unit = unit;
		body
	}

	pub fn apply_force(&mut self, f: V2) {
		for p in self.particles.iter_mut() {
			p.apply_force(f);
		}
	}

	/// Uniform acceleration, mass-independent per particle.
	pub fn apply_acceleration(&mut self, a: V2) {
		for p in self.particles.iter_mut() {
			let f = a * p.mass;
			p.apply_force(f);
		}
	}

	/// One relaxation pass over every constraint.
	pub fn solve_constraints(&mut self) {
		for c in self.constraints.iter() {
			c.apply(&mut self.particles);
		}
	}

	pub fn update(&mut self, dt: f64) {
		for p in self.particles.iter_mut() {
			p.update(dt);
		}
	}

	pub fn bound(&self) -> Bound {
		Bound::from_particles(&self.particles)
	}

	/// Border particle positions in polygon order.
	pub fn border_points(&self) -> Vec<V2> {
		self.border.iter().map(|&i| self.particles[i].pos).collect()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::math::v2_eq;

	fn square_body(pin_border: bool) -> SoftBody {
		let poly = vec![
			V2::new(0., 0.),
			V2::new(10., 0.),
			V2::new(10., 10.),
			V2::new(0., 10.),
		];
		SoftBody::from_polygon(
			&poly, 2.5, 1.0, 0.5, 0.8, 0.1, 0.5, 0.5, pin_border,
		)
	}

	#[test]
	fn test_factory_materializes_particles_and_constraints() {
		let body = square_body(false);
		assert!(!body.particles.is_empty());
		assert!(!body.constraints.is_empty());
		assert_eq!(body.border.len(), 4);
		assert_eq!(body.unit, 2.5);
		for c in body.constraints.iter() {
			assert!((c.stiffness - 0.8).abs() < 1e-12);
			assert!((c.damping - 0.1).abs() < 1e-12);
			// rest length captured from initial distance
			let d = crate::math::dist(
				body.particles[c.ps[0]].pos,
				body.particles[c.ps[1]].pos,
			);
			assert!((c.rest_length - d).abs() < 1e-12);
		}
	}

	#[test]
	fn test_pin_border_pins_outline_only() {
		let body = square_body(true);
		let pinned = body.particles.iter().filter(|p| p.pinned).count();
		assert!(pinned > 0);
		assert!(pinned < body.particles.len(), "interior must stay free");
		for &i in body.border.iter() {
			assert!(body.particles[i].pinned);
		}
	}

	#[test]
	fn test_broadcasts_touch_every_particle() {
		let mut body = square_body(false);
		let before: Vec<V2> =
			body.particles.iter().map(|p| p.pos).collect();
		body.apply_acceleration(V2::new(0., -10.));
		body.update(0.1);
		for (p, &b) in body.particles.iter().zip(before.iter()) {
			assert!((p.pos[1] - (b[1] - 0.1)).abs() < 1e-9);
			assert_eq!(p.pos[0], b[0]);
		}
	}

	#[test]
	fn test_border_points_follow_particles() {
		let mut body = square_body(false);
		let shift = V2::new(3., 4.);
		for p in body.particles.iter_mut() {
			p.pos += shift;
			p.ppos += shift;
		}
		let pts = body.border_points();
		assert_eq!(pts.len(), 4);
		assert!(v2_eq(pts[0], V2::new(3., 4.)));
	}
}

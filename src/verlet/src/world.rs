use protocol::error::SceneError;
use protocol::rd_model::{RdBody, RdModel, RdParticle};
use protocol::sv_model::{
	ColliderType, SvBody, SvCollider, SvConstraint, SvParticle, SvScene,
};

use crate::collider::{ColliderShape, WorldCollider};
use crate::constraint::Constraint;
use crate::math;
use crate::particle::Particle;
use crate::softbody::SoftBody;
use crate::V2;

/// Top-level owner of every body and collider in a scene.
///
/// `step(dt)` runs the phases in a fixed order: gravity, constraint
/// relaxation, Verlet integration, world collisions, body-body
/// collisions. Collisions come after integration so one oversized
/// gravity step cannot carry a particle back through a surface it was
/// just pushed out of.
pub struct World {
	pub gravity: V2,
	iterations: usize,
	bodies: Vec<SoftBody>,
	colliders: Vec<WorldCollider>,
}

impl Default for World {
	fn default() -> Self {
		Self {
			gravity: V2::new(0., -9.8),
			iterations: 5,
			bodies: Vec::new(),
			colliders: Vec::new(),
		}
	}
}

impl World {
	pub fn with_gravity(mut self, gravity: V2) -> Self {
		self.gravity = gravity;
		self
	}

	/// Relaxation passes per step. One pass cannot satisfy a constraint
	/// graph with cycles; more passes stiffen the solve.
	pub fn with_iterations(mut self, iterations: usize) -> Self {
		self.iterations = iterations.max(1);
		self
	}

	pub fn add_body(&mut self, body: SoftBody) {
		eprintln!(
			"INFO: add body: {} particles, {} constraints",
			body.particles.len(),
			body.constraints.len()
		);
		self.bodies.push(body);
	}

	pub fn add_collider(&mut self, collider: WorldCollider) {
		self.colliders.push(collider);
	}

	pub fn bodies(&self) -> &[SoftBody] {
		&self.bodies
	}

	pub fn bodies_mut(&mut self) -> &mut [SoftBody] {
		&mut self.bodies
	}

	pub fn colliders(&self) -> &[WorldCollider] {
		&self.colliders
	}

	/// Drops everything owned by the scene. Idempotent.
	pub fn clear(&mut self) {
		self.bodies.clear();
		self.colliders.clear();
	}

	/// One fixed timestep. Bounded, deterministic work; never fails.
	pub fn step(&mut self, dt: f64) {
		self.apply_gravity();
		for _ in 0..self.iterations {
			for body in self.bodies.iter_mut() {
				body.solve_constraints();
			}
		}
		for body in self.bodies.iter_mut() {
			body.update(dt);
		}
		self.collide_world();
		self.collide_bodies();
	}

	fn apply_gravity(&mut self) {
		let g = self.gravity;
		for body in self.bodies.iter_mut() {
			body.apply_acceleration(g);
		}
	}

	fn collide_world(&mut self) {
		for body in self.bodies.iter_mut() {
			let friction = body.friction;
			let restitution = body.restitution;
			for p in body.particles.iter_mut() {
				for c in self.colliders.iter() {
					c.collide(p, friction, restitution);
				}
			}
		}
	}

	fn collide_bodies(&mut self) {
		for i in 0..self.bodies.len() {
			let (head, tail) = self.bodies.split_at_mut(i + 1);
			let b1 = &mut head[i];
			for b2 in tail.iter_mut() {
				if !b1.bound().overlaps(&b2.bound()) {
					continue;
				}
				collide_pair(b1, b2);
			}
		}
	}

	// ---- persistence ----

	pub fn sv_scene(&self) -> SvScene {
		SvScene {
			gravity: [self.gravity[0], self.gravity[1]],
			bodies: self.bodies.iter().map(sv_body).collect(),
			colliders: self.colliders.iter().map(sv_collider).collect(),
		}
	}

	/// Rebuilds a scene able to continue the saved trajectory. Unknown
	/// collider tags and dangling particle indices are rejected.
	pub fn from_sv_scene(scene: &SvScene) -> Result<Self, SceneError> {
		scene.validate()?;
		let mut world = Self::default()
			.with_gravity(V2::new(scene.gravity[0], scene.gravity[1]));
		for body in scene.bodies.iter() {
			world.bodies.push(load_body(body));
		}
		for collider in scene.colliders.iter() {
			world.colliders.push(load_collider(collider)?);
		}
		Ok(world)
	}

	// ---- host read-back ----

	pub fn rd_model(&self) -> RdModel {
		RdModel {
			bodies: self
				.bodies
				.iter()
				.map(|body| RdBody {
					particles: body
						.particles
						.iter()
						.map(|p| RdParticle {
							pos: [p.pos[0], p.pos[1]],
							radius: p.radius,
						})
						.collect(),
					border: body
						.border_points()
						.iter()
						.map(|p| [p[0], p[1]])
						.collect(),
					edges: body.constraints.iter().map(|c| c.ps).collect(),
				})
				.collect(),
		}
	}
}

/// Particle-particle contacts between two bodies. The separation is
/// split by inverse mass so an immovable particle is never pushed;
/// the velocity response mirrors the world-collider math.
fn collide_pair(b1: &mut SoftBody, b2: &mut SoftBody) {
	let mu = 0.5 * (b1.friction + b2.friction);
	let e = b1.restitution.min(b2.restitution);

	for i1 in 0..b1.particles.len() {
		for i2 in 0..b2.particles.len() {
			let mut p1 = b1.particles[i1];
			let mut p2 = b2.particles[i2];

			let im1 = p1.inv_mass();
			let im2 = p2.inv_mass();
			let im = im1 + im2;
			if im == 0. {
				continue;
			}

			let delta = p1.pos - p2.pos;
			let dist = delta.magnitude();
			let min_dist = p1.radius + p2.radius;
			if dist < math::EPS || dist >= min_dist {
				continue;
			}
			let n = delta / dist;
			let overlap = min_dist - dist;

			let w1 = im1 / im;
			let w2 = im2 / im;
			p1.pos += n * (overlap * w1);
			p2.pos -= n * (overlap * w2);

			let mut v1 = p1.velocity();
			let mut v2 = p2.velocity();
			let rel_v = v1 - v2;
			let vn = rel_v.dot(&n);
			let mut jn = 0.;
			if vn < 0. {
				// only resolve when moving toward each other
				jn = -(1. + e) * vn;
				v1 += n * (jn * w1);
				v2 -= n * (jn * w2);
			}

			let tangent = rel_v - n * vn;
			let t_len = tangent.magnitude();
			if t_len > math::EPS {
				let t = tangent / t_len;
				let vt = rel_v.dot(&t);
				let max_friction = mu * jn.abs();
				let jt = vt.clamp(-max_friction, max_friction);
				v1 -= t * (jt * w1);
				v2 += t * (jt * w2);
			}

			if im1 > 0. {
				p1.ppos = p1.pos - v1;
			}
			if im2 > 0. {
				p2.ppos = p2.pos - v2;
			}

			b1.particles[i1] = p1;
			b2.particles[i2] = p2;
		}
	}
}

fn sv_body(body: &SoftBody) -> SvBody {
	SvBody {
		friction: body.friction,
		restitution: body.restitution,
		unit: body.unit,
		particles: body
			.particles
			.iter()
			.map(|p| SvParticle {
				pos: [p.pos[0], p.pos[1]],
				ppos: [p.ppos[0], p.ppos[1]],
				radius: p.radius,
				mass: p.mass,
				pinned: p.pinned,
			})
			.collect(),
		constraints: body
			.constraints
			.iter()
			.map(|c| SvConstraint {
				ps: c.ps,
				rest_length: c.rest_length,
				stiffness: c.stiffness,
				damping: c.damping,
			})
			.collect(),
		border: body.border.clone(),
	}
}

fn load_body(body: &SvBody) -> SoftBody {
	let particles = body
		.particles
		.iter()
		.map(|p| {
			let mut particle = Particle::new(
				V2::new(p.pos[0], p.pos[1]),
				p.mass,
				p.radius,
			);
			particle.ppos = V2::new(p.ppos[0], p.ppos[1]);
			particle.pinned = p.pinned;
			particle
		})
		.collect();
	let constraints = body
		.constraints
		.iter()
		.map(|c| {
			Constraint::new_with_l0(c.ps[0], c.ps[1], c.rest_length)
				.with_stiffness(c.stiffness)
				.with_damping(c.damping)
		})
		.collect();
	let mut loaded =
		SoftBody::new(particles, constraints, body.friction, body.restitution);
	loaded.border = body.border.clone();
	loaded.unit = body.unit;
	loaded
}

fn sv_collider(collider: &WorldCollider) -> SvCollider {
	let (collider_type, point, distance) = match collider.shape {
		ColliderShape::Plane { normal, offset } => {
			(ColliderType::Plane, normal, offset)
		}
		ColliderShape::OuterCircle { center, radius } => {
			(ColliderType::OuterCircle, center, radius)
		}
		ColliderShape::InnerCircle { center, radius } => {
			(ColliderType::InnerCircle, center, radius)
		}
	};
	SvCollider {
		collider_type: collider_type.tag(),
		point: [point[0], point[1]],
		distance,
		friction: collider.friction,
		restitution: collider.restitution,
	}
}

fn load_collider(collider: &SvCollider) -> Result<WorldCollider, SceneError> {
	let point = V2::new(collider.point[0], collider.point[1]);
	let shape = match ColliderType::try_from(collider.collider_type)? {
		ColliderType::Plane => ColliderShape::Plane {
			normal: point,
			offset: collider.distance,
		},
		ColliderType::OuterCircle => ColliderShape::OuterCircle {
			center: point,
			radius: collider.distance,
		},
		ColliderType::InnerCircle => ColliderShape::InnerCircle {
			center: point,
			radius: collider.distance,
		},
	};
	Ok(WorldCollider::new(shape)
		.with_friction(collider.friction)
		.with_restitution(collider.restitution))
}

#[cfg(test)]
mod test {
	use super::*;

	fn single_particle_body(pos: V2) -> SoftBody {
		SoftBody::new(
			vec![Particle::new(pos, 1.0, 1.0)],
			vec![],
			0.5,
			0.5,
		)
	}

	#[test]
	fn test_gravity_free_fall() {
		let mut world =
			World::default().with_gravity(V2::new(0., -10.));
		world.add_body(single_particle_body(V2::new(0., 0.)));
		world.step(1.0);
		// Verlet: pos += (pos - ppos) + g*dt^2
		let p = world.bodies()[0].particles[0];
		assert!(math::v2_eq(p.pos, V2::new(0., -10.)));
	}

	#[test]
	fn test_clear_is_idempotent() {
		let mut world = World::default();
		world.add_body(single_particle_body(V2::new(0., 0.)));
		world.add_collider(WorldCollider::new(ColliderShape::Plane {
			normal: V2::new(0., 1.),
			offset: 0.,
		}));
		world.clear();
		assert!(world.bodies().is_empty());
		assert!(world.colliders().is_empty());
		world.clear();
		assert!(world.bodies().is_empty());
	}

	#[test]
	fn test_pinned_particle_not_pushed_by_contact() {
		let mut world = World::default().with_gravity(V2::new(0., 0.));
		let pinned = SoftBody::new(
			vec![Particle::new(V2::new(0., 0.), 1.0, 1.0).with_pinned()],
			vec![],
			0.5,
			0.5,
		);
		world.add_body(pinned);
		world.add_body(single_particle_body(V2::new(0.5, 0.)));
		world.step(1.0);

		let p1 = world.bodies()[0].particles[0];
		let p2 = world.bodies()[1].particles[0];
		assert!(math::v2_eq(p1.pos, V2::new(0., 0.)));
		// the free particle takes the whole separation
		assert!((math::dist(p1.pos, p2.pos) - 2.0).abs() < math::EPS);
	}

	#[test]
	fn test_broad_phase_skips_distant_bodies() {
		let mut world = World::default().with_gravity(V2::new(0., 0.));
		world.add_body(single_particle_body(V2::new(0., 0.)));
		world.add_body(single_particle_body(V2::new(100., 0.)));
		world.step(0.1);
		let p1 = world.bodies()[0].particles[0];
		let p2 = world.bodies()[1].particles[0];
		assert!(math::v2_eq(p1.pos, V2::new(0., 0.)));
		assert!(math::v2_eq(p2.pos, V2::new(100., 0.)));
	}

	#[test]
	fn test_rd_model_mirrors_state() {
		let mut world = World::default();
		let poly = vec![
			V2::new(0., 0.),
			V2::new(10., 0.),
			V2::new(10., 10.),
			V2::new(0., 10.),
		];
		world.add_body(SoftBody::from_polygon(
			&poly, 2.5, 1.0, 0.5, 1.0, 0.0, 0.5, 0.5, false,
		));
		let model = world.rd_model();
		assert_eq!(model.bodies.len(), 1);
		let body = &model.bodies[0];
		assert_eq!(
			body.particles.len(),
			world.bodies()[0].particles.len()
		);
		assert_eq!(body.border.len(), 4);
		assert_eq!(
			body.edges.len(),
			world.bodies()[0].constraints.len()
		);
	}
}

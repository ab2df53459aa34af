use crate::math;
use crate::particle::Particle;
use crate::V2;

/// Static world geometry. A closed set of shapes dispatched by match,
/// so adding a shape is a compile-time-exhaustive change.
#[derive(Clone, Copy, Debug)]
pub enum ColliderShape {
	/// Half-plane: particles stay on the `dot(p, normal) >= offset` side.
	Plane { normal: V2, offset: f64 },
	/// Particles stay inside the disc.
	InnerCircle { center: V2, radius: f64 },
	/// Particles stay outside the disc.
	OuterCircle { center: V2, radius: f64 },
}

/// Shape plus the surface material shared by every variant.
#[derive(Clone, Copy, Debug)]
pub struct WorldCollider {
	pub shape: ColliderShape,
	pub friction: f64,
	pub restitution: f64,
}

impl WorldCollider {
	pub fn new(shape: ColliderShape) -> Self {
		Self {
			shape,
			friction: 0.5,
			restitution: 0.5,
		}
	}

	pub fn with_friction(mut self, friction: f64) -> Self {
		self.friction = friction;
		self
	}

	pub fn with_restitution(mut self, restitution: f64) -> Self {
		self.restitution = restitution;
		self
	}

	/// Resolves `p` against the surface. `friction`/`restitution` are the
	/// body's coefficients; the effective pair is `min` for restitution
	/// (the more absorbent surface wins) and the average for friction,
	/// Coulomb-clamped by the normal impulse. Velocity is written back
	/// through `ppos` only. Returns whether a contact was resolved.
	pub fn collide(
		&self,
		p: &mut Particle,
		friction: f64,
		restitution: f64,
	) -> bool {
		if p.pinned {
			return false;
		}

		// target surface point and unit normal into the allowed region
		let (target, n) = match self.shape {
			ColliderShape::Plane { normal, offset } => {
				let n = math::normalized(normal);
				let d = p.pos.dot(&n) - offset;
				if d >= p.radius {
					return false;
				}
				(p.pos + n * (p.radius - d), n)
			}
			ColliderShape::InnerCircle { center, radius } => {
				let mut to_p = p.pos - center;
				if to_p.magnitude() < math::EPS {
					// dead center counts as deepest interior point
					to_p = V2::new(math::EPS, 0.);
				}
				let d = to_p.magnitude();
				let max_d = radius - p.radius;
				if d <= max_d {
					return false;
				}
				let u = to_p / d;
				(center + u * max_d, -u)
			}
			ColliderShape::OuterCircle { center, radius } => {
				let mut to_p = p.pos - center;
				if to_p.magnitude() < math::EPS {
					to_p = V2::new(math::EPS, 0.);
				}
				let d = to_p.magnitude();
				let min_d = radius + p.radius;
				if d >= min_d {
					return false;
				}
				let u = to_p / d;
				(center + u * min_d, u)
			}
		};

		// implicit velocity from before the positional correction
		let v = p.pos - p.ppos;
		p.pos = target;

		let e = self.restitution.min(restitution);
		let mu = 0.5 * (self.friction + friction);

		let vn = v.dot(&n);
		let vt = v - n * vn;
		// normal impulse for a unit-mass particle, only when approaching
		let jn = if vn < 0. { -(1. + e) * vn } else { 0. };
		let new_vn = vn + jn;

		let vt_len = vt.magnitude();
		let jt = (mu * jn).min(vt_len);
		let new_vt = if vt_len < math::EPS {
			vt
		} else {
			vt * ((vt_len - jt) / vt_len)
		};

		p.ppos = p.pos - (n * new_vn + new_vt);
		true
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::math::{dist, v2_eq, EPS};

	fn plane_y0() -> WorldCollider {
		WorldCollider::new(ColliderShape::Plane {
			normal: V2::new(0., 1.),
			offset: 0.,
		})
	}

	#[test]
	fn test_plane_ignores_particle_above() {
		let c = plane_y0();
		let mut p = Particle::new(V2::new(0., 10.), 1.0, 1.0);
		assert!(!c.collide(&mut p, 0.5, 0.5));
		assert!(v2_eq(p.pos, V2::new(0., 10.)));
	}

	#[test]
	fn test_plane_pushes_to_surface() {
		let c = plane_y0();
		let mut p = Particle::new(V2::new(0., 0.2), 1.0, 1.0);
		p.ppos = V2::new(0., 1.0); // moving down
		assert!(c.collide(&mut p, 0.5, 0.5));
		assert!((p.pos[1] - 1.0).abs() < EPS);
	}

	#[test]
	fn test_plane_restitution_reflects_normal_velocity() {
		let c = plane_y0().with_restitution(1.0);
		let mut p = Particle::new(V2::new(0., 0.5), 1.0, 1.0);
		p.ppos = V2::new(0., 1.5); // vn = -1
		c.collide(&mut p, 0.5, 1.0);
		let v = p.velocity();
		assert!((v[1] - 1.0).abs() < EPS);
	}

	#[test]
	fn test_restitution_takes_the_min() {
		let c = plane_y0().with_restitution(1.0);
		let mut p = Particle::new(V2::new(0., 0.5), 1.0, 1.0);
		p.ppos = V2::new(0., 1.5);
		c.collide(&mut p, 0.5, 0.0); // absorbent body wins
		let v = p.velocity();
		assert!(v[1].abs() < EPS);
	}

	#[test]
	fn test_friction_clamped_by_normal_impulse() {
		let c = plane_y0().with_restitution(0.0).with_friction(1.0);
		let mut p = Particle::new(V2::new(0., 0.5), 1.0, 1.0);
		p.ppos = V2::new(-2., 1.0); // v = (2, -0.5)
		c.collide(&mut p, 1.0, 0.0);
		let v = p.velocity();
		// |jn| = 0.5, mu = 1: tangential speed drops by at most 0.5
		assert!((v[0] - 1.5).abs() < EPS);
		assert!(v[1].abs() < EPS);
	}

	#[test]
	fn test_pinned_particle_skipped() {
		let c = plane_y0();
		let mut p = Particle::new(V2::new(0., -1.), 1.0, 1.0).with_pinned();
		assert!(!c.collide(&mut p, 0.5, 0.5));
		assert!(v2_eq(p.pos, V2::new(0., -1.)));
	}

	#[test]
	fn test_inner_circle_containment_is_exact() {
		let center = V2::new(0., 0.);
		let c = WorldCollider::new(ColliderShape::InnerCircle {
			center,
			radius: 10.0,
		});
		let mut p = Particle::new(V2::new(10., 0.), 1.0, 1.0);
		p.ppos = V2::new(9., 0.);
		assert!(c.collide(&mut p, 0.5, 0.5));
		assert!((dist(p.pos, center) - 9.0).abs() < EPS);
	}

	#[test]
	fn test_inner_circle_center_is_inside() {
		let c = WorldCollider::new(ColliderShape::InnerCircle {
			center: V2::new(0., 0.),
			radius: 5.0,
		});
		let mut p = Particle::new(V2::new(0., 0.), 1.0, 1.0);
		assert!(!c.collide(&mut p, 0.5, 0.5));
	}

	#[test]
	fn test_outer_circle_pushes_out() {
		let center = V2::new(0., 0.);
		let c = WorldCollider::new(ColliderShape::OuterCircle {
			center,
			radius: 5.0,
		});
		let mut p = Particle::new(V2::new(4.5, 0.), 1.0, 1.0);
		p.ppos = V2::new(5.5, 0.);
		assert!(c.collide(&mut p, 0.5, 0.5));
		assert!((dist(p.pos, center) - 6.0).abs() < EPS);
	}

	#[test]
	fn test_outer_circle_zero_distance_degenerate() {
		let c = WorldCollider::new(ColliderShape::OuterCircle {
			center: V2::new(0., 0.),
			radius: 5.0,
		});
		let mut p = Particle::new(V2::new(0., 0.), 1.0, 1.0);
		// must not NaN out, must end on the surface
		assert!(c.collide(&mut p, 0.5, 0.5));
		assert!((dist(p.pos, V2::new(0., 0.)) - 6.0).abs() < EPS);
		assert!(p.pos[0].is_finite() && p.pos[1].is_finite());
	}
}

// sv_model: saved scene state, enough to continue the same trajectory
// after a round trip.

use serde::{Deserialize, Serialize};

use crate::error::SceneError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColliderType {
	Plane = 0,
	OuterCircle = 1,
	InnerCircle = 2,
}

impl ColliderType {
	pub fn tag(self) -> u8 {
		self as u8
	}
}

impl TryFrom<u8> for ColliderType {
	type Error = SceneError;

	fn try_from(tag: u8) -> Result<Self, SceneError> {
		match tag {
			0 => Ok(ColliderType::Plane),
			1 => Ok(ColliderType::OuterCircle),
			2 => Ok(ColliderType::InnerCircle),
			t => Err(SceneError::UnknownColliderType(t)),
		}
	}
}

/// `ppos` is saved along with `pos` so implicit velocity survives the
/// round trip.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SvParticle {
	pub pos: [f64; 2],
	pub ppos: [f64; 2],
	pub radius: f64,
	pub mass: f64,
	pub pinned: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SvConstraint {
	pub ps: [usize; 2],
	pub rest_length: f64,
	pub stiffness: f64,
	pub damping: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SvBody {
	pub friction: f64,
	pub restitution: f64,
	pub unit: f64,
	pub particles: Vec<SvParticle>,
	pub constraints: Vec<SvConstraint>,
	pub border: Vec<usize>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SvCollider {
	pub collider_type: u8,
	/// Plane normal, or circle center.
	pub point: [f64; 2],
	/// Plane offset, or circle radius.
	pub distance: f64,
	pub friction: f64,
	pub restitution: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SvScene {
	pub gravity: [f64; 2],
	pub bodies: Vec<SvBody>,
	pub colliders: Vec<SvCollider>,
}

impl SvScene {
	pub fn to_json(&self) -> Result<String, SceneError> {
		serde_json::to_string(self)
			.map_err(|e| SceneError::Parse(e.to_string()))
	}

	pub fn from_json(data: &str) -> Result<Self, SceneError> {
		let scene: SvScene = serde_json::from_str(data)
			.map_err(|e| SceneError::Parse(e.to_string()))?;
		scene.validate()?;
		Ok(scene)
	}

	/// Referential checks that serde cannot express: collider tags must
	/// be known, constraint and border indices must hit the particle
	/// store they belong to.
	pub fn validate(&self) -> Result<(), SceneError> {
		for c in self.colliders.iter() {
			ColliderType::try_from(c.collider_type)?;
		}
		for body in self.bodies.iter() {
			let count = body.particles.len();
			for c in body.constraints.iter() {
				for &index in c.ps.iter() {
					if index >= count {
						return Err(SceneError::ParticleOutOfBounds {
							index,
							count,
						});
					}
				}
			}
			for &index in body.border.iter() {
				if index >= count {
					return Err(SceneError::ParticleOutOfBounds {
						index,
						count,
					});
				}
			}
		}
		Ok(())
	}
}

use std::fmt;

/// Errors raised while loading or validating a saved scene.
///
/// Runtime physics never fails: degenerate geometry inside a step is
/// defined as a no-op. Only scene construction from external data is
/// fallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
	/// Collider type tag outside the known set. Unknown tags are
	/// rejected instead of falling back to a plane.
	UnknownColliderType(u8),
	/// A constraint or border entry points past the particle store.
	ParticleOutOfBounds { index: usize, count: usize },
	/// The payload is not a valid scene document.
	Parse(String),
}

impl fmt::Display for SceneError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SceneError::UnknownColliderType(tag) => {
				write!(f, "unknown collider type tag {}", tag)
			}
			SceneError::ParticleOutOfBounds { index, count } => {
				write!(
					f,
					"particle index {} out of bounds (count: {})",
					index, count
				)
			}
			SceneError::Parse(msg) => write!(f, "scene parse error: {}", msg),
		}
	}
}

impl std::error::Error for SceneError {}

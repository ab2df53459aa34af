// rd_model: read-only simulation state for host rendering.

pub struct RdParticle {
	pub pos: [f64; 2],
	pub radius: f64,
}

pub struct RdBody {
	pub particles: Vec<RdParticle>,
	/// Positions of the original polygon vertices, in input order.
	pub border: Vec<[f64; 2]>,
	/// Constraint endpoints as particle index pairs.
	pub edges: Vec<[usize; 2]>,
}

pub struct RdModel {
	pub bodies: Vec<RdBody>,
}

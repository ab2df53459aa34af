// Polygon-to-mesh generation: subdivide the outline, then grow rings
// inward along angle bisectors until the interior is filled.

use std::f64::consts::PI;

use fnv::{FnvHashMap, FnvHashSet};

use crate::math;
use crate::V2;

/// Vertices with an interior angle sharper than this collapse into a
/// bridging edge instead of producing an offset point.
const MERGE_ANGLE: f64 = 120. * PI / 180.;

pub struct MeshData {
	pub points: Vec<V2>,
	/// Deduplicated, order-independent constraint edges, sorted for
	/// reproducible body construction.
	pub edges: Vec<[usize; 2]>,
	/// Point ids of the original polygon vertices, in input order.
	pub border: Vec<usize>,
	/// Point ids of the full subdivided outline ring.
	pub outline: Vec<usize>,
}

/// Spatial point table with quantized grid buckets. Lookup probes the
/// 3x3 neighborhood with a true distance test, so rounding stays
/// consistent at bucket boundaries.
struct PointTable {
	eps: f64,
	points: Vec<V2>,
	buckets: FnvHashMap<(i64, i64), Vec<usize>>,
}

impl PointTable {
	fn new(eps: f64) -> Self {
		Self {
			eps,
			points: Vec::new(),
			buckets: FnvHashMap::default(),
		}
	}

	fn key(&self, p: V2) -> (i64, i64) {
		(
			(p[0] / self.eps).round() as i64,
			(p[1] / self.eps).round() as i64,
		)
	}

	fn lookup(&self, p: V2) -> Option<usize> {
		let (kx, ky) = self.key(p);
		for dx in -1..=1 {
			for dy in -1..=1 {
				let ids = match self.buckets.get(&(kx + dx, ky + dy)) {
					Some(ids) => ids,
					None => continue,
				};
				for &id in ids.iter() {
					let q = self.points[id];
					if (q[0] - p[0]).abs() <= self.eps
						&& (q[1] - p[1]).abs() <= self.eps
					{
						return Some(id);
					}
				}
			}
		}
		None
	}

	/// Existing id within tolerance, or a freshly inserted one.
	fn get_id(&mut self, p: V2) -> usize {
		if let Some(id) = self.lookup(p) {
			return id;
		}
		let id = self.points.len();
		let key = self.key(p);
		self.points.push(p);
		self.buckets.entry(key).or_default().push(id);
		id
	}

	fn len(&self) -> usize {
		self.points.len()
	}
}

fn add_edge(edges: &mut FnvHashSet<(usize, usize)>, a: usize, b: usize) {
	if a != b {
		edges.insert((a.min(b), a.max(b)));
	}
}

fn interpolate(a: V2, b: V2, t: f64) -> V2 {
	a + (b - a) * t
}

/// Splits `[p1, p2]` into n equal pieces: n+1 points, endpoints included.
fn divide_segment(p1: V2, p2: V2, n: usize) -> Vec<V2> {
	if math::v2_eq(p1, p2) {
		return vec![p1];
	}
	if n == 0 {
		return vec![p1, p2];
	}
	(0..=n)
		.map(|i| interpolate(p1, p2, i as f64 / n as f64))
		.collect()
}

fn is_clockwise(ring: &[V2]) -> bool {
	let n = ring.len();
	let mut shoelace = 0.;
	for i in 0..n {
		let a = ring[i];
		let b = ring[(i + 1) % n];
		shoelace += a[0] * b[1] - b[0] * a[1];
	}
	shoelace < 0.
}

/// Same-sign cross test. Exact for convex rings, which is enough to
/// reject offset points that escaped the current ring.
fn point_in_ring(p: V2, ring: &[V2]) -> bool {
	let n = ring.len();
	if n < 3 {
		return false;
	}
	let mut sign = 0.;
	for i in 0..n {
		let a = ring[i];
		let b = ring[(i + 1) % n];
		let c = math::cross(b - a, p - a);
		if c.abs() > 1e-9 {
			if sign == 0. {
				sign = c;
			} else if sign * c < 0. {
				return false;
			}
		}
	}
	true
}

/// Offsets `ring` inward layer by layer, stitching each layer to the
/// previous one. Stops when fewer than 3 offset points survive or when
/// an iteration produces no new points.
fn grow_rings(
	table: &mut PointTable,
	edges: &mut FnvHashSet<(usize, usize)>,
	mut ring: Vec<V2>,
	spacing: f64,
) {
	while ring.len() >= 3 {
		let n = ring.len();
		let clockwise = is_clockwise(&ring);
		let mut next_ring: Vec<V2> = Vec::new();
		let mut next_src: Vec<usize> = Vec::new();

		for i in 0..n {
			let a = ring[(i + n - 1) % n];
			let b = ring[i];
			let c = ring[(i + 1) % n];

			let ab = math::normalized(a - b);
			let cb = math::normalized(c - b);
			let angle = ab.dot(&cb).clamp(-1., 1.).acos();

			if angle < MERGE_ANGLE {
				// sharp corner: bridge the neighbors, drop the vertex
				let id_a = table.get_id(a);
				let id_c = table.get_id(c);
				add_edge(edges, id_a, id_c);
				continue;
			}

			let mut bisector = ab + cb;
			if bisector.magnitude() < 1e-6 {
				// straight vertex: inward perpendicular
				bisector = V2::new(-ab[1], ab[0]);
				if !clockwise {
					bisector = -bisector;
				}
			}
			let inner = b + math::normalized(bisector) * spacing;
			if point_in_ring(inner, &ring) {
				next_ring.push(inner);
				next_src.push(i);
			}
		}

		if next_ring.len() < 3 {
			break;
		}

		let before = table.len();

		// stitch the ring gap
		let nn = next_ring.len();
		for i in 0..nn {
			let src = next_src[i];
			let a1 = table.get_id(ring[(src + n - 1) % n]);
			let a2 = table.get_id(ring[src]);
			let a3 = table.get_id(ring[(src + 1) % n]);
			let b1 = table.get_id(next_ring[(i + nn - 1) % nn]);
			let b2 = table.get_id(next_ring[i]);
			let b3 = table.get_id(next_ring[(i + 1) % nn]);

			add_edge(edges, a1, b1);
			add_edge(edges, a2, b1);
			add_edge(edges, a2, b2);
			add_edge(edges, a3, b2);
			add_edge(edges, b1, b2);
			add_edge(edges, b2, b3);
		}

		if table.len() == before {
			// every offset point deduped onto an existing one
			break;
		}

		// next iteration works on the deduplicated offset ring
		let mut seen: Vec<usize> = Vec::new();
		let mut reduced: Vec<V2> = Vec::new();
		for &p in next_ring.iter() {
			let id = table.get_id(p);
			if !seen.contains(&id) {
				seen.push(id);
				reduced.push(table.points[id]);
			}
		}
		ring = reduced;
	}
}

/// Fallback for unusable spacing: the polygon vertices alone, ring
/// connected, no subdivision and no interior.
fn outline_only(polygon: &[V2]) -> MeshData {
	let mut table = PointTable::new(math::EPS);
	let mut edges: FnvHashSet<(usize, usize)> = FnvHashSet::default();
	let mut border = Vec::with_capacity(polygon.len());
	for &p in polygon.iter() {
		border.push(table.get_id(p));
	}
	let m = border.len();
	for i in 0..m {
		add_edge(&mut edges, border[i], border[(i + 1) % m]);
	}
	let mut edge_list: Vec<[usize; 2]> =
		edges.into_iter().map(|(a, b)| [a, b]).collect();
	edge_list.sort_unstable();
	MeshData {
		points: table.points,
		edges: edge_list,
		outline: border.clone(),
		border,
	}
}

/// Meshes a simple polygon at roughly `unit` spacing. Every original
/// edge is represented by at least one constraint edge and the result
/// graph is connected.
pub fn mesh_polygon(polygon: &[V2], unit: f64) -> MeshData {
	if !unit.is_finite() || unit <= 0. {
		eprintln!("WARN: bad mesh unit {}, outline only", unit);
		return outline_only(polygon);
	}
	let mut table = PointTable::new(unit * 0.25);
	let mut edges: FnvHashSet<(usize, usize)> = FnvHashSet::default();

	// subdivided outline
	let n = polygon.len();
	let mut border = Vec::with_capacity(n);
	let mut ring: Vec<V2> = Vec::new();
	for i in 0..n {
		let p1 = polygon[i];
		let p2 = polygon[(i + 1) % n];
		border.push(table.get_id(p1));
		let pieces = ((math::dist(p1, p2) / unit).floor() as usize).max(1);
		let seg = divide_segment(p1, p2, pieces);
		for j in 0..seg.len().saturating_sub(1) {
			let id1 = table.get_id(seg[j]);
			let id2 = table.get_id(seg[j + 1]);
			add_edge(&mut edges, id1, id2);
			// the last point of each segment opens the next one
			ring.push(table.points[id1]);
		}
	}
	let outline: Vec<usize> =
		ring.iter().map(|&p| table.get_id(p)).collect();

	if ring.len() >= 3 {
		grow_rings(&mut table, &mut edges, ring, unit);
	}

	let mut edge_list: Vec<[usize; 2]> =
		edges.into_iter().map(|(a, b)| [a, b]).collect();
	edge_list.sort_unstable();

	MeshData {
		points: table.points,
		edges: edge_list,
		border,
		outline,
	}
}

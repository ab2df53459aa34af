use crate::V2;

/// Tolerance for degenerate-geometry checks and drift-absorbing equality.
pub const EPS: f64 = 1e-8;

/// Scalar 2d cross product, used for orientation and sign tests.
pub fn cross(a: V2, b: V2) -> f64 {
	a[0] * b[1] - a[1] * b[0]
}

/// Maps the zero vector to itself instead of dividing. Collision code
/// normalizes potentially-zero separation vectors, so this must never
/// fail.
pub fn normalized(v: V2) -> V2 {
	let l = v.magnitude();
	if l < EPS {
		V2::new(0., 0.)
	} else {
		v / l
	}
}

pub fn dist(a: V2, b: V2) -> f64 {
	(a - b).magnitude()
}

/// Component-wise equality under `EPS`.
pub fn v2_eq(a: V2, b: V2) -> bool {
	(a[0] - b[0]).abs() < EPS && (a[1] - b[1]).abs() < EPS
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_normalized_zero_is_zero() {
		assert_eq!(normalized(V2::new(0., 0.)), V2::new(0., 0.));
	}

	#[test]
	fn test_normalized_idempotent() {
		let v = V2::new(3., -4.);
		let n1 = normalized(v);
		let n2 = normalized(n1);
		assert!(v2_eq(n1, n2));
		assert!((n1.magnitude() - 1.).abs() < EPS);
	}

	#[test]
	fn test_cross_orientation() {
		let x = V2::new(1., 0.);
		let y = V2::new(0., 1.);
		assert!((cross(x, y) - 1.).abs() < EPS);
		assert!((cross(y, x) + 1.).abs() < EPS);
		assert_eq!(cross(x, x), 0.);
	}

	#[test]
	fn test_eq_absorbs_drift() {
		let a = V2::new(1., 1.);
		let b = V2::new(1. + 1e-9, 1. - 1e-9);
		assert!(v2_eq(a, b));
		assert!(!v2_eq(a, V2::new(1.1, 1.)));
	}
}

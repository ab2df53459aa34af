pub mod bound;
pub mod collider;
pub mod constraint;
pub mod math;
mod mesh;
pub mod particle;
pub mod softbody;
pub mod world;

pub type V2 = nalgebra::Vector2<f64>;

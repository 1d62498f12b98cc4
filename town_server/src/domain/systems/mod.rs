// Fixed-step simulation systems.

pub mod pong_physics;

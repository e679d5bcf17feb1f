pub mod body;
pub mod clock;
pub mod config;
pub mod constants;
pub mod gravity;
pub mod input;
pub mod mapper;
pub mod midi;
pub mod particle;
pub mod pendulum;
pub mod sim;
pub mod state;
pub mod sweep;
pub static SHAPES_WGSL: &str = include_str!("../shaders/shapes.wgsl");

pub use body::*;
pub use clock::*;
pub use config::*;
pub use gravity::*;
pub use input::*;
pub use mapper::*;
pub use midi::*;
pub use particle::*;
pub use pendulum::*;
pub use sim::*;
pub use state::*;
pub use sweep::*;

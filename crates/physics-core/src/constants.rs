use glam::Vec2;

// Shared simulation/output tuning constants used by the core and the native frontend.

// Frame clock
pub const FRAMES_PER_SECOND: f32 = 60.0;
pub const FRAME_DT: f32 = 1.0 / FRAMES_PER_SECOND; // fixed integration step (seconds)
pub const MAX_CATCH_UP_STEPS: u32 = 5; // cap on fixed steps run for one redraw
pub const GRIP_STILL_SEC: f32 = 0.1; // a held body this long without pointer movement has zero exit velocity

// Scene layout (logical units, top-left origin, y down)
pub const SCENE_WIDTH: f32 = 800.0;
pub const SCENE_HEIGHT: f32 = 600.0;

// MIDI ranges
pub const CC_MIN: i32 = 0;
pub const CC_MAX: i32 = 127;
pub const PITCH_BEND_MIN: i32 = -8192;
pub const PITCH_BEND_MAX: i32 = 8192;
pub const PITCH_BEND_CENTER_WIRE: i32 = 8192; // 14-bit wire value for zero bend
pub const DEFAULT_CHANNEL: u8 = 1; // 1-based

// Gravity module
pub const GRAVITY_PULL: f32 = 288.0; // stiffness at full strength (1/s^2)
pub const GRAVITY_SNAP_THRESHOLD: f32 = 0.5; // below this a slider is forced to exactly 0
pub const GRAVITY_SETTLE_RATE_TIME: f32 = 10.0; // omega * t budget for settle_frames()
pub const GRAVITY_START_VALUE: f32 = 64.0;
pub const GRAVITY_DEFAULT_CCS: [u8; 3] = [74, 75, 76];

// Particle module
pub const PARTICLE_AREA_ORIGIN: Vec2 = Vec2::new(50.0, 130.0);
pub const PARTICLE_AREA_SIZE: Vec2 = Vec2::new(400.0, 400.0);
pub const PARTICLE_RADIUS: f32 = 15.0;
pub const PARTICLE_SPAWN_MARGIN: f32 = 50.0; // keep spawn points away from the walls
pub const PARTICLE_INITIAL_SPEED: f32 = 180.0; // max per-axis spawn speed (units/s)
pub const PARTICLE_MAX_SPEED: f32 = 600.0; // hard cap after jitter (units/s)
pub const PARTICLE_JITTER: f32 = 12.0; // per-frame velocity nudge at full temperature (units/s)
pub const PARTICLE_MAX_SPEED_MULTIPLIER: f32 = 3.0; // speed multiplier at temperature 1
pub const PARTICLE_DEFAULT_TEMPERATURE: f32 = 0.5;
pub const PARTICLE_DEFAULT_CCS: [[u8; 2]; 2] = [[74, 75], [76, 77]]; // [red xy, green xy]
pub const PARTICLE_DEFAULT_SEED: u64 = 42;

// Pendulum module
pub const PENDULUM_GRAVITY: f32 = 980.0; // scene units per second^2
pub const PENDULUM_DAMPING: f32 = 0.06; // angular velocity loss per second
pub const PENDULUM_DEFAULT_LENGTH: f32 = 200.0;
pub const PENDULUM_MIN_LENGTH: f32 = 100.0;
pub const PENDULUM_MAX_LENGTH: f32 = 300.0;
pub const PENDULUM_START_ANGLE: f32 = std::f32::consts::FRAC_PI_4;
pub const PENDULUM_MAX_DRAG_ANGLE: f32 = std::f32::consts::PI * 0.8;
pub const PENDULUM_OUTPUT_ANGLE: f32 = std::f32::consts::FRAC_PI_2; // +/- range mapped to output
pub const PENDULUM_PIVOT: Vec2 = Vec2::new(400.0, 150.0);
pub const PENDULUM_BOB_RADIUS: f32 = 20.0;
pub const PENDULUM_TRAIL_LEN: usize = 50;
pub const PENDULUM_DEFAULT_CC: u8 = 74;

// Connection sweep
pub const SWEEP_RATE: f32 = 30.0; // CC units per second, half a step per frame
pub const SWEEP_DEFAULT_CC: u8 = 74; // filter cutoff on many synths

// Palette
pub const RED: [f32; 4] = [1.0, 0.39, 0.39, 1.0];
pub const GREEN: [f32; 4] = [0.39, 1.0, 0.39, 1.0];
pub const BLUE: [f32; 4] = [0.2, 0.35, 1.0, 1.0];
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const GRAY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
pub const DARK_GRAY: [f32; 4] = [0.16, 0.16, 0.16, 1.0];

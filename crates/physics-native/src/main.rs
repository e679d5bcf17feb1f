mod cli;
mod midi_out;
mod render;

use anyhow::Context;
use glam::Vec2;
use smallvec::SmallVec;
use std::time::Instant;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use cli::{ModuleKind, Options};
use physics_core::constants::{SCENE_HEIGHT, SCENE_WIDTH};
use physics_core::{
    Config, DeviceId, FrameClock, FrameReport, GravityModule, ParticleModule, PendulumModule,
    PointerEvent, PointerPhase, Shape, Simulation, SweepModule,
};
use render::GpuState;

fn build_module(kind: ModuleKind, config: &Config, device: &DeviceId) -> Box<dyn Simulation> {
    let mut module: Box<dyn Simulation> = match kind {
        ModuleKind::Gravity => Box::new(GravityModule::from_config(config)),
        ModuleKind::Particle => Box::new(ParticleModule::from_config(config)),
        ModuleKind::Pendulum => Box::new(PendulumModule::from_config(config)),
        ModuleKind::Sweep => Box::new(SweepModule::from_config(config)),
    };
    module.route_output(device, config.channel());
    log::info!("[app] running {} module", module.name());
    module
}

fn load_config(opts: &Options) -> anyhow::Result<Config> {
    let mut config = match &opts.config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config = Config::from_json_str(&text)?;
            log::info!("[config] loaded {}", path.display());
            config
        }
        None => Config::default(),
    };
    opts.apply(&mut config);
    // rejections are logged by sanitize itself
    config.sanitize();
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let Some(opts) = cli::parse_args() else {
        return Ok(());
    };

    if opts.list_devices {
        for (i, name) in midi_out::port_names()?.iter().enumerate() {
            println!("{i}: {name}");
        }
        return Ok(());
    }

    let config = load_config(&opts)?;
    let mut sink = midi_out::open_sink(&config.midi, opts.dry_run);
    let device = sink.device();
    let mut sim = build_module(opts.module, &config, &device);

    let scene = Vec2::new(SCENE_WIDTH, SCENE_HEIGHT);
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("MIDI Physics")
        .with_inner_size(winit::dpi::LogicalSize::new(SCENE_WIDTH, SCENE_HEIGHT))
        .build(&event_loop)?;

    let mut state = pollster::block_on(GpuState::new(&window, scene))?;
    let mut clock = FrameClock::default();
    let mut last_tick = Instant::now();
    let mut cursor = Vec2::ZERO;
    // pointer input gathered between frames, applied before the next step
    let mut pending: SmallVec<[PointerEvent; 8]> = SmallVec::new();
    let mut shapes: Vec<Shape> = Vec::new();
    let mut totals = FrameReport::default();
    let mut title = String::new();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => state.resize(size),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => {
            log::info!(
                "[midi] {} messages sent, {} failed sends",
                totals.sent,
                totals.failures
            );
            elwt.exit();
        }
        Event::WindowEvent {
            event: WindowEvent::CursorMoved { position, .. },
            ..
        } => {
            cursor = state.to_scene(position.x, position.y);
            pending.push(PointerEvent {
                phase: PointerPhase::Move,
                position: cursor,
            });
        }
        Event::WindowEvent {
            event:
                WindowEvent::MouseInput {
                    state: button_state,
                    button: MouseButton::Left,
                    ..
                },
            ..
        } => {
            let phase = match button_state {
                ElementState::Pressed => PointerPhase::Down,
                ElementState::Released => PointerPhase::Up,
            };
            pending.push(PointerEvent {
                phase,
                position: cursor,
            });
        }
        Event::WindowEvent {
            event:
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                },
            ..
        } => match logical_key {
            Key::Named(NamedKey::Escape) => elwt.exit(),
            Key::Character(c) => {
                let kind = match c.as_str() {
                    "1" => Some(ModuleKind::Gravity),
                    "2" => Some(ModuleKind::Particle),
                    "3" => Some(ModuleKind::Pendulum),
                    "4" => Some(ModuleKind::Sweep),
                    _ => None,
                };
                if let Some(kind) = kind {
                    pending.clear();
                    sim = build_module(kind, &config, &device);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            for ev in pending.drain(..) {
                sim.handle_pointer(ev);
            }

            let now = Instant::now();
            let steps = clock.advance(now - last_tick);
            last_tick = now;
            for _ in 0..steps {
                let report = sim.step(clock.step_sec(), sink.as_mut());
                totals.sent += report.sent;
                totals.failures += report.failures;
            }

            let status = format!("{} | {}", sim.status(), sink.describe());
            if status != title {
                state.window.set_title(&status);
                title = status;
            }

            shapes.clear();
            sim.shapes(&mut shapes);
            match state.render(&shapes) {
                Ok(_) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(_) => {}
            }
        }
        _ => {}
    })?;
    Ok(())
}

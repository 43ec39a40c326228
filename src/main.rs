//! Woodcutter
//!
//! Grab the axe with both mouse buttons, swing it down into a log, split it.
//! Walk with WASD, jump with Space, crouch with C.
//! Run with `--headless` for a scripted chop without a window.

use std::f32::consts::PI;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use woodcut_core::{
    ChopSession, FrameInput, GripInput, Hand, MemorySettingsStore, Quat, Scene, SettingsStore, TomlSettingsStore,
    Vec3, VolumeSettings, WOOD_TAG,
};
use woodcutter::config::AppConfig;
use woodcutter::input::{InputAction, InputMapper, InputState, PlayerController};
use woodcutter::systems::{LogAudio, LogEffects, SimulationSystem, TitleStatus, WindowSystem};

/// Main application state
struct App {
    config: AppConfig,
    window: Option<WindowSystem>,
    session: ChopSession,
    simulation: SimulationSystem,
    input: InputState,
    controller: PlayerController,
    settings: Box<dyn SettingsStore>,
}

impl App {
    fn new(config: AppConfig, session: ChopSession, settings: Box<dyn SettingsStore>) -> Self {
        let simulation = SimulationSystem::new(
            session.player_position(),
            config.hands.clone(),
            config.player.clone(),
            config.presentation.mouse_scale,
        );
        Self {
            config,
            window: None,
            session,
            simulation,
            input: InputState::new(),
            controller: PlayerController::new(),
            settings,
        }
    }

    fn frame(&mut self) {
        self.simulation.update(&mut self.session, &mut self.input, &mut self.controller);

        if let Some(window) = &mut self.window {
            window.apply_presentation(self.session.presentation());
            let status = TitleStatus::from_presentation(
                self.session.presentation(),
                self.session.wood_collected(),
                self.session.is_paused(),
            );
            window.update_title(&status);
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match WindowSystem::create(event_loop, &self.config.window) {
            Ok(mut window) => {
                window.apply_presentation(self.session.presentation());
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(key) = event.physical_key {
                    if self.controller.process_keyboard(key, event.state) {
                        return;
                    }
                    match InputMapper::map_keyboard(key, event.state) {
                        Some(InputAction::ToggleFullscreen) => {
                            if let Some(window) = &self.window {
                                window.toggle_fullscreen();
                            }
                        }
                        Some(action) => {
                            self.input.apply_action(action);
                        }
                        None => {}
                    }
                }
            }

            WindowEvent::Focused(false) => {
                self.controller.release_all();
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.input.process_mouse_button(button, state);
            }

            WindowEvent::RedrawRequested => self.frame(),

            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.process_mouse_motion(delta.0, delta.1);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        save_volumes(&self.session, self.settings.as_mut());
    }
}

fn build_session(config: &AppConfig) -> Result<ChopSession, Box<dyn std::error::Error>> {
    let scene = Scene::load(&config.scene.path)?;
    let mut session = ChopSession::from_scene(&scene, config.to_session_config())?
        .with_audio(Box::new(LogAudio::new()))
        .with_effects(Box::new(LogEffects::new()));
    if let Some(seed) = config.debug.seed {
        session = session.with_seed(seed);
    }
    log::info!(
        "Loaded scene '{}': {} entities, {} logs",
        scene.name,
        session.world().entity_count(),
        session.world().count_tagged(WOOD_TAG)
    );
    Ok(session)
}

fn open_settings(config: &AppConfig) -> Box<dyn SettingsStore> {
    match TomlSettingsStore::open(&config.audio.settings_path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("Failed to read settings: {}. Using defaults.", e);
            Box::new(MemorySettingsStore::new())
        }
    }
}

fn save_volumes(session: &ChopSession, settings: &mut dyn SettingsStore) {
    if let Err(e) = session.volumes().save(settings) {
        log::warn!("Failed to save settings: {}", e);
    }
}

/// Grab the axe over the nearest log and bring it down hard
fn run_headless(mut session: ChopSession, settings: &mut dyn SettingsStore) {
    const DT: f32 = 1.0 / 60.0;

    let Some(target) = session.world().tagged(WOOD_TAG).first().copied() else {
        log::warn!("No wood to chop");
        return;
    };
    let Some(top) = session.world().get_entity(target).and_then(|e| e.world_bounds()) else {
        log::warn!("Target log has no bounds");
        return;
    };

    // Head down, hovering over the log
    let axe = session.axe();
    if let Some(body) = session.world_mut().body_of_mut(axe) {
        body.rotation = Quat::from_axis_angle(Vec3::X, PI);
        body.position = Vec3::new(top.center().x, top.max.y + 1.0, top.center().z);
    }
    session.world_mut().sync_transforms();

    let mut left = session.grip().grab_point_world(session.world(), Hand::Left).unwrap_or(Vec3::ZERO);
    let mut right = session.grip().grab_point_world(session.world(), Hand::Right).unwrap_or(Vec3::ZERO);
    let grab = FrameInput {
        grip: GripInput {
            left_pressed: true,
            right_pressed: true,
            left_target: Some(left),
            right_target: Some(right),
            ..GripInput::default()
        },
        ..FrameInput::default()
    };
    session.tick(&grab, DT);

    let mut chops = 0;
    let mut slices = 0;
    for _ in 0..30 {
        left.y -= 0.15;
        right.y -= 0.15;
        let swing = FrameInput {
            grip: GripInput {
                left_target: Some(left),
                right_target: Some(right),
                ..GripInput::default()
            },
            ..FrameInput::default()
        };
        let report = session.tick(&swing, DT);
        chops += report.impacts().count();
        slices += report.slices().filter(|s| s.is_sliced()).count();
    }

    let release = FrameInput {
        grip: GripInput {
            left_released: true,
            right_released: true,
            ..GripInput::default()
        },
        ..FrameInput::default()
    };
    session.tick(&release, DT);
    for _ in 0..60 {
        session.tick(&FrameInput::default(), DT);
    }

    log::info!(
        "Headless chop done: {} impact(s), {} slice(s), {} piece(s) of wood in the yard",
        chops,
        slices,
        session.world().count_tagged(WOOD_TAG)
    );
    save_volumes(&session, settings);
}

fn main() {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.debug.log_level.as_str())).init();
    log::info!("Starting Woodcutter");

    let mut session = match build_session(&config) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };
    let mut settings = open_settings(&config);
    session.set_volumes(VolumeSettings::load(settings.as_ref()));

    if std::env::args().any(|arg| arg == "--headless") {
        run_headless(session, settings.as_mut());
        return;
    }

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, session, settings);
    event_loop.run_app(&mut app).expect("Event loop error");
}

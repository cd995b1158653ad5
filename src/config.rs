use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "TILEWALK";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: i32,
    pub height: i32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        WindowSettings {
            title: "Tilewalk".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    pub tile_thickness: f32,
    pub floor_texture: String,
}

impl Default for LevelSettings {
    fn default() -> Self {
        LevelSettings {
            width: 10,
            height: 10,
            tile_size: 50.0,
            tile_thickness: 1.0,
            floor_texture: "textures/floor.jpg".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// World units per frame tick
    pub velocity: f32,
    pub model_path: String,
    pub model_scale: f32,
    pub chat_text: String,
    /// Bubble anchor height above the player's feet
    pub chat_height: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        PlayerSettings {
            velocity: tilewalk_motion::DEFAULT_VELOCITY,
            model_path: "models/playernew.glb".to_string(),
            model_scale: 25.0,
            chat_text: "Hello! world".to_string(),
            chat_height: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fovy_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            position: [600.0, 600.0, 800.0],
            target: [0.0, 0.0, 0.0],
            fovy_degrees: 45.0,
            near: 1.0,
            far: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub status_interval_ms: u64,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        TelemetrySettings {
            status_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub level: LevelSettings,
    pub player: PlayerSettings,
    pub camera: CameraSettings,
    pub telemetry: TelemetrySettings,
}

impl Settings {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Message(msg.to_string()));

        if self.level.width == 0 || self.level.height == 0 {
            return invalid("level.width and level.height must be non-zero");
        }
        if !(self.level.tile_size > 0.0) {
            return invalid("level.tile_size must be positive");
        }
        if !(self.player.velocity > 0.0 && self.player.velocity.is_finite()) {
            return invalid("player.velocity must be positive");
        }
        if !(self.player.model_scale > 0.0) {
            return invalid("player.model_scale must be positive");
        }
        if !(self.camera.near > 0.0 && self.camera.near < self.camera.far) {
            return invalid("camera.near must be positive and less than camera.far");
        }
        if self.window.width <= 0 || self.window.height <= 0 {
            return invalid("window.width and window.height must be positive");
        }
        Ok(())
    }
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(DEFAULT_CONFIG_PATH)
}

/// Loads settings from an optional TOML file, then `TILEWALK__SECTION__KEY`
/// environment overrides.
pub fn load_settings_from(path: &str) -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let builder = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    match settings_from(builder) {
        Ok(settings) => {
            info!(?settings, "Successfully loaded configuration");
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

fn settings_from(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

use macroquad::prelude::*;
use std::f32::consts::TAU;
use tracing::{info, warn};

use tilewalk_motion::{Action, Avatar, ChatBubble};

use crate::config::WindowSettings;
use crate::game::Game;
use crate::input::InputPump;
use crate::picking::from_motion;

const CHAT_PADDING: f32 = 10.0;
const CHAT_FONT_SIZE: u16 = 20;
const HUD_FONT_SIZE: f32 = 20.0;

/// Body proportions relative to the model scale.
const BODY_WIDTH: f32 = 0.8;
const BODY_HEIGHT: f32 = 1.6;
const HEAD_RADIUS: f32 = 0.35;
const RUN_BOB: f32 = 0.15;

// Function to configure the macroquad window
pub fn window_conf(window: &WindowSettings) -> Conf {
    Conf {
        window_title: window.title.clone(),
        window_width: window.width,
        window_height: window.height,
        high_dpi: true,
        ..Default::default()
    }
}

/// Loads the floor texture. A missing texture leaves the floor untextured.
pub async fn load_floor(path: &str) -> Option<Texture2D> {
    match load_texture(path).await {
        Ok(texture) => {
            texture.set_filter(FilterMode::Linear);
            info!(path, "Floor texture loaded");
            Some(texture)
        }
        Err(e) => {
            warn!(path, error = ?e, "Floor texture unavailable; drawing plain tiles");
            None
        }
    }
}

pub async fn run_frame_loop(game: &mut Game, pump: &mut InputPump, floor: Option<&Texture2D>) -> anyhow::Result<()> {
    info!("Frame loop starting");

    loop {
        pump.pump();
        let aspect = screen_width() / screen_height();
        game.handle_input(aspect);
        if game.quit_requested() {
            break;
        }
        game.poll_load();
        game.tick(get_frame_time())?;

        clear_background(LIGHTGRAY);
        set_camera(&game.camera().to_macroquad(aspect));
        draw_tiles(game, floor);
        draw_avatar(game);

        set_default_camera();
        if let Some(bubble) = game.player().chat_bubble() {
            draw_chat_bubble(game, bubble);
        }
        draw_hud(game);

        next_frame().await
    }

    info!("Frame loop finished");
    Ok(())
}

fn draw_tiles(game: &Game, floor: Option<&Texture2D>) {
    let grid = game.grid();
    let size = grid.cell_size();
    let thickness = game.tile_thickness();
    let highlighted = game.highlighted();

    for cell in grid.cells() {
        let center = cell.center();
        let position = vec3(center.x, center.y, center.z);
        let extent = vec3(size, thickness, size);
        let tint = if highlighted == Some(cell.point()) { RED } else { WHITE };
        draw_cube(position, extent, floor, tint);
        draw_cube_wires(position, extent, DARKGRAY);
    }
}

fn draw_avatar(game: &Game) {
    let Some(model) = game.model() else {
        return;
    };
    let player = game.player();
    let transform = player.transform();
    let scale = model.scale;

    let bob = match (player.current_action(), player.animator().and_then(|m| m.dominant())) {
        (Some(Action::Run), Some(clip)) => (clip.phase * TAU).sin().abs() * RUN_BOB * scale,
        _ => 0.0,
    };

    let feet = from_motion(transform.position);
    let body_height = BODY_HEIGHT * scale;
    let body_center = feet + vec3(0.0, body_height / 2.0 + bob, 0.0);
    draw_cube(body_center, vec3(BODY_WIDTH * scale, body_height, BODY_WIDTH * scale), None, BLUE);

    let head = feet + vec3(0.0, body_height + HEAD_RADIUS * scale + bob, 0.0);
    draw_sphere(head, HEAD_RADIUS * scale, None, BEIGE);

    // yaw = atan2(dx, dz)
    let facing = vec3(transform.yaw.sin(), 0.0, transform.yaw.cos());
    let marker_from = feet + vec3(0.0, body_height / 2.0 + bob, 0.0);
    draw_line_3d(marker_from, marker_from + facing * scale, DARKBLUE);
}

fn draw_chat_bubble(game: &Game, bubble: &ChatBubble) {
    let (width, height) = (screen_width(), screen_height());
    let Some(anchor) = game
        .camera()
        .world_to_screen(from_motion(bubble.position), width, height)
    else {
        return;
    };

    let text = measure_text(&bubble.text, None, CHAT_FONT_SIZE, 1.0);
    let box_w = text.width + 2.0 * CHAT_PADDING;
    let box_h = text.height + 2.0 * CHAT_PADDING;
    let left = anchor.x - box_w / 2.0;
    let top = anchor.y - box_h;

    draw_rectangle(left, top, box_w, box_h, WHITE);
    draw_text(
        &bubble.text,
        left + CHAT_PADDING,
        top + CHAT_PADDING + text.offset_y,
        CHAT_FONT_SIZE as f32,
        BLACK,
    );
}

fn draw_hud(game: &Game) {
    let player = game.player();
    let transform = player.transform();

    let status = if game.load_failed() {
        "Model failed to load".to_string()
    } else if let Some(model) = game.model() {
        format!("Model: {} ({} clips)", model.path.display(), model.clips.len())
    } else {
        "Loading model...".to_string()
    };
    draw_text(&status, 10.0, 20.0, HUD_FONT_SIZE, BLACK);

    draw_text(&format!("Player: {}", transform), 10.0, 40.0, HUD_FONT_SIZE, BLACK);

    let action = player.current_action().map_or("-".to_string(), |a| a.to_string());
    let target = player.target().map_or("-".to_string(), |t| t.to_string());
    draw_text(&format!("Action: {action}  Target: {target}"), 10.0, 60.0, HUD_FONT_SIZE, BLACK);

    if let Some(cell) = game.highlighted() {
        draw_text(&format!("Tile: {cell}"), 10.0, 80.0, HUD_FONT_SIZE, BLACK);
    }
}

use macroquad::input::{KeyCode, MouseButton, get_last_key_pressed, is_mouse_button_pressed, mouse_position};
use macroquad::math::Vec2;
use macroquad::window::{screen_height, screen_width};
use tracing::trace;

use crate::bus::Topic;

/// Pointer and keyboard events, positions in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { ndc: Vec2 },
    PointerDown { ndc: Vec2 },
    Key(KeyCode),
}

/// Pixel coordinates to NDC: x in `[-1, 1]` left to right, y in `[-1, 1]`
/// bottom to top.
pub fn to_ndc(px: f32, py: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new((px / width) * 2.0 - 1.0, -(py / height) * 2.0 + 1.0)
}

/// Samples macroquad's input state once per frame and publishes the changes.
pub struct InputPump {
    topic: Topic<InputEvent>,
    last_pointer: Option<(f32, f32)>,
}

impl InputPump {
    pub fn new(topic: Topic<InputEvent>) -> Self {
        InputPump {
            topic,
            last_pointer: None,
        }
    }

    pub fn pump(&mut self) {
        let (px, py) = mouse_position();
        let ndc = to_ndc(px, py, screen_width(), screen_height());

        if self.last_pointer != Some((px, py)) {
            self.last_pointer = Some((px, py));
            self.topic.publish(InputEvent::PointerMove { ndc });
        }
        if is_mouse_button_pressed(MouseButton::Left) {
            trace!(px, py, "Pointer down");
            self.topic.publish(InputEvent::PointerDown { ndc });
        }
        if let Some(key) = get_last_key_pressed() {
            self.topic.publish(InputEvent::Key(key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f32 = 1e-6;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_to_ndc_corners() {
        assert!(close(to_ndc(0.0, 0.0, 800.0, 600.0), Vec2::new(-1.0, 1.0)));
        assert!(close(to_ndc(800.0, 600.0, 800.0, 600.0), Vec2::new(1.0, -1.0)));
        assert!(close(to_ndc(400.0, 300.0, 800.0, 600.0), Vec2::ZERO));
    }

    #[test]
    fn test_to_ndc_quarter() {
        let ndc = to_ndc(200.0, 450.0, 800.0, 600.0);
        assert!(close(ndc, Vec2::new(-0.5, -0.5)));
    }

    #[test]
    fn test_events_reach_subscribers() {
        let topic = Topic::new(4);
        let mut inbox = topic.subscribe();
        topic.publish(InputEvent::PointerDown { ndc: Vec2::ZERO });
        topic.publish(InputEvent::Key(KeyCode::Escape));
        let got: Vec<InputEvent> = inbox.drain().iter().map(|e| **e).collect();
        assert_eq!(got, vec![InputEvent::PointerDown { ndc: Vec2::ZERO }, InputEvent::Key(KeyCode::Escape)]);
    }
}

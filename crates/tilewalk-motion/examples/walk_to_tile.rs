use tilewalk_motion::*;

/// Animator that just prints what the state machine asks for.
struct PrintAnimator;

impl Animator for PrintAnimator {
    type Handle = &'static str;

    fn play(&mut self, handle: &&'static str) {
        println!("    [anim] play {}", handle);
    }

    fn stop(&mut self, handle: &&'static str) {
        println!("    [anim] stop {}", handle);
    }

    fn fade_out(&mut self, handle: &&'static str, seconds: f32) {
        println!("    [anim] fade {} over {:.2}s", handle, seconds);
    }
}

fn main() {
    let velocity = DEFAULT_VELOCITY;
    let target = Vec3::new(0.0, 0.0, 100.0);

    let mut player = match Player::new(Vec3::ZERO, velocity) {
        Ok(player) => player,
        Err(e) => {
            eprintln!("Failed to create player: {}", e);
            return;
        }
    };

    println!("Before load:");
    println!("  set_target accepted: {}", player.set_target(target));
    println!("  advance: {:?}", player.advance());

    let clips = match AnimationTable::from_clips([
        ("CharacterArmature|Idle", "Idle"),
        ("CharacterArmature|Run", "Run"),
        ("CharacterArmature|Wave", "Wave"),
    ]) {
        Ok(clips) => clips,
        Err(e) => {
            eprintln!("Clip table incomplete: {}", e);
            return;
        }
    };

    println!("Loading...");
    if let Err(e) = player.finish_loading(PrintAnimator, clips) {
        eprintln!("Load transition failed: {}", e);
        return;
    }
    player.attach_chat_bubble(ChatBubble::new("Hello! world", 60.0));

    println!("Walking from {} to {} at {} units/tick", player.position(), target, velocity);
    player.set_target(target);

    for tick in 1..=25 {
        match player.advance() {
            Ok(Step::Holding) => break,
            Ok(step) => println!(
                "Tick {:>2}: {} {:?} ({:?})",
                tick,
                player.transform(),
                player.current_action(),
                step
            ),
            Err(e) => {
                eprintln!("Error during tick {}: {}", tick, e);
                break;
            }
        }
    }

    if let Some(bubble) = player.chat_bubble() {
        println!("Bubble '{}' at {}", bubble.text, bubble.position);
    }
}

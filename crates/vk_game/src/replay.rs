use serde::Deserialize;
use std::fs;
use std::path::Path;

use vk_core::input::{InputState, Key};

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub move_x: i32,
    #[serde(default)]
    pub jump_pressed: bool,
    #[serde(default)]
    pub attack_pressed: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayFrame {
    /// Keyboard state for one step of this frame.
    pub fn to_input(&self) -> InputState {
        let mut input = InputState::new();
        match self.move_x.signum() {
            -1 => input.key_down(Key::Left),
            1 => input.key_down(Key::Right),
            _ => {}
        }
        if self.jump_pressed {
            input.tap(Key::Up);
        }
        if self.attack_pressed {
            input.tap(Key::Space);
        }
        input
    }
}

impl ReplaySequence {
    pub fn expanded_inputs(&self) -> Vec<InputState> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(frame.to_input());
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    if let Some(i) = replay.frames.iter().position(|f| !(-1..=1).contains(&f.move_x)) {
        return Err(format!(
            "Replay validation failed: frame {i} move_x must be -1, 0 or 1"
        ));
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioPlayer;
    use crate::enemy::EnemyManager;
    use crate::level::fixtures::*;
    use crate::level::RoomId;
    use crate::object::ObjectKind;
    use crate::scene::Scene;
    use crate::tilemap::tile;
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "vk_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn sample_scene() -> Scene {
        let first = with_mid_column(floor_room(1, 0), 17, tile::EXIT_RIGHT);
        let objects = vec![
            hazard(ObjectKind::Candle, RoomId::new(1, 0), 5, 9, ObjectKind::HeartSmall, 32),
            placement(ObjectKind::HeartBig, RoomId::new(2, 0), 9, 10),
        ];
        let catalog = catalog(vec![first, floor_room(2, 0)], objects);
        Scene::init(Arc::new(catalog), AudioPlayer::new(), EnemyManager::new())
            .expect("fixture scene should init")
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "move_x": 1, "repeat": 3 },
                { "jump_pressed": true },
                { "attack_pressed": true, "move_x": -1 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 5);
        assert_eq!(expanded[0].horizontal_axis(), 1);
        assert!(expanded[3].is_just_pressed(Key::Up));
        assert!(expanded[4].is_just_pressed(Key::Space));
        assert_eq!(expanded[4].horizontal_axis(), -1);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_bad_sequences() {
        let path = temp_file_path("invalid");
        fs::write(&path, r#"{ "frames": [ { "move_x": 3 } ] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("move_x 3 is out of range");
        assert!(err.contains("frame 0 move_x"));

        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay");
        assert!(err.contains("frames list is empty"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "move_x": 1, "repeat": 40 },
                { "attack_pressed": true },
                { "repeat": 60 },
                { "move_x": 1, "jump_pressed": true },
                { "move_x": 1, "repeat": 240 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let inputs = replay.expanded_inputs();

        let mut run_a = sample_scene();
        let mut run_b = sample_scene();
        for input in &inputs {
            run_a.update(input);
        }
        for input in &inputs {
            run_b.update(input);
        }

        assert_eq!(run_a.room(), run_b.room());
        assert_eq!(run_a.player().pos(), run_b.player().pos());
        assert_eq!(run_a.player().hearts(), run_b.player().hearts());
        assert_eq!(run_a.objects(), run_b.objects());
        assert_eq!(run_a.audio().sound_count("Attack"), run_b.audio().sound_count("Attack"));

        let _ = fs::remove_file(path);
    }
}

//! Named music tracks and sound effects.
//!
//! This keeps the playback state the game logic depends on: which tracks are
//! registered, which music is playing, and which cues fired this step. Decoding
//! and output are left to whatever drains the cue queue. Unknown names are
//! logged and ignored.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCue {
    MusicStarted(String),
    MusicStopped(String),
    Sound(String),
}

#[derive(Debug, Clone)]
struct MusicTrack {
    path: PathBuf,
    looping: bool,
    playing: bool,
    /// Steps since the track was started.
    position: u64,
}

#[derive(Debug, Default)]
pub struct AudioPlayer {
    music: HashMap<String, MusicTrack>,
    sounds: HashMap<String, PathBuf>,
    sound_counts: HashMap<String, u32>,
    cues: Vec<AudioCue>,
    warned: HashSet<String>,
}

impl AudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_music(&mut self, path: impl Into<PathBuf>, name: &str) {
        let path = path.into();
        log::debug!("Music '{name}' registered from {}", path.display());
        self.music.insert(
            name.to_string(),
            MusicTrack {
                path,
                looping: false,
                playing: false,
                position: 0,
            },
        );
    }

    pub fn create_sound(&mut self, path: impl Into<PathBuf>, name: &str) {
        let path = path.into();
        log::debug!("Sound '{name}' registered from {}", path.display());
        self.sounds.insert(name.to_string(), path);
    }

    pub fn set_music_loop_status(&mut self, name: &str, looping: bool) {
        match self.music.get_mut(name) {
            Some(track) => track.looping = looping,
            None => self.warn_unknown("music", name),
        }
    }

    /// Start a track. Already playing tracks keep their position.
    pub fn play_music_by_name(&mut self, name: &str) {
        let Some(track) = self.music.get_mut(name) else {
            self.warn_unknown("music", name);
            return;
        };
        if track.playing {
            return;
        }
        track.playing = true;
        track.position = 0;
        log::debug!("Music '{name}' started ({})", track.path.display());
        self.cues.push(AudioCue::MusicStarted(name.to_string()));
    }

    pub fn stop_music_by_name(&mut self, name: &str) {
        let Some(track) = self.music.get_mut(name) else {
            self.warn_unknown("music", name);
            return;
        };
        if !track.playing {
            return;
        }
        track.playing = false;
        log::debug!("Music '{name}' stopped");
        self.cues.push(AudioCue::MusicStopped(name.to_string()));
    }

    pub fn stop_all_music(&mut self) {
        let mut playing: Vec<String> = self
            .music
            .iter()
            .filter(|(_, track)| track.playing)
            .map(|(name, _)| name.clone())
            .collect();
        playing.sort();
        for name in playing {
            self.stop_music_by_name(&name);
        }
    }

    pub fn is_music_playing(&self, name: &str) -> bool {
        self.music.get(name).is_some_and(|track| track.playing)
    }

    #[cfg(test)]
    pub fn is_music_looping(&self, name: &str) -> bool {
        self.music.get(name).is_some_and(|track| track.looping)
    }

    /// Names of every playing track, sorted.
    pub fn playing_music(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .music
            .iter()
            .filter(|(_, track)| track.playing)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn play_sound_by_name(&mut self, name: &str) {
        if !self.sounds.contains_key(name) {
            self.warn_unknown("sound", name);
            return;
        }
        log::trace!("Sound '{name}'");
        *self.sound_counts.entry(name.to_string()).or_insert(0) += 1;
        self.cues.push(AudioCue::Sound(name.to_string()));
    }

    /// How many times a sound has fired since creation.
    #[cfg(test)]
    pub fn sound_count(&self, name: &str) -> u32 {
        self.sound_counts.get(name).copied().unwrap_or(0)
    }

    /// One line for the debug overlay: playing tracks with their step
    /// position, and the number of sound effects fired so far.
    pub fn status_label(&self) -> String {
        let tracks: Vec<String> = self
            .playing_music()
            .into_iter()
            .map(|name| {
                let steps = self.music.get(name).map_or(0, |t| t.position);
                format!("{name} @{steps}")
            })
            .collect();
        let music = if tracks.is_empty() { "none".to_string() } else { tracks.join(", ") };
        let fired: u32 = self.sound_counts.values().sum();
        format!("music {music}  sfx {fired}")
    }

    /// Advance streaming state by one step.
    pub fn update(&mut self) {
        for track in self.music.values_mut().filter(|t| t.playing) {
            track.position += 1;
        }
    }

    /// Cues since the last drain, oldest first.
    pub fn drain_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.cues)
    }

    fn warn_unknown(&mut self, what: &str, name: &str) {
        // Per-step callers would otherwise flood the log.
        if self.warned.insert(format!("{what}:{name}")) {
            log::warn!("Unknown {what} '{name}'");
        }
    }
}

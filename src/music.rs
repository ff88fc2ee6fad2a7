use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use log::debug;
use rodio::source::Source;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

pub const DEFAULT_VOLUME: f32 = 0.8;

/// Optional background track for the relive screen. The output stream is
/// opened lazily on the first load so the app runs fine on machines with no
/// audio device until music is actually requested.
pub struct MusicPlayer {
    // The stream must outlive the sink or playback goes silent.
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    track: Option<PathBuf>,
    volume: f32,
    loop_on: bool,
}

impl MusicPlayer {
    pub fn new() -> Self {
        MusicPlayer {
            output: None,
            sink: None,
            track: None,
            volume: DEFAULT_VOLUME,
            loop_on: true,
        }
    }

    /// Loads a track, stopping and releasing the previous one first. The new
    /// track starts paused; play is a separate action.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        if self.output.is_none() {
            self.output = Some(OutputStream::try_default()?);
        }
        let (_, handle) = self
            .output
            .as_ref()
            .ok_or_else(|| eyre!("audio output unavailable"))?;

        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))?;
        let sink = Sink::try_new(handle)?;
        sink.set_volume(self.volume);
        if self.loop_on {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        sink.pause();
        debug!("loaded music track {}", path.display());

        self.sink = Some(sink);
        self.track = Some(path.to_owned());
        Ok(())
    }

    pub fn has_track(&self) -> bool {
        self.sink.is_some()
    }

    pub fn track_name(&self) -> Option<String> {
        self.track
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn play(&self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    pub fn pause(&self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| !s.is_paused())
    }

    /// Play/pause from the dedicated music control. Errors when no track has
    /// been chosen yet.
    pub fn toggle(&mut self) -> Result<()> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| eyre!("Choose an audio file first"))?;
        if sink.is_paused() {
            sink.play();
        } else {
            sink.pause();
        }
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    pub fn loop_on(&self) -> bool {
        self.loop_on
    }

    /// Flips track looping. The sink's source is fixed once appended, so a
    /// loaded track is reloaded to pick up the change; playback state is
    /// preserved.
    pub fn toggle_loop(&mut self) -> Result<()> {
        self.loop_on = !self.loop_on;
        if let Some(path) = self.track.clone() {
            let was_playing = self.is_playing();
            self.load(&path)?;
            if was_playing {
                self.play();
            }
        }
        Ok(())
    }
}

impl Drop for MusicPlayer {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

/// Where selection text goes: an info card, a terminal, a test recorder.
pub trait DisplaySink {
    fn show(&mut self, title: &str, text: &str);
    fn hide(&mut self);
}

/// Fire-and-forget sound requests.
pub trait AudioCue {
    /// Called once when the session starts.
    fn start_ambient(&mut self);
    /// Called once per successful selection.
    fn play_selection_cue(&mut self);
}

/// Display sink that writes to the log and remembers what is showing.
#[derive(Debug, Default)]
pub struct LogDisplay {
    pub current: Option<String>,
    pub shown: usize,
}

impl DisplaySink for LogDisplay {
    fn show(&mut self, title: &str, text: &str) {
        tracing::info!(title, chars = text.chars().count(), "info card shown");
        self.current = Some(title.to_owned());
        self.shown += 1;
    }

    fn hide(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("info card hidden");
        }
    }
}

/// Audio cue that only logs requests.
#[derive(Debug, Default)]
pub struct LogAudio {
    pub ambient_started: bool,
    pub cues: usize,
}

impl AudioCue for LogAudio {
    fn start_ambient(&mut self) {
        tracing::info!("ambient audio started");
        self.ambient_started = true;
    }

    fn play_selection_cue(&mut self) {
        tracing::debug!("selection cue");
        self.cues += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_display_tracks_current_card() {
        let mut display = LogDisplay::default();
        display.show("Olm", "Pale.");
        assert_eq!(display.current.as_deref(), Some("Olm"));
        display.hide();
        assert!(display.current.is_none());
        assert_eq!(display.shown, 1);
    }

    #[test]
    fn log_audio_counts_cues() {
        let mut audio = LogAudio::default();
        audio.start_ambient();
        audio.play_selection_cue();
        audio.play_selection_cue();
        assert!(audio.ambient_started);
        assert_eq!(audio.cues, 2);
    }
}

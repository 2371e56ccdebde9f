use crate::pulse::PulseQueue;
use crate::sinks::{AudioCue, DisplaySink};
use cavern_common::{InteractionConfig, Metadata, NodeId};
use cavern_kernel::Population;
use std::sync::Arc;

/// Outcome of a click.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// An object was resolved and its card shown.
    Shown { owner: NodeId, metadata: Arc<Metadata> },
    /// Nothing under the pointer; the card was hidden.
    Hidden,
}

/// Everything selection feedback writes to.
pub struct Feedback<'a, D, A> {
    pub display: &'a mut D,
    pub audio: &'a mut A,
    pub pulses: &'a mut PulseQueue,
}

/// Resolve a click against this frame's hit.
///
/// `hit` is the node struck by the pointer ray, before ownership resolution.
pub fn select<D: DisplaySink, A: AudioCue>(
    population: &mut Population,
    hit: Option<NodeId>,
    feedback: Feedback<'_, D, A>,
    now: f32,
    config: &InteractionConfig,
) -> Selection {
    let Some(hit) = hit else {
        feedback.display.hide();
        return Selection::Hidden;
    };
    let owner = population.metadata_owner(hit);
    let metadata = population.resolve_metadata(hit);
    tracing::info!(%owner, name = %metadata.display_name, "selected");

    feedback.display.show(&metadata.display_name, &metadata.description);
    feedback.audio.play_selection_cue();
    feedback
        .pulses
        .start(population, owner, config.pulse_factor, now, config.pulse_delay_secs);
    Selection::Shown { owner, metadata }
}

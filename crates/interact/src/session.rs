use crate::aim::Torch;
use crate::highlight;
use crate::pulse::PulseQueue;
use crate::selection::{self, Feedback, Selection};
use crate::sinks::{AudioCue, DisplaySink};
use cavern_common::{BehaviorConfig, CaveConfig, InteractionConfig, NodeId};
use cavern_input::{InputEvent, InputMailbox};
use cavern_kernel::Population;
use cavern_render::{CaveCamera, CpuPicker, Hit, RenderView, ScenePicker};

/// What happened during one call to [`Session::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    /// Nearest raw hit this frame.
    pub hit: Option<Hit>,
    /// Metadata owner of the hit; the one hovered object.
    pub hovered: Option<NodeId>,
    /// Present when a click was consumed this frame.
    pub selection: Option<Selection>,
    pub pulses_reverted: usize,
}

/// The running scene: population, camera, torch and the frame loop that
/// ties input, behavior, hover and selection together.
pub struct Session<D, A> {
    population: Population,
    camera: CaveCamera,
    torch: Torch,
    mailbox: InputMailbox,
    picker: Box<dyn ScenePicker>,
    behavior: BehaviorConfig,
    interaction: InteractionConfig,
    pulses: PulseQueue,
    display: D,
    audio: A,
    hovered: Option<NodeId>,
    frame: u64,
    started: bool,
}

impl<D: DisplaySink, A: AudioCue> Session<D, A> {
    pub fn new(population: Population, config: &CaveConfig, display: D, audio: A) -> Self {
        Self {
            population,
            camera: CaveCamera::default(),
            torch: Torch::default(),
            mailbox: InputMailbox::new(),
            picker: Box::new(CpuPicker),
            behavior: config.behavior.clone(),
            interaction: config.interaction.clone(),
            pulses: PulseQueue::new(),
            display,
            audio,
            hovered: None,
            frame: 0,
            started: false,
        }
    }

    /// Replace the ray picker.
    pub fn with_picker(mut self, picker: impl ScenePicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    /// Begin the experience. Starts ambient audio once; later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.audio.start_ambient();
        tracing::info!(objects = self.population.roots().len(), "session started");
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Queue a host event. Handled on the next tick.
    pub fn input(&mut self, event: InputEvent) {
        self.mailbox.push(event);
    }

    /// Close the info card from the UI.
    pub fn dismiss_info(&mut self) {
        self.display.hide();
    }

    /// Advance one frame to absolute time `elapsed` (seconds since start).
    pub fn tick(&mut self, elapsed: f32) -> FrameReport {
        let input = self.mailbox.drain();
        if let Some((width, height)) = input.resized {
            self.camera.set_viewport(width, height);
            tracing::debug!(width, height, aspect = self.camera.aspect, "viewport resized");
        }
        self.camera.sway(elapsed);

        let ray = self.camera.ray_through(input.pointer);
        self.torch.follow(&self.camera, &ray, &self.interaction);

        cavern_kernel::advance(&mut self.population, elapsed, &self.behavior);

        let hit = self.picker.nearest(&self.population, &ray);
        let hovered = hit.map(|h| self.population.metadata_owner(h.node));
        if hovered != self.hovered {
            match hovered {
                Some(owner) => tracing::debug!(%owner, "hover acquired"),
                None => tracing::debug!("hover released"),
            }
            self.hovered = hovered;
        }
        highlight::update(&mut self.population, hovered, &self.interaction);

        let selection = input.select_requested.then(|| {
            selection::select(
                &mut self.population,
                hit.map(|h| h.node),
                Feedback {
                    display: &mut self.display,
                    audio: &mut self.audio,
                    pulses: &mut self.pulses,
                },
                elapsed,
                &self.interaction,
            )
        });

        let pulses_reverted = self.pulses.expire(&mut self.population, elapsed);

        self.frame += 1;
        tracing::trace!(frame = self.frame, ?hovered, "frame");
        FrameReport {
            frame: self.frame,
            hit,
            hovered,
            selection,
            pulses_reverted,
        }
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn camera(&self) -> &CaveCamera {
        &self.camera
    }

    pub fn torch(&self) -> &Torch {
        &self.torch
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn pending_pulses(&self) -> usize {
        self.pulses.pending()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Camera and torch state for a renderer.
    pub fn view(&self) -> RenderView {
        RenderView {
            camera: self.camera,
            torch_position: self.torch.position,
            torch_target: self.torch.marker(),
        }
    }
}

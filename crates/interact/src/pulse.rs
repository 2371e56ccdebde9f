use cavern_common::NodeId;
use cavern_kernel::Population;
use glam::Vec3;

/// A pending scale revert.
#[derive(Debug, Clone, PartialEq)]
struct Pulse {
    deadline: f32,
    originals: Vec<(NodeId, Vec3)>,
}

/// One-shot scale pulses with a deadline checked by the frame loop.
///
/// Pulses are never cancelled. Overlapping pulses on the same object each
/// restore the scale they captured, so the later revert wins.
#[derive(Debug, Clone, Default)]
pub struct PulseQueue {
    pending: Vec<Pulse>,
}

impl PulseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale every mesh under `owner` by `factor` now and schedule the revert
    /// for `now + delay`. Returns the number of meshes pulsed.
    pub fn start(
        &mut self,
        population: &mut Population,
        owner: NodeId,
        factor: f32,
        now: f32,
        delay: f32,
    ) -> usize {
        let mut originals = Vec::new();
        for id in population.subtree(owner) {
            let Some(node) = population.get_mut(id) else {
                continue;
            };
            if node.visual.is_none() {
                continue;
            }
            originals.push((id, node.transform.scale));
            node.transform.scale *= factor;
        }
        let count = originals.len();
        tracing::debug!(%owner, meshes = count, "pulse started");
        self.pending.push(Pulse {
            deadline: now + delay,
            originals,
        });
        count
    }

    /// Revert every pulse whose deadline has passed. Returns how many fired.
    pub fn expire(&mut self, population: &mut Population, now: f32) -> usize {
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.deadline <= now);
        self.pending = waiting;
        for pulse in &due {
            for (id, scale) in &pulse.originals {
                if let Some(node) = population.get_mut(*id) {
                    node.transform.scale = *scale;
                }
            }
        }
        due.len()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

use crate::{
    dsp::{oscillator::ModulatableOscillator, waveform::Waveshape},
    MAX_UNISON,
};

/// Hz of detune per percent per member: member `i` sits
/// `i * detune% * 0.1` Hz above the note.
pub const DETUNE_HZ_PER_PERCENT: f32 = 0.1;

/// One oscillator chain: the primary plus up to `MAX_UNISON` detuned copies.
///
/// ```text
///   primary     f
///   member 1    f + 0.1 * d
///   member 2    f + 0.2 * d
///   ...
///   member N    f + 0.1 * d * N
/// ```
///
/// The spread is deterministic and grows linearly with the member index.
/// Members are preallocated; `unison` only decides how many are rendered.
#[derive(Debug, Clone)]
pub struct UnisonStack {
    primary: ModulatableOscillator,
    members: [ModulatableOscillator; MAX_UNISON],
    unison: usize,
}

impl UnisonStack {
    pub fn new() -> Self {
        Self {
            primary: ModulatableOscillator::new(Waveshape::Sine),
            members: std::array::from_fn(|_| ModulatableOscillator::new(Waveshape::Sine)),
            unison: 0,
        }
    }

    /// Seed every oscillator in the chain for a new note. `unison` is
    /// clamped to `MAX_UNISON`.
    pub fn start_note(
        &mut self,
        sample_rate: f32,
        shape: Waveshape,
        frequency: f32,
        unison: usize,
        detune: f32,
    ) {
        self.unison = unison.min(MAX_UNISON);
        self.primary.start_note(sample_rate, shape, frequency);

        for (i, member) in self.active_members_mut().iter_mut().enumerate() {
            let detuned = frequency + DETUNE_HZ_PER_PERCENT * detune * (i + 1) as f32;
            member.start_note(sample_rate, shape, detuned);
        }
    }

    /// Sum of one sample from every unison member (0.0 without unison).
    #[inline]
    pub fn process_unison(&mut self) -> f32 {
        self.active_members_mut().iter_mut().map(|m| m.process()).sum()
    }

    /// The oscillator that receives LFO offsets.
    pub fn primary_mut(&mut self) -> &mut ModulatableOscillator {
        &mut self.primary
    }

    pub fn primary(&self) -> &ModulatableOscillator {
        &self.primary
    }

    #[inline]
    pub fn process_primary(&mut self) -> f32 {
        self.primary.process()
    }

    /// Average of the primary and the unison sum over the stack size.
    #[inline]
    pub fn normalize(&self, primary: f32, unison_sum: f32) -> f32 {
        if self.unison == 0 {
            return primary;
        }
        (primary + unison_sum) / self.len() as f32
    }

    /// Number of unison members in use.
    pub fn unison(&self) -> usize {
        self.unison
    }

    /// Oscillators sounding in this chain, primary included.
    pub fn len(&self) -> usize {
        self.unison + 1
    }

    /// Base frequency of member `index` (1-based; 0 is the primary).
    pub fn member_frequency(&self, index: usize) -> Option<f32> {
        match index {
            0 => Some(self.primary.base_frequency()),
            i if i <= self.unison => Some(self.members[i - 1].base_frequency()),
            _ => None,
        }
    }

    fn active_members_mut(&mut self) -> &mut [ModulatableOscillator] {
        &mut self.members[..self.unison]
    }
}

impl Default for UnisonStack {
    fn default() -> Self {
        Self::new()
    }
}

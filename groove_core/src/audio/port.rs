use level_schema::Millis;

/// What the engine needs from the audio engine.
///
/// `now_ms` is read only to align playback to a beat boundary; judgment
/// timing comes from the engine's own [`Clock`](crate::time::Clock).
pub trait AudioPort {
    fn now_ms(&self) -> Millis;

    fn set_tempo(&self, bpm: u32);

    /// Hands program text to the audio engine. An error here is reported to
    /// the caller but never affects the run.
    fn evaluate(&self, source: &str) -> anyhow::Result<()>;

    fn stop(&self);
}

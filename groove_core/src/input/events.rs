use level_schema::Millis;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    /// Engine clock reading when the player acted.
    pub timestamp_ms: Millis,
}

pub mod handle;
pub mod port;

pub use handle::{AudioCommand, AudioHandle};
pub use port::AudioPort;

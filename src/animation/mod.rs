//! Time-based animation: easing curves, playback state, the update queue and
//! the thread that drives it all.

pub(crate) mod driver;
mod queue;
mod state;
mod timing;

pub use driver::tick;
pub use queue::AnimationQueue;
pub use state::{Animation, Listener, PlayState};
pub use timing::{Easing, DEFAULT_PRECISION};

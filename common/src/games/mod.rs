mod session_rng;

pub mod bubbles;

pub use session_rng::SessionRng;

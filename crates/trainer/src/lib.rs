pub mod scoring;
pub mod session;

pub use scoring::score;
pub use session::TapSession;

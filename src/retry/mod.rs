mod attempt;
mod outcome;

pub use attempt::Attempt;
pub use outcome::RequestOutcome;

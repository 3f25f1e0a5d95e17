//! Domain entities - core business objects

mod message;
mod token;
mod user;

pub use message::Message;
pub use token::ResumptionToken;
pub use user::{User, UserRef};

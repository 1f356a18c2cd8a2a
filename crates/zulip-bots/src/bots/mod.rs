//! Built-in bots.

mod echo;

pub use echo::EchoBot;

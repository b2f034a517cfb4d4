/// Chess domain types and the rules engine.
pub mod chess;
/// The live-game session protocol.
pub mod server;

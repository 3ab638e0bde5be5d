pub mod client;
pub mod types;

pub use client::{PinterestClient, PinterestError};
pub use types::{Board, BoardWithPins, BoardsResponse, Pin, PinsResponse};

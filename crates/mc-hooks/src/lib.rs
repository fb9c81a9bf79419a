//! Client hooks
//!
//! Named extension points that other components can observe.
//!
//! # Outbound packets
//!
//! Every packet the client sends passes through a [`PacketPipeline`] right
//! before it reaches the connection:
//!
//! ```text
//! send(packet) ─▶ PacketOutputEvent ─▶ observer 1 ─▶ observer 2 ─▶ ...
//!                                                        │
//!                               cancelled? ── yes ─▶ dropped
//!                                   │ no
//!                                   ▼
//!                         connection.send(event.packet)
//! ```
//!
//! Observers run on a snapshot of the list, so an observer may add or remove
//! observers on its own pipeline; the change applies from the next packet.
//!
//! # Example
//!
//! ```ignore
//! let pipeline = PacketPipeline::new();
//! pipeline.add_observer(|event| {
//!     if matches!(event.packet(), Serverbound::Swing(_)) {
//!         event.cancel();
//!     }
//! });
//!
//! if let Some(packet) = pipeline.intercept(packet) {
//!     connection.send(packet).await?;
//! }
//! ```

mod hook;
mod packet;

pub use hook::{Hook, ObserverId};
pub use packet::{PacketOutputEvent, PacketPipeline};

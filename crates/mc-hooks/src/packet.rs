//! Outbound packet interception.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::hook::{Hook, ObserverId};

/// A packet about to be handed to the transport.
///
/// Observers may swap the packet out or cancel it entirely.
#[derive(Debug)]
pub struct PacketOutputEvent<P> {
    packet: P,
    cancelled: bool,
}

impl<P> PacketOutputEvent<P> {
    #[must_use]
    pub const fn new(packet: P) -> Self {
        Self {
            packet,
            cancelled: false,
        }
    }

    #[must_use]
    pub const fn packet(&self) -> &P {
        &self.packet
    }

    /// Replace the packet that will be sent.
    pub fn set_packet(&mut self, packet: P) {
        self.packet = packet;
    }

    /// Drop the packet instead of sending it.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    #[must_use]
    pub fn into_packet(self) -> P {
        self.packet
    }
}

/// Interception point in front of the outbound transport.
///
/// Cloning yields another handle to the same observer list. Observers may
/// register or remove observers on the pipeline they run in; the change
/// takes effect from the next packet.
pub struct PacketPipeline<P> {
    hook: Arc<RwLock<Hook<PacketOutputEvent<P>>>>,
}

impl<P> Clone for PacketPipeline<P> {
    fn clone(&self) -> Self {
        Self {
            hook: Arc::clone(&self.hook),
        }
    }
}

impl<P> Default for PacketPipeline<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PacketPipeline<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hook: Arc::new(RwLock::new(Hook::new("packet_output"))),
        }
    }

    /// Register an observer for every outgoing packet.
    pub fn add_observer<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&mut PacketOutputEvent<P>) + Send + Sync + 'static,
    {
        self.hook.write().add(callback)
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.hook.write().remove(id)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.hook.read().len()
    }

    /// Run the observers on `packet`.
    ///
    /// Returns the packet to send, which may have been replaced, or `None`
    /// if an observer cancelled it.
    pub fn intercept(&self, packet: P) -> Option<P> {
        let observers = self.hook.read().snapshot();
        let mut event = PacketOutputEvent::new(packet);
        for observer in &observers {
            observer(&mut event);
        }

        if event.is_cancelled() {
            trace!("outbound packet cancelled");
            None
        } else {
            Some(event.into_packet())
        }
    }

    /// Intercept `packet` and hand whatever survives to `transport`.
    pub fn send<F, R>(&self, packet: P, transport: F) -> Option<R>
    where
        F: FnOnce(P) -> R,
    {
        self.intercept(packet).map(transport)
    }
}

impl<P> core::fmt::Debug for PacketPipeline<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PacketPipeline")
            .field("observers", &self.observer_count())
            .finish()
    }
}

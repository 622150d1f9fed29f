use serde::{Deserialize, Serialize};

/// The four signals that make the overlay stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    /// Playback position moved (`timeupdate`, seeks).
    TimeAdvanced,
    /// Intrinsic size and duration became known (`loadedmetadata`).
    MetadataReady,
    /// The container's rendered size changed.
    ContainerResized,
    /// The user showed or hid the overlay.
    OverlayToggled,
}

impl Trigger {
    pub const ALL: [Trigger; 4] = [
        Trigger::TimeAdvanced,
        Trigger::MetadataReady,
        Trigger::ContainerResized,
        Trigger::OverlayToggled,
    ];

    /// Map a host event name (DOM names accepted) to a trigger.
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "time-advanced" | "timeupdate" | "seeked" => Some(Self::TimeAdvanced),
            "metadata-ready" | "loadedmetadata" => Some(Self::MetadataReady),
            "container-resized" | "resize" => Some(Self::ContainerResized),
            "overlay-toggled" | "toggle" => Some(Self::OverlayToggled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Trigger)>;

/// Callback registry standing in for the host's event target.
///
/// Single-threaded: listeners run synchronously inside [`SignalHub::emit`].
#[derive(Default)]
pub struct SignalHub {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Trigger, Listener)>,
}

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        trigger: Trigger,
        listener: impl FnMut(Trigger) + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, trigger, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Deliver `trigger` to its listeners; returns how many were notified.
    pub fn emit(&mut self, trigger: Trigger) -> usize {
        let mut notified = 0;
        for (_, wanted, listener) in &mut self.listeners {
            if *wanted == trigger {
                listener(trigger);
                notified += 1;
            }
        }
        notified
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for SignalHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalHub")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::signal::Signal;

/// Subscription key that receives every signal regardless of kind.
pub const WILDCARD: &str = "*";

/// Token identifying one registration, returned by
/// [`SignalBus::subscribe`]. Closures have no identity to remove by, so
/// removal goes through the token instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&Signal) + Send + Sync>;

struct Registration {
    id: SubscriptionId,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    subscribers: HashMap<String, Vec<Registration>>,
    next_id: u64,
}

/// In-process publish/subscribe exchange.
///
/// The mutex guards only the subscriber registry and is released before any
/// handler runs, so a handler may subscribe, unsubscribe, or publish from
/// inside its own invocation without deadlocking. The flip side: a handler
/// can miss or double-observe a registry change made concurrently with its
/// own publish. Handlers are idempotent dispatchers, not transactional
/// consumers, so that is acceptable.
///
/// There is no per-handler error boundary: a panicking handler unwinds
/// through `publish` and aborts delivery to the remaining handlers of that
/// call.
#[derive(Default)]
pub struct SignalBus {
    registry: Mutex<Registry>,
}

impl SignalBus {
    pub fn new() -> Self {
        SignalBus::default()
    }

    /// Registers a handler under an exact signal kind, or under
    /// [`WILDCARD`] to receive everything.
    pub fn subscribe(
        &self,
        kind: &str,
        handler: impl Fn(&Signal) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut registry = self.registry.lock().expect("signal bus registry poisoned");
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry
            .subscribers
            .entry(kind.to_string())
            .or_default()
            .push(Registration {
                id,
                handler: Arc::new(handler),
            });
        id
    }

    /// Removes the registration matching `id` under `kind`. Unknown tokens
    /// are ignored.
    pub fn unsubscribe(&self, kind: &str, id: SubscriptionId) {
        let mut registry = self.registry.lock().expect("signal bus registry poisoned");
        if let Some(registrations) = registry.subscribers.get_mut(kind) {
            registrations.retain(|registration| registration.id != id);
        }
    }

    /// Delivers `signal` to every exact-kind handler, then every wildcard
    /// handler, each in registration order. The handler list is snapshotted
    /// under the lock and invoked outside it.
    pub fn publish(&self, signal: &Signal) {
        let handlers: Vec<Handler> = {
            let registry = self.registry.lock().expect("signal bus registry poisoned");
            let exact = registry
                .subscribers
                .get(&signal.kind)
                .into_iter()
                .flatten();
            let wildcard = registry.subscribers.get(WILDCARD).into_iter().flatten();
            exact
                .chain(wildcard)
                .map(|registration| Arc::clone(&registration.handler))
                .collect()
        };
        for handler in handlers {
            handler(signal);
        }
    }
}

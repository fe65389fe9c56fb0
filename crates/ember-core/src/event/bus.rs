// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// A thread-safe, unbounded event channel owned by one consumer.
///
/// Producers clone the [`sender`](Self::sender); the owner drains pending
/// events with [`drain`](Self::drain) at a well-defined point of the frame.
#[derive(Debug)]
pub struct EventBus<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventBus<T> {
    /// Creates a new bus.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("EventBus<{}> initialized.", std::any::type_name::<T>());
        Self { sender, receiver }
    }

    /// Sends an event. Never blocks.
    pub fn publish(&self, event: T) {
        if let Err(e) = self.sender.send(event) {
            // Unreachable while `self` holds the receiver, kept for clarity.
            log::error!("Failed to send event: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sending end, for producers on other threads.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns the receiving end.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }

    /// Removes and returns every event published so far, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Loaded { name: String },
        Destroyed(u64),
        Unloaded,
    }

    #[test]
    fn drain_returns_events_in_publish_order() {
        let bus = EventBus::<TestEvent>::new();
        bus.publish(TestEvent::Loaded {
            name: "level".to_string(),
        });
        bus.publish(TestEvent::Destroyed(3));
        bus.publish(TestEvent::Unloaded);
        assert_eq!(bus.len(), 3);

        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                TestEvent::Loaded {
                    name: "level".to_string()
                },
                TestEvent::Destroyed(3),
                TestEvent::Unloaded,
            ]
        );
        assert!(bus.is_empty(), "drain must empty the bus");
    }

    #[test]
    fn events_sent_from_another_thread_arrive() {
        let bus = EventBus::<TestEvent>::new();
        let sender = bus.sender();

        let handle = thread::spawn(move || {
            sender
                .send(TestEvent::Destroyed(9))
                .expect("Send from thread failed");
        });

        let received = bus
            .receiver()
            .recv_timeout(Duration::from_secs(1))
            .expect("event should arrive");
        assert_eq!(received, TestEvent::Destroyed(9));
        handle.join().expect("Thread join failed");
    }

    #[test]
    fn sender_fails_once_bus_is_dropped() {
        let bus = EventBus::<TestEvent>::new();
        let sender = bus.sender();
        drop(bus);
        assert!(sender.send(TestEvent::Unloaded).is_err());
    }
}

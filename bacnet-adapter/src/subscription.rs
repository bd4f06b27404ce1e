//! Per-session change-of-value subscriptions
//!
//! A session holds exactly one subscription set and one listener. Calling
//! `replace` cancels the whole previous set before subscribing the new one,
//! so repeated `start_listening` calls never accumulate subscriptions on
//! the device. Notification routing and replacement take the same lock:
//! a notification is matched either against the old set or the new one,
//! never against a half-built mix.

use std::collections::HashMap;
use std::time::Instant;

use bacnet_api::{
    ApiError, BacnetValue, EngineEvent, ObjectIdentifier, PropertyIdentifier, PropertyTypeDefinition,
};
use chrono::Utc;
use parking_lot::Mutex;

use crate::channel::{ChannelRecordContainer, Flag, Record};
use crate::conversion;
use crate::iter::RecordListener;

/// Subscribe/cancel operations a session performs against its target.
pub trait CovBackend {
    fn subscribe(&self, object: ObjectIdentifier) -> bacnet_api::Result<()>;
    fn unsubscribe(&self, object: ObjectIdentifier) -> bacnet_api::Result<()>;
}

/// Which events a manager accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationScope {
    /// Change-of-value notifications initiated by this remote device
    Remote { device: u32 },
    /// Present-value changes of locally hosted objects
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Pending,
    Active,
}

/// A channel the session wants notifications for.
#[derive(Debug, Clone)]
pub struct SubscriptionRequest {
    /// Position of the container in the caller's slice
    pub index: usize,
    pub object: ObjectIdentifier,
    pub container: ChannelRecordContainer,
    pub definition: Option<PropertyTypeDefinition>,
}

#[derive(Debug, Clone)]
pub struct ActiveSubscription {
    pub object: ObjectIdentifier,
    pub container: ChannelRecordContainer,
    pub definition: Option<PropertyTypeDefinition>,
    pub state: SubscriptionState,
    pub created_at: Instant,
    pub last_event: Option<Instant>,
}

struct Inner {
    subscriptions: HashMap<ObjectIdentifier, ActiveSubscription>,
    listener: Option<RecordListener>,
}

pub struct SubscriptionManager {
    scope: NotificationScope,
    inner: Mutex<Inner>,
}

impl SubscriptionManager {
    pub fn new(scope: NotificationScope) -> Self {
        Self {
            scope,
            inner: Mutex::new(Inner {
                subscriptions: HashMap::new(),
                listener: None,
            }),
        }
    }

    pub fn scope(&self) -> NotificationScope {
        self.scope
    }

    /// Swaps the whole subscription set.
    ///
    /// Cancellation of the old set is best-effort. Returns the requests
    /// whose subscription failed, with the engine's error.
    pub fn replace(
        &self,
        backend: &dyn CovBackend,
        requests: Vec<SubscriptionRequest>,
        listener: RecordListener,
    ) -> Vec<(usize, ApiError)> {
        let mut inner = self.inner.lock();

        Self::cancel_locked(&mut inner, backend);
        inner.listener = Some(listener);

        let mut failures = Vec::new();
        for request in requests {
            if inner.subscriptions.contains_key(&request.object) {
                tracing::debug!(
                    "Channel {} shares object {} with an earlier channel, not subscribing twice",
                    request.container.channel_address,
                    request.object
                );
                continue;
            }

            inner.subscriptions.insert(
                request.object,
                ActiveSubscription {
                    object: request.object,
                    container: request.container,
                    definition: request.definition,
                    state: SubscriptionState::Pending,
                    created_at: Instant::now(),
                    last_event: None,
                },
            );

            match backend.subscribe(request.object) {
                Ok(()) => {
                    if let Some(entry) = inner.subscriptions.get_mut(&request.object) {
                        entry.state = SubscriptionState::Active;
                    }
                }
                Err(err) => {
                    tracing::warn!("Failed to subscribe to {}: {}", request.object, err);
                    inner.subscriptions.remove(&request.object);
                    failures.push((request.index, err));
                }
            }
        }

        tracing::debug!("Subscription set replaced, {} active", inner.subscriptions.len());
        failures
    }

    /// Cancels every subscription and drops the listener.
    pub fn cancel_all(&self, backend: &dyn CovBackend) {
        let mut inner = self.inner.lock();
        Self::cancel_locked(&mut inner, backend);
        inner.listener = None;
    }

    fn cancel_locked(inner: &mut Inner, backend: &dyn CovBackend) {
        for object in inner.subscriptions.keys() {
            if let Err(err) = backend.unsubscribe(*object) {
                tracing::debug!("Ignoring failed cancellation for {}: {}", object, err);
            }
        }
        inner.subscriptions.clear();
    }

    /// Routes an engine event to the listener. Returns whether a record
    /// was delivered.
    pub fn route(&self, event: &EngineEvent) -> bool {
        match (self.scope, event) {
            (
                NotificationScope::Remote { device },
                EngineEvent::CovNotification {
                    initiating_device,
                    object,
                    values,
                    ..
                },
            ) => {
                if *initiating_device != device {
                    return false;
                }
                let value = values
                    .iter()
                    .find(|entry| entry.property == PropertyIdentifier::PRESENT_VALUE)
                    .or_else(|| values.first());
                match value {
                    Some(entry) => self.publish(*object, &entry.value),
                    None => {
                        tracing::debug!("Notification for {} carried no values", object);
                        false
                    }
                }
            }
            (NotificationScope::Local, EngineEvent::LocalPropertyChanged { object, property, value }) => {
                if *property != PropertyIdentifier::PRESENT_VALUE {
                    return false;
                }
                self.publish(*object, value)
            }
            _ => false,
        }
    }

    /// Converts `value` and delivers it as the record of the channel
    /// subscribed to `object`.
    pub fn publish(&self, object: ObjectIdentifier, value: &BacnetValue) -> bool {
        let mut inner = self.inner.lock();
        let Inner { subscriptions, listener } = &mut *inner;

        let Some(entry) = subscriptions.get_mut(&object) else {
            tracing::trace!("Dropping notification for unsubscribed object {}", object);
            return false;
        };
        let Some(listener) = listener.as_ref() else {
            return false;
        };

        let now = Utc::now();
        let record = match entry.definition.as_ref().map(|definition| conversion::to_generic(value, definition)) {
            Some(Ok(converted)) => Record::new(converted, now),
            Some(Err(err)) => {
                tracing::debug!("Failed to convert notification for {}: {}", object, err);
                Record::flagged(Flag::DriverErrorChannelValueTypeConversionException, now)
            }
            None => Record::flagged(Flag::DriverErrorChannelValueTypeConversionException, now),
        };

        entry.last_event = Some(Instant::now());
        let mut container = entry.container.clone();
        container.record = Some(record);
        container.handle = Some(object);

        if !listener.deliver(vec![container]) {
            tracing::debug!("Listener for {} is gone", object);
            return false;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.inner.lock().subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_subscribed(&self, object: ObjectIdentifier) -> bool {
        self.inner.lock().subscriptions.contains_key(&object)
    }

    pub fn subscribed_objects(&self) -> Vec<ObjectIdentifier> {
        self.inner.lock().subscriptions.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Value;
    use crate::iter::records_channel;
    use bacnet_api::{present_value_type, ObjectType, PropertyValue};
    use std::cell::RefCell;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeBackend {
        active: RefCell<HashSet<ObjectIdentifier>>,
        refuse: Option<ObjectIdentifier>,
    }

    impl CovBackend for FakeBackend {
        fn subscribe(&self, object: ObjectIdentifier) -> bacnet_api::Result<()> {
            if self.refuse == Some(object) {
                return Err(ApiError::UnknownObject(object));
            }
            self.active.borrow_mut().insert(object);
            Ok(())
        }

        fn unsubscribe(&self, object: ObjectIdentifier) -> bacnet_api::Result<()> {
            self.active.borrow_mut().remove(&object);
            Ok(())
        }
    }

    fn av(instance: u32) -> ObjectIdentifier {
        ObjectIdentifier::new(ObjectType::ANALOG_VALUE, instance)
    }

    fn request(index: usize, instance: u32) -> SubscriptionRequest {
        SubscriptionRequest {
            index,
            object: av(instance),
            container: ChannelRecordContainer::new(format!("ch{}", instance), format!("Value{}", instance)),
            definition: present_value_type(ObjectType::ANALOG_VALUE),
        }
    }

    fn cov(device: u32, object: ObjectIdentifier, value: f32) -> EngineEvent {
        EngineEvent::CovNotification {
            initiating_device: device,
            process_id: 0,
            object,
            values: vec![
                PropertyValue {
                    property: PropertyIdentifier::STATUS_FLAGS,
                    value: BacnetValue::BitString(vec![false; 4]),
                },
                PropertyValue {
                    property: PropertyIdentifier::PRESENT_VALUE,
                    value: BacnetValue::Real(value),
                },
            ],
        }
    }

    #[test]
    fn test_replace_cancels_previous_set() {
        let backend = FakeBackend::default();
        let manager = SubscriptionManager::new(NotificationScope::Remote { device: 7 });

        let (listener, _rx) = records_channel();
        manager.replace(&backend, vec![request(0, 1), request(1, 2)], listener);
        assert_eq!(manager.len(), 2);

        let (listener, _rx) = records_channel();
        manager.replace(&backend, vec![request(0, 3)], listener);

        assert_eq!(manager.subscribed_objects(), vec![av(3)]);
        assert_eq!(*backend.active.borrow(), HashSet::from([av(3)]));
    }

    #[test]
    fn test_failed_subscription_is_reported() {
        let backend = FakeBackend {
            refuse: Some(av(2)),
            ..Default::default()
        };
        let manager = SubscriptionManager::new(NotificationScope::Local);

        let (listener, _rx) = records_channel();
        let failures = manager.replace(&backend, vec![request(0, 1), request(1, 2)], listener);

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 1);
        assert!(!manager.is_subscribed(av(2)));
    }

    #[test]
    fn test_route_delivers_present_value() {
        let backend = FakeBackend::default();
        let manager = SubscriptionManager::new(NotificationScope::Remote { device: 7 });
        let (listener, rx) = records_channel();
        manager.replace(&backend, vec![request(0, 1)], listener);

        assert!(manager.route(&cov(7, av(1), 22.5)));

        let batch = rx.try_recv().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].channel_id, "ch1");
        assert_eq!(batch[0].record.as_ref().unwrap().value, Some(Value::Float(22.5)));
    }

    #[test]
    fn test_route_ignores_other_devices_and_objects() {
        let backend = FakeBackend::default();
        let manager = SubscriptionManager::new(NotificationScope::Remote { device: 7 });
        let (listener, rx) = records_channel();
        manager.replace(&backend, vec![request(0, 1)], listener);

        assert!(!manager.route(&cov(8, av(1), 1.0)));
        assert!(!manager.route(&cov(7, av(9), 1.0)));
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_local_scope_forwards_present_value_only() {
        let backend = FakeBackend::default();
        let manager = SubscriptionManager::new(NotificationScope::Local);
        let (listener, rx) = records_channel();
        manager.replace(&backend, vec![request(0, 1)], listener);

        let description = EngineEvent::LocalPropertyChanged {
            object: av(1),
            property: PropertyIdentifier::DESCRIPTION,
            value: BacnetValue::CharacterString("x".into()),
        };
        assert!(!manager.route(&description));

        let present_value = EngineEvent::LocalPropertyChanged {
            object: av(1),
            property: PropertyIdentifier::PRESENT_VALUE,
            value: BacnetValue::Real(3.0),
        };
        assert!(manager.route(&present_value));
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_cancel_all_stops_delivery() {
        let backend = FakeBackend::default();
        let manager = SubscriptionManager::new(NotificationScope::Remote { device: 7 });
        let (listener, rx) = records_channel();
        manager.replace(&backend, vec![request(0, 1)], listener);

        manager.cancel_all(&backend);

        assert!(manager.is_empty());
        assert!(backend.active.borrow().is_empty());
        assert!(!manager.route(&cov(7, av(1), 1.0)));
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_conversion_failure_is_flagged() {
        let backend = FakeBackend::default();
        let manager = SubscriptionManager::new(NotificationScope::Remote { device: 7 });
        let (listener, rx) = records_channel();
        manager.replace(&backend, vec![request(0, 1)], listener);

        assert!(manager.publish(av(1), &BacnetValue::Null));
        let batch = rx.try_recv().unwrap();
        assert_eq!(
            batch[0].flag(),
            Some(Flag::DriverErrorChannelValueTypeConversionException)
        );
    }
}

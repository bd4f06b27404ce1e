//! Shared, reference-counted local endpoints
//!
//! One engine instance per UDP port, created lazily on the first `obtain`
//! for that port and terminated when the last holder releases it. The
//! registry is an explicit instance handed to every scanner and session;
//! all mutation happens under one lock, so the map holds an entry exactly
//! when that entry's count is at least one.
//!
//! Every created endpoint gets a fresh generation number. A release names
//! the endpoint it gives back, so a holder that outlived `release_all`
//! cannot drop a reference on a newer endpoint created on the same port.

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

use bacnet_api::{EndpointConfig, EngineFactory, ProtocolEngine};
use parking_lot::Mutex;

use crate::error::Result;

/// Well-known BACnet/IP port (0xBAC0).
pub const DEFAULT_PORT: u16 = 0xBAC0;

/// First instance number handed out to endpoints created without one.
pub const DEFAULT_INSTANCE_BASE: u32 = 10_000;

/// What a caller asks for; unset fields take registry defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointRequest {
    pub broadcast_address: Option<Ipv4Addr>,
    pub bind_address: Option<Ipv4Addr>,
    pub port: Option<u16>,
    pub instance_id: Option<u32>,
}

impl EndpointRequest {
    pub fn for_port(port: u16) -> Self {
        Self { port: Some(port), ..Self::default() }
    }

    pub fn broadcast(mut self, address: Option<Ipv4Addr>) -> Self {
        self.broadcast_address = address;
        self
    }

    pub fn bind(mut self, address: Option<Ipv4Addr>) -> Self {
        self.bind_address = address;
        self
    }

    pub fn instance(mut self, instance_id: Option<u32>) -> Self {
        self.instance_id = instance_id;
        self
    }
}

/// A session's handle on a shared endpoint.
///
/// Cloning does not take another reference; every successful
/// [`EndpointRegistry::obtain`] must be paired with one
/// [`EndpointRegistry::release`].
#[derive(Clone)]
pub struct LocalEndpoint {
    port: u16,
    generation: u64,
    instance_id: u32,
    broadcast_address: Ipv4Addr,
    engine: Arc<dyn ProtocolEngine>,
}

impl LocalEndpoint {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    /// Distinguishes endpoints created one after another on the same port.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn broadcast_address(&self) -> Ipv4Addr {
        self.broadcast_address
    }

    pub fn engine(&self) -> &Arc<dyn ProtocolEngine> {
        &self.engine
    }
}

impl fmt::Debug for LocalEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalEndpoint")
            .field("port", &self.port)
            .field("generation", &self.generation)
            .field("instance_id", &self.instance_id)
            .field("broadcast_address", &self.broadcast_address)
            .finish_non_exhaustive()
    }
}

struct Entry {
    endpoint: LocalEndpoint,
    ref_count: usize,
}

struct RegistryState {
    entries: HashMap<u16, Entry>,
    next_instance: u32,
    next_generation: u64,
}

/// Creates, shares and tears down local endpoints.
pub struct EndpointRegistry {
    factory: Arc<dyn EngineFactory>,
    state: Mutex<RegistryState>,
}

impl EndpointRegistry {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self::with_instance_base(factory, DEFAULT_INSTANCE_BASE)
    }

    pub fn with_instance_base(factory: Arc<dyn EngineFactory>, instance_base: u32) -> Self {
        Self {
            factory,
            state: Mutex::new(RegistryState {
                entries: HashMap::new(),
                next_instance: instance_base,
                next_generation: 0,
            }),
        }
    }

    /// Returns the endpoint for the requested port, creating it if needed.
    ///
    /// An existing endpoint is shared as-is; a conflicting `instance_id`
    /// in the request is logged and ignored.
    pub fn obtain(&self, request: &EndpointRequest) -> Result<LocalEndpoint> {
        let port = request.port.unwrap_or(DEFAULT_PORT);
        let mut state = self.state.lock();

        if let Some(entry) = state.entries.get_mut(&port) {
            if let Some(requested) = request.instance_id {
                if requested != entry.endpoint.instance_id {
                    tracing::warn!(
                        "Instance number of existing endpoint on port {} ({}) differs from requested {}",
                        port,
                        entry.endpoint.instance_id,
                        requested
                    );
                }
            }
            entry.ref_count += 1;
            tracing::debug!(
                "Endpoint reference count for port {}: {} -> {}",
                port,
                entry.ref_count - 1,
                entry.ref_count
            );
            return Ok(entry.endpoint.clone());
        }

        let instance_id = match request.instance_id {
            Some(id) => id,
            None => {
                let id = state.next_instance;
                state.next_instance += 1;
                id
            }
        };
        let config = EndpointConfig {
            port,
            instance_id,
            broadcast_address: request.broadcast_address.unwrap_or(Ipv4Addr::BROADCAST),
            bind_address: request.bind_address.unwrap_or(Ipv4Addr::UNSPECIFIED),
        };

        let engine = self.factory.create(&config)?;
        let generation = state.next_generation;
        state.next_generation += 1;
        let endpoint = LocalEndpoint {
            port,
            generation,
            instance_id,
            broadcast_address: config.broadcast_address,
            engine,
        };
        state.entries.insert(port, Entry { endpoint: endpoint.clone(), ref_count: 1 });

        tracing::debug!(
            "Created local endpoint on port {} as device {} (bind {}, broadcast {})",
            port,
            instance_id,
            config.bind_address,
            config.broadcast_address
        );
        Ok(endpoint)
    }

    /// Drops the reference taken when `endpoint` was obtained; the last
    /// release terminates it. Releasing an endpoint that has already been
    /// torn down is a no-op.
    pub fn release(&self, endpoint: &LocalEndpoint) {
        let port = endpoint.port;
        let mut state = self.state.lock();

        let Some(entry) = state.entries.get_mut(&port) else {
            tracing::warn!("Release of unknown endpoint on port {}", port);
            return;
        };
        if entry.endpoint.generation != endpoint.generation {
            tracing::debug!(
                "Ignoring release of terminated endpoint on port {} (generation {}, current {})",
                port,
                endpoint.generation,
                entry.endpoint.generation
            );
            return;
        }

        let old_count = entry.ref_count;
        entry.ref_count = entry.ref_count.saturating_sub(1);
        tracing::debug!("Endpoint reference count for port {}: {} -> {}", port, old_count, entry.ref_count);

        if entry.ref_count == 0 {
            if let Some(entry) = state.entries.remove(&port) {
                entry.endpoint.engine.terminate();
                tracing::debug!("Terminated local endpoint on port {}", port);
            }
        }
    }

    /// Terminates every endpoint regardless of outstanding references.
    pub fn release_all(&self) {
        let mut state = self.state.lock();
        for (port, entry) in state.entries.drain() {
            entry.endpoint.engine.terminate();
            tracing::debug!(
                "Terminated local endpoint on port {} ({} references outstanding)",
                port,
                entry.ref_count
            );
        }
    }

    pub fn ref_count(&self, port: u16) -> usize {
        self.state.lock().entries.get(&port).map_or(0, |entry| entry.ref_count)
    }

    pub fn is_registered(&self, port: u16) -> bool {
        self.state.lock().entries.contains_key(&port)
    }

    pub fn ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self.state.lock().entries.keys().copied().collect();
        ports.sort_unstable();
        ports
    }
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistry").field("ports", &self.ports()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacnet_api::loopback::LoopbackNetwork;
    use std::thread;

    fn registry() -> (LoopbackNetwork, EndpointRegistry) {
        let network = LoopbackNetwork::new();
        let registry = EndpointRegistry::new(Arc::new(network.clone()));
        (network, registry)
    }

    #[test]
    fn test_obtain_is_shared_per_port() {
        let (network, registry) = registry();

        let first = registry.obtain(&EndpointRequest::for_port(47808)).unwrap();
        let second = registry.obtain(&EndpointRequest::for_port(47808)).unwrap();

        assert!(Arc::ptr_eq(first.engine(), second.engine()));
        assert_eq!(registry.ref_count(47808), 2);
        assert_eq!(network.created_endpoints().len(), 1);
    }

    #[test]
    fn test_defaults_and_instance_numbering() {
        let (network, registry) = registry();

        let a = registry.obtain(&EndpointRequest::default()).unwrap();
        let b = registry.obtain(&EndpointRequest::for_port(47809)).unwrap();
        let c = registry.obtain(&EndpointRequest::for_port(47810).instance(Some(77))).unwrap();

        assert_eq!(a.port(), DEFAULT_PORT);
        assert_eq!(a.instance_id(), 10_000);
        assert_eq!(b.instance_id(), 10_001);
        assert_eq!(c.instance_id(), 77);

        let created = network.created_endpoints();
        assert_eq!(created[0].broadcast_address, Ipv4Addr::BROADCAST);
        assert_eq!(created[0].bind_address, Ipv4Addr::UNSPECIFIED);
    }

    #[test]
    fn test_conflicting_instance_keeps_existing() {
        let (_network, registry) = registry();

        registry.obtain(&EndpointRequest::for_port(47808).instance(Some(5))).unwrap();
        let shared = registry.obtain(&EndpointRequest::for_port(47808).instance(Some(6))).unwrap();
        assert_eq!(shared.instance_id(), 5);
    }

    #[test]
    fn test_last_release_terminates() {
        let (network, registry) = registry();

        let first = registry.obtain(&EndpointRequest::for_port(47808)).unwrap();
        let second = registry.obtain(&EndpointRequest::for_port(47808)).unwrap();

        registry.release(&first);
        assert!(registry.is_registered(47808));
        assert!(network.terminated_endpoints().is_empty());

        registry.release(&second);
        assert!(!registry.is_registered(47808));
        assert_eq!(network.terminated_endpoints(), vec![47808]);

        // extra release is harmless
        registry.release(&second);
        assert_eq!(registry.ref_count(47808), 0);
    }

    #[test]
    fn test_creation_failure_registers_nothing() {
        let (network, registry) = registry();
        network.fail_endpoint_creation(47811);

        assert!(registry.obtain(&EndpointRequest::for_port(47811)).is_err());
        assert!(!registry.is_registered(47811));
    }

    #[test]
    fn test_release_all() {
        let (network, registry) = registry();
        registry.obtain(&EndpointRequest::for_port(47808)).unwrap();
        registry.obtain(&EndpointRequest::for_port(47809)).unwrap();
        registry.obtain(&EndpointRequest::for_port(47809)).unwrap();

        registry.release_all();
        assert!(registry.ports().is_empty());
        assert_eq!(network.terminated_endpoints().len(), 2);
    }

    #[test]
    fn test_release_after_release_all_spares_new_endpoint() {
        let (network, registry) = registry();
        let old = registry.obtain(&EndpointRequest::for_port(47808)).unwrap();
        registry.release_all();

        let current = registry.obtain(&EndpointRequest::for_port(47808)).unwrap();
        assert_ne!(old.generation(), current.generation());

        registry.release(&old);
        assert_eq!(registry.ref_count(47808), 1);
        assert_eq!(network.terminated_endpoints(), vec![47808]);

        registry.release(&current);
        assert!(!registry.is_registered(47808));
    }

    #[test]
    fn test_concurrent_obtain_release() {
        let (network, registry) = registry();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.obtain(&EndpointRequest::for_port(47808)).unwrap())
            })
            .collect();
        let endpoints: Vec<LocalEndpoint> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
        assert_eq!(registry.ref_count(47808), 16);
        assert_eq!(network.created_endpoints().len(), 1);

        let handles: Vec<_> = endpoints
            .into_iter()
            .map(|endpoint| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.release(&endpoint))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(!registry.is_registered(47808));
        assert_eq!(network.terminated_endpoints(), vec![47808]);
    }
}

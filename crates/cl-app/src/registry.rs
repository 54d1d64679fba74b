use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use cl_core::ports::RemoteTransportPort;
use cl_core::{Endpoint, EndpointId, Phase};
use futures::future::join_all;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Discovers remote endpoints and folds transient handles onto stable ids.
///
/// Endpoint records are never removed. An endpoint that stops being listed
/// just drops out of the current set and keeps its history (`last_seen`,
/// preferred handle) for when it comes back.
///
/// A resolved serial is cached per handle while that handle stays listed.
/// Handles that fell back to their own name are asked again every poll.
pub struct EndpointRegistry {
    transport: Arc<dyn RemoteTransportPort>,
    known: HashMap<EndpointId, Endpoint>,
    current: Vec<EndpointId>,
    resolved: HashMap<String, EndpointId>,
}

impl EndpointRegistry {
    pub fn new(transport: Arc<dyn RemoteTransportPort>) -> Self {
        Self {
            transport,
            known: HashMap::new(),
            current: Vec::new(),
            resolved: HashMap::new(),
        }
    }

    /// Poll the transport and return the current endpoint set.
    ///
    /// When the listing itself fails the previous current set is left in
    /// place and the error is returned for the caller to log.
    pub async fn discover(&mut self, now: Instant) -> Result<Vec<Endpoint>> {
        let handles = self.transport.list_endpoints().await?;

        // A handle that disappears may come back pointing at another device.
        self.resolved.retain(|handle, _| handles.contains(handle));
        let unresolved: Vec<&String> = handles
            .iter()
            .filter(|handle| !self.resolved.contains_key(*handle))
            .collect();
        let serials = join_all(unresolved.iter().map(|handle| self.resolve(handle))).await;
        for (handle, serial) in unresolved.into_iter().zip(serials) {
            if let Some(id) = serial {
                self.resolved.insert(handle.clone(), id);
            }
        }
        let identities: Vec<EndpointId> = handles
            .iter()
            .map(|handle| {
                self.resolved
                    .get(handle)
                    .cloned()
                    .unwrap_or_else(|| EndpointId::new(handle.as_str()))
            })
            .collect();

        // Group handles by identity, keeping listing order.
        let mut order: Vec<EndpointId> = Vec::new();
        let mut listed: HashMap<EndpointId, Vec<String>> = HashMap::new();
        for (handle, id) in handles.into_iter().zip(identities) {
            let entry = listed.entry(id.clone()).or_insert_with(|| {
                order.push(id);
                Vec::new()
            });
            if !entry.contains(&handle) {
                entry.push(handle);
            }
        }

        for id in &order {
            let handles = &listed[id];
            match self.known.get_mut(id) {
                Some(endpoint) => {
                    if !handles.contains(&endpoint.handle) {
                        info!(
                            endpoint = %id,
                            old_handle = %endpoint.handle,
                            new_handle = %handles[0],
                            "Endpoint reachable through a new handle"
                        );
                        endpoint.handle = handles[0].clone();
                    }
                    endpoint.last_seen = now;
                }
                None => {
                    info!(endpoint = %id, handle = %handles[0], "Endpoint discovered");
                    self.known
                        .insert(id.clone(), Endpoint::new(id.clone(), handles[0].clone(), now));
                }
            }
            if handles.len() > 1 {
                debug!(endpoint = %id, handles = ?handles, "Several handles share one identity");
            }
        }

        for gone in self.current.iter().filter(|id| !listed.contains_key(*id)) {
            info!(endpoint = %gone, "Endpoint no longer listed");
        }
        self.current = order;

        Ok(self.current())
    }

    /// `None` when the handle has to stand in for its own identity.
    async fn resolve(&self, handle: &str) -> Option<EndpointId> {
        match self.transport.canonical_identity(handle).await {
            Ok(Some(serial)) if !serial.trim().is_empty() => Some(EndpointId::new(serial.trim())),
            Ok(_) => {
                warn!(
                    endpoint = %handle,
                    phase = %Phase::Discover,
                    "Endpoint reported no serial; using its handle as identity"
                );
                None
            }
            Err(err) => {
                warn!(
                    endpoint = %handle,
                    phase = %Phase::Discover,
                    error = %format!("{err:#}"),
                    "Failed to resolve endpoint identity; using its handle"
                );
                None
            }
        }
    }

    /// Endpoints present in the latest successful poll, in listing order.
    pub fn current(&self) -> Vec<Endpoint> {
        self.current
            .iter()
            .filter_map(|id| self.known.get(id).cloned())
            .collect()
    }

    pub fn is_present(&self, id: &EndpointId) -> bool {
        self.current.contains(id)
    }

    /// Any endpoint ever discovered, present or not.
    pub fn get(&self, id: &EndpointId) -> Option<&Endpoint> {
        self.known.get(id)
    }

    pub fn known_len(&self) -> usize {
        self.known.len()
    }
}

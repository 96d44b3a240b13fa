// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Turns raw watch events into created/updated/deleted pod notifications.

use crate::types::ResourceKey;
use k8s_openapi::api::core::v1::Pod;
use kube::runtime::watcher::Event;
use std::collections::HashSet;

/// Lifecycle notification for a single pod
#[derive(Debug, Clone)]
pub enum PodEvent {
    Created(Pod),
    Updated(Pod),
    Deleted(DeletedPod),
}

/// What is left of a pod once it is gone
#[derive(Debug, Clone)]
pub enum DeletedPod {
    /// Last state delivered with the delete event
    Final(Pod),
    /// The pod disappeared while the watch was re-listing; only its key is known
    Tombstone(ResourceKey),
}

impl PodEvent {
    pub fn key(&self) -> ResourceKey {
        match self {
            PodEvent::Created(pod) | PodEvent::Updated(pod) => ResourceKey::from_pod(pod),
            PodEvent::Deleted(deleted) => deleted.key(),
        }
    }
}

impl DeletedPod {
    /// Key extraction that works for both final states and tombstones
    pub fn key(&self) -> ResourceKey {
        match self {
            DeletedPod::Final(pod) => ResourceKey::from_pod(pod),
            DeletedPod::Tombstone(key) => key.clone(),
        }
    }
}

/// Tracks which pods the watch has reported so applies can be split into
/// creates and updates, and so pods missing from a re-list surface as deletes.
///
/// Pods delivered during a (re-)list are held back until `InitDone`. The
/// reflector only swaps its store at that point, so a key enqueued earlier
/// would be reconciled against the previous store contents.
#[derive(Debug, Default)]
pub struct EventClassifier {
    known: HashSet<ResourceKey>,
    relisted: Option<Vec<Pod>>,
}

impl EventClassifier {
    pub fn classify(&mut self, event: Event<Pod>) -> Vec<PodEvent> {
        match event {
            Event::Init => {
                self.relisted = Some(Vec::new());
                Vec::new()
            }
            Event::InitApply(pod) => {
                self.relisted.get_or_insert_with(Vec::new).push(pod);
                Vec::new()
            }
            Event::Apply(pod) => {
                let key = ResourceKey::from_pod(&pod);
                vec![self.applied(key, pod)]
            }
            Event::Delete(pod) => {
                self.known.remove(&ResourceKey::from_pod(&pod));
                vec![PodEvent::Deleted(DeletedPod::Final(pod))]
            }
            Event::InitDone => self.relist_done(),
        }
    }

    fn applied(&mut self, key: ResourceKey, pod: Pod) -> PodEvent {
        if self.known.insert(key) {
            PodEvent::Created(pod)
        } else {
            PodEvent::Updated(pod)
        }
    }

    /// Release the buffered list and turn pods missing from it into tombstones
    fn relist_done(&mut self) -> Vec<PodEvent> {
        let pods = self.relisted.take().unwrap_or_default();
        let previous = std::mem::take(&mut self.known);

        let mut events: Vec<PodEvent> = pods
            .into_iter()
            .map(|pod| {
                let key = ResourceKey::from_pod(&pod);
                self.applied_after_relist(&previous, key, pod)
            })
            .collect();

        let mut vanished: Vec<ResourceKey> = previous
            .into_iter()
            .filter(|key| !self.known.contains(key))
            .collect();
        vanished.sort();
        events.extend(
            vanished
                .into_iter()
                .map(|key| PodEvent::Deleted(DeletedPod::Tombstone(key))),
        );
        events
    }

    fn applied_after_relist(
        &mut self,
        previous: &HashSet<ResourceKey>,
        key: ResourceKey,
        pod: Pod,
    ) -> PodEvent {
        let seen_before = previous.contains(&key);
        self.known.insert(key);
        if seen_before {
            PodEvent::Updated(pod)
        } else {
            PodEvent::Created(pod)
        }
    }
}

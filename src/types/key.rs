// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::core::v1::Pod;
use kube::{runtime::reflector::ObjectRef, ResourceExt};
use std::fmt;

/// Stable identity of a watched pod, rendered as `namespace/name`.
///
/// Used as the only identity for queue deduplication, cache lookups and
/// debounce state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    namespace: Option<String>,
    name: String,
}

impl ResourceKey {
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Key of a live pod as delivered by the watch
    pub fn from_pod(pod: &Pod) -> Self {
        Self {
            namespace: pod.namespace(),
            name: pod.name_any(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference used to look the pod up in the reflector store
    pub fn to_object_ref(&self) -> ObjectRef<Pod> {
        let reference = ObjectRef::new(&self.name);
        match &self.namespace {
            Some(ns) => reference.within(ns),
            None => reference,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

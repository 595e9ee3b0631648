use crate::config::GradiatorConfig;
use crate::errors::Result;
use crate::storage::KeyValueStore;
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

pub type BoxedKeyValueStoreFuture =
    Pin<Box<dyn Future<Output = Result<Box<dyn KeyValueStore>>> + Send>>;
pub type KeyValueStoreConstructor =
    Arc<dyn Fn(GradiatorConfig) -> BoxedKeyValueStoreFuture + Send + Sync>;

static STORAGE_REGISTRY: Lazy<RwLock<HashMap<String, KeyValueStoreConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn register_storage_plugin<S: Into<String>>(name: S, constructor: KeyValueStoreConstructor) {
    let name = name.into();
    let mut registry = STORAGE_REGISTRY
        .write()
        .expect("Storage registry lock poisoned");
    registry.insert(name, constructor);
}

pub fn get_storage_plugin(name: &str) -> Option<KeyValueStoreConstructor> {
    STORAGE_REGISTRY
        .read()
        .expect("Storage registry lock poisoned")
        .get(name)
        .cloned()
}

pub fn debug_storage_registry() {
    let registry = STORAGE_REGISTRY
        .read()
        .expect("Storage registry lock poisoned");
    if registry.is_empty() {
        tracing::debug!("No storage plugins registered.");
    } else {
        tracing::debug!("Registered storage plugins:");
        for key in registry.keys() {
            tracing::debug!(" - {}", key);
        }
    }
}

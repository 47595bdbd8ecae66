use once_cell::sync::OnceCell;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

type Map<V> = HashMap<TypeId, V>;

pub(crate) type AnyBox = Box<dyn Any + Send + Sync>;

/// Process-wide map keyed by a type, created on first access
pub(crate) struct StaticTypeMap<V = AnyBox> {
    inner: OnceCell<RwLock<Map<V>>>,
}

impl<V> StaticTypeMap<V> {
    pub(crate) const fn new() -> Self {
        Self {
            inner: OnceCell::new(),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Map<V>> {
        self.get_or_init().read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Map<V>> {
        self.get_or_init().write()
    }

    fn get_or_init(&self) -> &RwLock<Map<V>> {
        self.inner.get_or_init(|| RwLock::new(Map::new()))
    }
}

use super::{Channel, Topic};
use crate::common::{AnyBox, StaticTypeMap};
use std::sync::{Arc, Weak};

type Instances<T> = Vec<Weak<Channel<T>>>;

/// One channel per topic type, created on first request
static GLOBALS: StaticTypeMap = StaticTypeMap::new();

/// Every channel ever constructed, per topic type
static INSTANCES: StaticTypeMap = StaticTypeMap::new();

pub(crate) fn global<T: Topic>() -> Arc<Channel<T>> {
    let id = id!(T);

    macro_rules! try_get {
        ($map:ident) => {
            if let Some(channel) = $map
                .get(&id)
                .and_then(|channel| (**channel).downcast_ref::<Arc<Channel<T>>>())
            {
                return Arc::clone(channel);
            }
        };
    }

    // fast get with shared access
    let map = GLOBALS.read();
    try_get!(map);
    drop(map);

    // slow get with unique access
    let mut map = GLOBALS.write();
    try_get!(map);

    // create & store
    let channel = Channel::<T>::new();
    map.insert(id, Box::new(Arc::clone(&channel)));
    channel
}

pub(crate) fn register<T: Topic>(channel: &Arc<Channel<T>>) {
    let mut map = INSTANCES.write();
    let list = map
        .entry(id!(T))
        .or_insert_with(|| Box::new(Instances::<T>::new()) as AnyBox);
    if let Some(list) = (**list).downcast_mut::<Instances<T>>() {
        list.push(Arc::downgrade(channel));
    }
}

pub(crate) fn instances<T: Topic>() -> Vec<Arc<Channel<T>>> {
    INSTANCES
        .read()
        .get(&id!(T))
        .and_then(|list| (**list).downcast_ref::<Instances<T>>())
        .map(|list| list.iter().filter_map(Weak::upgrade).collect())
        .unwrap_or_default()
}

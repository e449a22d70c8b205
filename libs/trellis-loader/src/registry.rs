// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use crate::{BatchConfig, BatchLoader, Loader};

type LoaderFactory = Arc<dyn Fn(&BatchConfig) -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// The loader implementations available to a request.
///
/// The registry itself holds no cached data. Each operation execution calls [`instantiate`] to
/// obtain fresh [`BatchLoader`]s, so cached values never leak from one request to another.
///
/// [`instantiate`]: LoaderRegistry::instantiate
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    factories: HashMap<TypeId, (&'static str, LoaderFactory)>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader that uses the batch configuration supplied at instantiation.
    /// Registering a second loader of the same type replaces the first.
    pub fn register<L: Loader>(&mut self, loader: L) -> &mut Self {
        self.insert(loader, None)
    }

    pub fn register_with_config<L: Loader>(&mut self, loader: L, config: BatchConfig) -> &mut Self {
        self.insert(loader, Some(config))
    }

    fn insert<L: Loader>(&mut self, loader: L, config: Option<BatchConfig>) -> &mut Self {
        let loader = Arc::new(loader);
        let factory: LoaderFactory = Arc::new(move |defaults: &BatchConfig| {
            let config = config.as_ref().unwrap_or(defaults).clone();
            Box::new(BatchLoader::with_config(loader.clone(), config)) as Box<dyn Any + Send + Sync>
        });

        self.factories
            .insert(TypeId::of::<L>(), (type_name::<L>(), factory));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Create fresh batch loaders. Loaders registered without their own configuration use
    /// `defaults`.
    pub fn instantiate(&self, defaults: &BatchConfig) -> Loaders {
        Loaders {
            loaders: self
                .factories
                .iter()
                .map(|(type_id, (name, factory))| (*type_id, (*name, factory(defaults))))
                .collect(),
        }
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.factories.values().map(|(name, _)| name))
            .finish()
    }
}

/// Batch loaders for one operation execution.
#[derive(Default)]
pub struct Loaders {
    loaders: HashMap<TypeId, (&'static str, Box<dyn Any + Send + Sync>)>,
}

impl Loaders {
    pub fn get<L: Loader>(&self) -> Option<&BatchLoader<L>> {
        self.loaders
            .get(&TypeId::of::<L>())
            .and_then(|(_, loader)| loader.downcast_ref())
    }
}

impl fmt::Debug for Loaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.loaders.values().map(|(name, _)| name))
            .finish()
    }
}

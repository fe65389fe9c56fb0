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

use crate::ecs::entity_store::{EntityStore, SlotState};
use crate::ecs::handle::WorldAnchor;
use crate::ecs::storage::AnyStorage;
use crate::ecs::{
    component_index, Component, ComponentFilter, ComponentStorage, Core, EcsError, EntityHandle,
    EntityMut, EntityRef, Resource, Resources, Transform, TypeSet,
};
use ember_core::ecs::EntityId;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Upper bound on flush rounds per `simulate` call. Operations queued by Core
/// callbacks are flushed in follow-up rounds; past this bound they wait for
/// the next frame.
const MAX_FLUSH_ROUNDS: usize = 16;

/// Whether the World currently hosts a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldState {
    /// No scene: entities can be created but nothing is flushed.
    Unloaded,
    /// A scene is active.
    Loaded,
}

/// Counters describing one [`World::simulate`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Entities that became visible.
    pub created: usize,
    /// Entities whose slots were released.
    pub destroyed: usize,
    /// `on_entity_added` notifications dispatched.
    pub added: usize,
    /// `on_entity_removed` notifications dispatched.
    pub removed: usize,
    /// Flush rounds run (callbacks may queue more work).
    pub rounds: usize,
}

#[derive(Debug, Clone, Copy)]
enum PendingOp {
    Create(EntityId),
    Destroy(EntityId),
    RemoveComponent { entity: EntityId, index: usize },
    Changed(EntityId),
}

impl PendingOp {
    fn entity(&self) -> EntityId {
        match *self {
            PendingOp::Create(e)
            | PendingOp::Destroy(e)
            | PendingOp::Changed(e)
            | PendingOp::RemoveComponent { entity: e, .. } => e,
        }
    }
}

struct CoreSlot {
    name: &'static str,
    type_id: TypeId,
    /// `None` while one of the Core's own methods is running.
    core: Option<Box<dyn Core>>,
    filter: ComponentFilter,
    members: HashSet<EntityId>,
}

/// The owner of every entity, component storage, resource and Core.
///
/// # Frame contract
///
/// - [`create_entity`](Self::create_entity) hands out an id immediately, but
///   the entity stays *pending*: Cores do not see it until the next
///   [`simulate`](Self::simulate).
/// - [`destroy_entity`](Self::destroy_entity) and
///   [`remove_component`](Self::remove_component) are queued as well; the
///   data stays readable until the flush has notified every Core.
/// - [`add_component`](Self::add_component) stores the value at once; Cores
///   learn about the new match at the next flush.
/// - [`update_cores`](Self::update_cores) runs Cores in registration order.
pub struct World {
    state: WorldState,
    entities: EntityStore,
    storages: Vec<Option<Box<dyn AnyStorage>>>,
    resources: Resources,
    cores: Vec<CoreSlot>,
    pending: Vec<PendingOp>,
    /// Operations held back because a Core they concern was running.
    deferred: Vec<PendingOp>,
    orphaned: Vec<EntityId>,
    anchor: Arc<WorldAnchor>,
}

impl World {
    /// Creates a World with an empty, loaded scene.
    pub fn new() -> Self {
        Self {
            state: WorldState::Loaded,
            entities: EntityStore::new(),
            storages: Vec::new(),
            resources: Resources::new(),
            cores: Vec::new(),
            pending: Vec::new(),
            deferred: Vec::new(),
            orphaned: Vec::new(),
            anchor: Arc::new(WorldAnchor { scene_serial: 0 }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scene state
    // ─────────────────────────────────────────────────────────────────────

    /// The current scene state.
    #[must_use]
    pub fn state(&self) -> WorldState {
        self.state
    }

    /// Returns `true` while a scene is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state == WorldState::Loaded
    }

    /// Increments every time a scene is unloaded.
    #[must_use]
    pub fn scene_serial(&self) -> u64 {
        self.anchor.scene_serial
    }

    /// Drops every entity, component and pending operation of the current
    /// scene and moves to [`WorldState::Unloaded`].
    ///
    /// Cores stay registered; their tracked sets are cleared and
    /// [`Core::on_scene_unloaded`] is called. Every [`EntityHandle`] minted
    /// so far stops resolving. Resources are kept.
    pub fn unload_scene(&mut self) {
        if self.state == WorldState::Unloaded {
            return;
        }
        log::info!(
            "Unloading scene {} ({} entities).",
            self.anchor.scene_serial,
            self.entities.live_count()
        );

        for slot in &mut self.cores {
            slot.members.clear();
        }
        for storage in self.storages.iter_mut().flatten() {
            storage.clear();
        }
        self.entities.release_all();
        self.pending.clear();
        self.deferred.clear();
        self.orphaned.clear();
        self.anchor = Arc::new(WorldAnchor {
            scene_serial: self.anchor.scene_serial + 1,
        });
        self.state = WorldState::Unloaded;

        for index in 0..self.cores.len() {
            self.with_core(index, |core, _| core.on_scene_unloaded());
        }
    }

    /// Activates a fresh scene, unloading the current one first.
    ///
    /// Calls [`Core::on_scene_loaded`] on every Core in registration order.
    pub fn load_scene(&mut self) -> Result<(), EcsError> {
        self.unload_scene();
        self.state = WorldState::Loaded;
        log::info!("Scene {} loaded.", self.anchor.scene_serial);

        for index in 0..self.cores.len() {
            let name = self.cores[index].name;
            if let Some(Err(source)) = self.with_core(index, |core, world| core.on_scene_loaded(world))
            {
                log::error!("Core '{name}' failed to load the scene: {source}");
                return Err(EcsError::CoreInit { core: name, source });
            }
        }
        Ok(())
    }

    pub(crate) fn anchor(&self) -> &Arc<WorldAnchor> {
        &self.anchor
    }

    // ─────────────────────────────────────────────────────────────────────
    // Entity lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Allocates an entity. It becomes visible to Cores at the next flush.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.entities.allocate();
        if self.state == WorldState::Unloaded {
            log::warn!("Entity {id} created while no scene is loaded; it stays pending until a scene is loaded.");
        }
        self.pending.push(PendingOp::Create(id));
        log::trace!("Created entity {id} (pending).");
        id
    }

    /// Allocates an entity and returns a write accessor for it.
    pub fn spawn(&mut self) -> EntityMut<'_> {
        let id = self.create_entity();
        EntityMut::new(self, id)
    }

    /// Queues `entity` for destruction at the next flush.
    ///
    /// Destroying an entity that is already queued is a no-op.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<(), EcsError> {
        self.ensure_live(entity)?;
        if !self
            .pending
            .iter()
            .any(|op| matches!(op, PendingOp::Destroy(e) if *e == entity))
        {
            self.pending.push(PendingOp::Destroy(entity));
        }
        Ok(())
    }

    /// Returns `true` if `entity` is pending or alive.
    #[must_use]
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_live(entity)
    }

    /// Returns `true` if `entity` was created but not flushed yet.
    #[must_use]
    pub fn is_pending(&self, entity: EntityId) -> bool {
        self.entities
            .get(entity)
            .is_some_and(|slot| slot.state == SlotState::Pending)
    }

    /// Returns `true` if `entity` is queued for destruction.
    #[must_use]
    pub fn is_pending_destroy(&self, entity: EntityId) -> bool {
        self.pending
            .iter()
            .any(|op| matches!(op, PendingOp::Destroy(e) if *e == entity))
    }

    /// Number of pending or alive entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.live_count()
    }

    /// Number of queued structural operations.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drains the transforms that lost their parent during a flush without
    /// any Core re-parenting them, keeping those still live and parentless.
    pub fn take_orphaned_transforms(&mut self) -> Vec<EntityId> {
        let mut orphans = std::mem::take(&mut self.orphaned);
        orphans.dedup();
        orphans.retain(|entity| self.is_alive(*entity) && self.parent_of(*entity).is_none());
        orphans
    }

    /// Iterates over every flushed entity, in slot order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.alive().map(|slot| slot.id)
    }

    /// Returns a read accessor for a live entity.
    pub fn entity(&self, entity: EntityId) -> Result<EntityRef<'_>, EcsError> {
        self.ensure_live(entity)?;
        Ok(EntityRef::new(self, entity))
    }

    /// Returns a write accessor for a live entity.
    pub fn entity_mut(&mut self, entity: EntityId) -> Result<EntityMut<'_>, EcsError> {
        self.ensure_live(entity)?;
        Ok(EntityMut::new(self, entity))
    }

    /// Creates a validated, non-owning handle to `entity`.
    #[must_use]
    pub fn handle(&self, entity: EntityId) -> EntityHandle {
        EntityHandle::new(entity, &self.anchor)
    }

    /// Returns the id currently issued for a slot index. Editor helper.
    #[must_use]
    pub fn id_at_slot(&self, slot: usize) -> Option<EntityId> {
        self.entities
            .current_id(slot)
            .filter(|id| self.entities.is_live(*id))
    }

    fn ensure_live(&self, entity: EntityId) -> Result<(), EcsError> {
        if self.entities.is_live(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity { entity })
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Components
    // ─────────────────────────────────────────────────────────────────────

    /// Attaches `value` to `entity`.
    ///
    /// Either the component is fully stored or, on error, the entity is left
    /// without a new `T`.
    pub fn add_component<T: Component>(
        &mut self,
        entity: EntityId,
        value: T,
    ) -> Result<&mut T, EcsError> {
        self.ensure_live(entity)?;
        if self.storage::<T>().is_some_and(|s| s.contains(entity)) {
            let error = EcsError::DuplicateComponent {
                entity,
                component: T::NAME,
            };
            log::error!("{error}");
            return Err(error);
        }

        let index = component_index::<T>();
        let visible = match self.entities.get_mut(entity) {
            Some(slot) => {
                slot.types.insert(index);
                slot.state == SlotState::Alive
            }
            None => return Err(EcsError::InvalidEntity { entity }),
        };
        if visible {
            self.pending.push(PendingOp::Changed(entity));
        }

        self.storage_or_insert::<T>().insert(entity, value)
    }

    /// Queues removal of `entity`'s `T` for the next flush. No-op if absent.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Result<(), EcsError> {
        self.ensure_live(entity)?;
        if self.storage::<T>().is_some_and(|s| s.contains(entity)) {
            self.pending.push(PendingOp::RemoveComponent {
                entity,
                index: component_index::<T>(),
            });
        }
        Ok(())
    }

    /// Returns `entity`'s `T`.
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Result<&T, EcsError> {
        self.ensure_live(entity)?;
        self.try_get_component(entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                component: T::NAME,
            })
    }

    /// Returns `entity`'s `T` mutably.
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Result<&mut T, EcsError> {
        self.ensure_live(entity)?;
        self.try_get_component_mut(entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                component: T::NAME,
            })
    }

    /// Returns `entity`'s `T`, or `None`.
    #[must_use]
    pub fn try_get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Returns `entity`'s `T` mutably, or `None`.
    pub fn try_get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Returns `true` if `entity` has a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        self.try_get_component::<T>(entity).is_some()
    }

    /// The component types attached to `entity`.
    #[must_use]
    pub fn component_types(&self, entity: EntityId) -> Option<&TypeSet> {
        self.entities.get(entity).map(|slot| &slot.types)
    }

    /// Names of every component attached to `entity`, in type-index order.
    #[must_use]
    pub fn component_names(&self, entity: EntityId) -> Vec<&'static str> {
        let Some(slot) = self.entities.get(entity) else {
            return Vec::new();
        };
        slot.types
            .iter()
            .filter_map(|index| self.storages.get(index)?.as_ref())
            .map(|storage| storage.type_name())
            .collect()
    }

    /// The storage of `T`, if any `T` was ever added.
    #[must_use]
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(component_index::<T>())?
            .as_ref()?
            .as_any()
            .downcast_ref::<ComponentStorage<T>>()
    }

    /// The storage of `T`, mutably.
    pub fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.storages
            .get_mut(component_index::<T>())?
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }

    /// Iterates over every stored `T`, pending entities included.
    pub fn iter_components<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.storage::<T>().into_iter().flat_map(|s| s.iter())
    }

    fn storage_or_insert<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        let index = component_index::<T>();
        if index >= self.storages.len() {
            self.storages.resize_with(index + 1, || None);
        }
        let storage = self.storages[index]
            .get_or_insert_with(|| Box::new(ComponentStorage::<T>::new()));
        match storage.as_any_mut().downcast_mut::<ComponentStorage<T>>() {
            Some(storage) => storage,
            None => unreachable!("component index {index} is not the storage of `{}`", T::NAME),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Filtering
    // ─────────────────────────────────────────────────────────────────────

    /// Iterates over the flushed entities matching `filter`.
    ///
    /// Every call rescans the slot table; the sequence is finite and can be
    /// restarted by calling again.
    pub fn get_entities<'a>(
        &'a self,
        filter: &'a ComponentFilter,
    ) -> impl Iterator<Item = EntityId> + 'a {
        self.entities
            .alive()
            .filter(move |slot| filter.matches(&slot.types))
            .map(|slot| slot.id)
    }

    /// Returns `true` if `entity` is flushed and matches `filter`.
    #[must_use]
    pub fn matches(&self, entity: EntityId, filter: &ComponentFilter) -> bool {
        self.entities
            .get(entity)
            .is_some_and(|slot| slot.state == SlotState::Alive && filter.matches(&slot.types))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Resources
    // ─────────────────────────────────────────────────────────────────────

    /// Inserts a resource, returning the previous value of that type.
    pub fn insert_resource<R: Resource>(&mut self, value: R) -> Option<R> {
        self.resources.insert(value)
    }

    /// Returns the resource of type `R`.
    #[must_use]
    pub fn resource<R: Resource>(&self) -> Option<&R> {
        self.resources.get::<R>()
    }

    /// Returns the resource of type `R` mutably.
    pub fn resource_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.resources.get_mut::<R>()
    }

    /// Removes the resource of type `R`.
    pub fn remove_resource<R: Resource>(&mut self) -> Option<R> {
        self.resources.remove::<R>()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cores
    // ─────────────────────────────────────────────────────────────────────

    /// Registers a Core.
    ///
    /// The Core's filter is read once, [`Core::init`] runs, and then the Core
    /// is notified of every flushed entity that already matches.
    pub fn add_core<C: Core>(&mut self, core: C) -> Result<(), EcsError> {
        let mut core: Box<dyn Core> = Box::new(core);
        let name = core.name();
        let filter = core.filter();

        if let Err(source) = core.init(self) {
            log::error!("Core '{name}' failed to initialize: {source}");
            return Err(EcsError::CoreInit { core: name, source });
        }

        let index = self.cores.len();
        self.cores.push(CoreSlot {
            name,
            type_id: TypeId::of::<C>(),
            core: Some(core),
            filter,
            members: HashSet::new(),
        });

        let existing: Vec<EntityId> = self.get_entities(&self.cores[index].filter).collect();
        log::info!(
            "Registered core '{name}' at position {index} ({} existing matches).",
            existing.len()
        );
        for entity in existing {
            self.cores[index].members.insert(entity);
            self.with_core(index, |core, world| core.on_entity_added(world, entity));
        }
        Ok(())
    }

    /// Runs every Core's `update` in registration order.
    ///
    /// The first Core returning an error stops the pass. The failure is
    /// logged and returned as [`EcsError::CoreFailed`]; callers are expected
    /// to treat it as fatal.
    pub fn update_cores(&mut self, dt: f32) -> Result<(), EcsError> {
        for index in 0..self.cores.len() {
            self.update_core_at(index, dt)?;
        }
        Ok(())
    }

    /// Like [`update_cores`](Self::update_cores), skipping the Cores whose
    /// concrete type is listed in `skip`.
    pub fn update_cores_except(&mut self, dt: f32, skip: &[TypeId]) -> Result<(), EcsError> {
        for index in 0..self.cores.len() {
            if !skip.contains(&self.cores[index].type_id) {
                self.update_core_at(index, dt)?;
            }
        }
        Ok(())
    }

    /// Runs the `update` of the Core of type `C` only.
    pub fn update_core<C: Core>(&mut self, dt: f32) -> Result<(), EcsError> {
        match self.core_index::<C>() {
            Some(index) => self.update_core_at(index, dt),
            None => Ok(()),
        }
    }

    fn update_core_at(&mut self, index: usize, dt: f32) -> Result<(), EcsError> {
        let name = self.cores[index].name;
        match self.with_core(index, |core, world| core.update(world, dt)) {
            Some(Err(source)) => {
                log::error!("Core '{name}' failed during update: {source}");
                Err(EcsError::CoreFailed { core: name, source })
            }
            _ => Ok(()),
        }
    }

    /// Iterates over the registered Cores in registration order.
    pub fn get_all_cores(&self) -> impl Iterator<Item = &dyn Core> + '_ {
        self.cores.iter().filter_map(|slot| slot.core.as_deref())
    }

    /// Names of the registered Cores in registration order.
    #[must_use]
    pub fn core_names(&self) -> Vec<&'static str> {
        self.cores.iter().map(|slot| slot.name).collect()
    }

    /// Number of registered Cores.
    #[must_use]
    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    /// Returns the Core of type `C`, if registered and not currently running.
    #[must_use]
    pub fn get_core<C: Core>(&self) -> Option<&C> {
        self.cores
            .iter()
            .filter_map(|slot| slot.core.as_deref())
            .find_map(|core| core.as_any().downcast_ref::<C>())
    }

    /// Returns the Core of type `C` mutably.
    pub fn get_core_mut<C: Core>(&mut self) -> Option<&mut C> {
        self.cores
            .iter_mut()
            .filter_map(|slot| slot.core.as_deref_mut())
            .find_map(|core| core.as_any_mut().downcast_mut::<C>())
    }

    /// The entities the Core of type `C` currently tracks, sorted by id.
    ///
    /// Also available to `C` itself from inside its own callbacks.
    #[must_use]
    pub fn core_entities<C: Core>(&self) -> Vec<EntityId> {
        self.core_index::<C>()
            .map(|index| {
                let mut members: Vec<_> = self.cores[index].members.iter().copied().collect();
                members.sort_unstable();
                members
            })
            .unwrap_or_default()
    }

    fn core_index<C: Core>(&self) -> Option<usize> {
        self.cores
            .iter()
            .position(|slot| slot.type_id == TypeId::of::<C>())
    }

    /// Detaches the Core at `index`, runs `f` with it and the World, and
    /// reattaches it. Returns `None` if the Core is already running.
    fn with_core<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut dyn Core, &mut World) -> R,
    ) -> Option<R> {
        let Some(mut core) = self.cores[index].core.take() else {
            log::warn!(
                "Core '{}' re-entered from its own callback; call skipped.",
                self.cores[index].name
            );
            return None;
        };
        let result = f(core.as_mut(), self);
        self.cores[index].core = Some(core);
        Some(result)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Flush
    // ─────────────────────────────────────────────────────────────────────

    /// Applies every queued structural operation and notifies Cores of filter
    /// transitions, in registration order.
    ///
    /// Does nothing while no scene is loaded.
    pub fn simulate(&mut self) -> FlushStats {
        let mut stats = FlushStats::default();
        if self.state == WorldState::Unloaded {
            log::debug!("simulate() skipped: no scene loaded.");
            return stats;
        }

        while !self.pending.is_empty() {
            if stats.rounds == MAX_FLUSH_ROUNDS {
                log::warn!(
                    "Flush stopped after {MAX_FLUSH_ROUNDS} rounds; {} operations deferred to the next frame.",
                    self.pending.len()
                );
                break;
            }
            stats.rounds += 1;
            let ops = std::mem::take(&mut self.pending);
            self.flush(ops, &mut stats);
        }
        self.pending.append(&mut self.deferred);

        if stats.rounds > 0 {
            log::trace!("Flush: {stats:?}");
        }
        stats
    }

    fn flush(&mut self, ops: Vec<PendingOp>, stats: &mut FlushStats) {
        let mut touched = Vec::new();
        let mut seen = HashSet::new();
        let mut destroyed = HashSet::new();
        let mut removals: HashMap<EntityId, Vec<usize>> = HashMap::new();
        let mut blocked = HashSet::new();

        for op in &ops {
            let entity = op.entity();
            if !self.entities.is_live(entity) {
                continue;
            }
            match *op {
                PendingOp::Create(_) => {
                    if let Some(slot) = self.entities.get_mut(entity) {
                        if slot.state == SlotState::Pending {
                            slot.state = SlotState::Alive;
                            stats.created += 1;
                        }
                    }
                }
                PendingOp::Destroy(_) => {
                    destroyed.insert(entity);
                }
                PendingOp::RemoveComponent { index, .. } => {
                    removals.entry(entity).or_default().push(index);
                }
                PendingOp::Changed(_) => {}
            }
            if seen.insert(entity) {
                touched.push(entity);
            }
        }

        // Notify transitions while every component is still readable.
        for &entity in &touched {
            let final_types = if destroyed.contains(&entity) {
                None
            } else {
                let Some(slot) = self.entities.get(entity) else {
                    continue;
                };
                let mut types = slot.types.clone();
                for &index in removals.get(&entity).into_iter().flatten() {
                    types.remove(index);
                }
                Some(types)
            };

            for index in 0..self.cores.len() {
                let was = self.cores[index].members.contains(&entity);
                let now = final_types
                    .as_ref()
                    .is_some_and(|types| self.cores[index].filter.matches(types));
                if was == now {
                    continue;
                }
                if self.cores[index].core.is_none() {
                    // The Core is running; membership must not change behind its back.
                    blocked.insert(entity);
                    continue;
                }

                if was {
                    self.cores[index].members.remove(&entity);
                    self.with_core(index, |core, world| core.on_entity_removed(world, entity));
                    stats.removed += 1;
                } else {
                    self.cores[index].members.insert(entity);
                    self.with_core(index, |core, world| core.on_entity_added(world, entity));
                    stats.added += 1;
                }
            }
        }

        if !blocked.is_empty() {
            log::debug!(
                "{} entities wait for a running Core; their changes move to the next simulate().",
                blocked.len()
            );
            for op in &ops {
                if blocked.contains(&op.entity()) {
                    self.deferred.push(match *op {
                        PendingOp::Create(entity) => PendingOp::Changed(entity),
                        other => other,
                    });
                }
            }
            destroyed.retain(|entity| !blocked.contains(entity));
            removals.retain(|entity, _| !blocked.contains(entity));
        }

        let transform_index = component_index::<Transform>();

        for (entity, indices) in removals {
            if destroyed.contains(&entity) {
                continue;
            }
            for index in indices {
                if index == transform_index {
                    let orphans = self.unlink_transform(entity);
                    self.orphaned.extend(orphans);
                }
                if let Some(storage) = self.storages.get_mut(index).and_then(|s| s.as_mut()) {
                    storage.remove_erased(entity);
                }
                if let Some(slot) = self.entities.get_mut(entity) {
                    slot.types.remove(index);
                }
            }
        }

        for entity in destroyed {
            if !self.entities.is_live(entity) {
                continue;
            }
            let orphans = self.unlink_transform(entity);
            self.orphaned.extend(orphans);
            let Some(slot) = self.entities.get(entity) else {
                continue;
            };
            let types: Vec<usize> = slot.types.iter().collect();
            for index in types {
                if let Some(storage) = self.storages.get_mut(index).and_then(|s| s.as_mut()) {
                    storage.remove_erased(entity);
                }
            }
            // A Core may have tracked the entity without matching any more.
            for slot in &mut self.cores {
                slot.members.remove(&entity);
            }
            self.entities.release(entity);
            stats.destroyed += 1;
            log::trace!("Destroyed entity {entity}.");
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("state", &self.state)
            .field("scene", &self.anchor.scene_serial)
            .field("entities", &self.entities.live_count())
            .field("slots", &self.entities.capacity())
            .field("pending", &self.pending.len())
            .field("cores", &self.core_names())
            .finish()
    }
}

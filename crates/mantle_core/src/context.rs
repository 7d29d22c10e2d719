//! # ECS Context
//!
//! The single owner of every manager: id pools, object pools, the system
//! registry and the event channel. Build one per runtime (or per test) and
//! pass it where it is needed; dropping it tears everything down.

use std::sync::Arc;

use crate::config::MantleConfig;
use crate::ecs::{Component, ComponentHeader, Entity, EntityPool, SystemRegistry};
use crate::events::{EventChannel, EventHeader};
use crate::ids::{IdentifierPool, TypeTag};
use crate::memory::ObjectPool;

/// Container for all runtime state.
///
/// # Example
///
/// ```rust,ignore
/// let ctx = EcsContext::new();
///
/// let player = ctx.create_entity(PLAYER);
/// player.attach_component(HEALTH, Arc::new(Health::new(ctx.component_header(HEALTH))));
///
/// ctx.events().enqueue(event);
/// ctx.events().drain_queue();
/// ```
#[derive(Debug)]
pub struct EcsContext {
    component_ids: Arc<IdentifierPool>,
    entity_ids: Arc<IdentifierPool>,
    event_ids: Arc<IdentifierPool>,
    components: ObjectPool<dyn Component>,
    entities: EntityPool,
    systems: SystemRegistry,
    events: EventChannel,
}

impl EcsContext {
    /// Creates a context with unbounded pools.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&MantleConfig::default())
    }

    /// Creates a context with the caps from `config`.
    #[must_use]
    pub fn with_config(config: &MantleConfig) -> Self {
        tracing::debug!("creating ECS context with {:?}", config);
        Self {
            component_ids: Arc::new(IdentifierPool::new()),
            entity_ids: Arc::new(IdentifierPool::new()),
            event_ids: Arc::new(IdentifierPool::new()),
            components: ObjectPool::with_limit(config.pools.max_cached_per_tag),
            entities: EntityPool::with_limit(config.pools.max_cached_per_tag),
            systems: SystemRegistry::new(),
            events: EventChannel::with_cache_limit(config.events.max_cached_per_tag),
        }
    }

    /// Id pool shared by all components.
    #[inline]
    #[must_use]
    pub fn component_ids(&self) -> &Arc<IdentifierPool> {
        &self.component_ids
    }

    /// Id pool shared by all entities.
    #[inline]
    #[must_use]
    pub fn entity_ids(&self) -> &Arc<IdentifierPool> {
        &self.entity_ids
    }

    /// Id pool shared by all events.
    #[inline]
    #[must_use]
    pub fn event_ids(&self) -> &Arc<IdentifierPool> {
        &self.event_ids
    }

    /// Reuse pool for detached components.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &ObjectPool<dyn Component> {
        &self.components
    }

    /// Reuse pool for entities.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &EntityPool {
        &self.entities
    }

    /// Registered systems.
    #[inline]
    #[must_use]
    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// The event channel.
    #[inline]
    #[must_use]
    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    /// Creates an empty entity of kind `tag` with an id from this context.
    #[must_use]
    pub fn create_entity(&self, tag: TypeTag) -> Entity {
        Entity::new(&self.entity_ids, tag)
    }

    /// Creates a component header of kind `tag` with an id from this context.
    #[must_use]
    pub fn component_header(&self, tag: TypeTag) -> ComponentHeader {
        ComponentHeader::new(&self.component_ids, tag)
    }

    /// Creates an event header of kind `tag` with an id from this context.
    #[must_use]
    pub fn event_header(&self, tag: TypeTag, repeat: bool) -> EventHeader {
        EventHeader::new(&self.event_ids, tag, repeat)
    }

    /// Detaches every component of `entity` into the component pool, then
    /// puts the entity itself into the entity pool.
    pub fn recycle_entity(&self, entity: Arc<Entity>) {
        for (tag, component) in entity.detach_all() {
            component.header().clear_removal();
            self.components.put(tag, component);
        }
        self.entities.put(entity.type_tag(), entity);
    }
}

impl Default for EcsContext {
    fn default() -> Self {
        Self::new()
    }
}

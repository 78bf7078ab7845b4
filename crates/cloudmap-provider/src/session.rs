//! One command's worth of lifecycle work against the state database
//!
//! A [`Session`] pairs the namespace controller with the [`StateStore`]:
//! each method refreshes what the store tracks at an address, runs the
//! lifecycle step and persists the resulting [`ResourceState`]. Output is
//! left to the caller.

use crate::aws::servicediscovery::ServiceDiscoveryOperations;
use crate::resource::{
    HttpNamespaceResource, NamespaceConfig, Plan, ResourceState, plan, validate,
};
use crate::state::StateStore;
use anyhow::{Context, Result, bail};
use cloudmap_common::{IgnoreTagsConfig, KeyValueTags};
use tracing::{info, warn};

pub struct Session<'a, C> {
    store: StateStore,
    namespace: HttpNamespaceResource<'a, C>,
    ignore_tags: IgnoreTagsConfig,
}

impl<'a, C: ServiceDiscoveryOperations> Session<'a, C> {
    pub fn new(
        store: StateStore,
        namespace: HttpNamespaceResource<'a, C>,
        ignore_tags: IgnoreTagsConfig,
    ) -> Self {
        Self {
            store,
            namespace,
            ignore_tags,
        }
    }

    /// What the store holds at `address`; `Absent` when untracked
    pub fn tracked(&self, address: &str) -> Result<ResourceState> {
        Ok(self
            .store
            .get(address)?
            .map(|stored| stored.state)
            .unwrap_or(ResourceState::Absent))
    }

    fn require_tracked(&self, address: &str) -> Result<ResourceState> {
        let state = self.tracked(address)?;
        if state.is_absent() {
            bail!("No namespace is tracked at {address}");
        }
        Ok(state)
    }

    pub async fn create(&self, address: &str, config: &NamespaceConfig) -> Result<ResourceState> {
        if let Some(id) = self.tracked(address)?.id() {
            bail!("{address} already tracks namespace {id}; use `cloudmap apply` to change it");
        }
        self.provision(address, config).await
    }

    /// Create, persist the bare identity, then read the namespace back
    async fn provision(&self, address: &str, config: &NamespaceConfig) -> Result<ResourceState> {
        if let Err(violations) = validate(config) {
            let details: Vec<String> = violations.iter().map(ToString::to_string).collect();
            bail!("Invalid configuration for {address}: {}", details.join("; "));
        }

        let id = self.namespace.provision(config).await?;
        let unsynced = ResourceState::Unsynced { id };
        self.store.apply_state(address, &unsynced)?;

        let state = self.namespace.refresh(&unsynced).await?;
        self.store.apply_state(address, &state)?;
        Ok(state)
    }

    pub async fn read(&self, address: &str) -> Result<ResourceState> {
        let prior = self.require_tracked(address)?;
        let state = self.namespace.refresh(&prior).await?;
        if state.is_absent() {
            warn!(address = %address, "Namespace no longer exists, removed from state");
        }
        self.store.apply_state(address, &state)?;
        Ok(state)
    }

    pub async fn update(&self, address: &str, tags: &KeyValueTags) -> Result<ResourceState> {
        let prior = self.require_tracked(address)?;
        let current = self.namespace.refresh(&prior).await?;
        let Some(record) = current.record() else {
            self.store.apply_state(address, &current)?;
            bail!("Namespace tracked at {address} no longer exists");
        };

        let state = self.namespace.update(record, tags).await?;
        self.store.apply_state(address, &state)?;
        Ok(state)
    }

    pub async fn delete(&self, address: &str) -> Result<()> {
        let prior = self.require_tracked(address)?;
        if let Some(id) = prior.id() {
            self.namespace.delete(id).await?;
        }
        self.store.apply_state(address, &ResourceState::Absent)?;
        info!(address = %address, "Stopped tracking namespace");
        Ok(())
    }

    pub async fn import(&self, address: &str, id: &str) -> Result<ResourceState> {
        if let Some(existing) = self.tracked(address)?.id() {
            bail!("{address} already tracks namespace {existing}");
        }
        if let Some(other) = self.store.find_by_id(id)? {
            bail!("Namespace {id} is already tracked at {other}");
        }

        let state = self.namespace.import(id).await?;
        if state.is_absent() {
            bail!("Namespace {id} does not exist");
        }
        self.store.apply_state(address, &state)?;
        Ok(state)
    }

    pub async fn plan(&self, address: &str, config: &NamespaceConfig) -> Result<Plan> {
        let current = self.namespace.refresh(&self.tracked(address)?).await?;
        Ok(plan(current.record(), config, &self.ignore_tags))
    }

    pub async fn apply(&self, address: &str, config: &NamespaceConfig) -> Result<ResourceState> {
        let current = self.namespace.refresh(&self.tracked(address)?).await?;
        self.store.apply_state(address, &current)?;

        let plan = plan(current.record(), config, &self.ignore_tags);
        info!(address = %address, plan = %plan, "Applying");

        match (plan, current.record()) {
            (Plan::NoOp, _) => Ok(current.clone()),
            (Plan::Update { .. }, Some(record)) => {
                let state = self.namespace.update(record, &config.tags).await?;
                self.store.apply_state(address, &state)?;
                Ok(state)
            }
            (Plan::Replace { .. }, Some(record)) => {
                self.namespace
                    .delete(&record.id)
                    .await
                    .with_context(|| format!("Failed to replace {address}"))?;
                self.store.apply_state(address, &ResourceState::Absent)?;
                self.provision(address, config).await
            }
            _ => self.provision(address, config).await,
        }
    }
}

//! In-memory storage backend
//!
//! Same contract as the PostgreSQL backend. Each partition sits behind its
//! own mutex; a ticket is taken and its order inserted under one lock hold,
//! which is the in-process equivalent of the counter-row transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use shared::models::{
    Category, Lead, MenuItem, ModifierGroup, ModifierOption, Tenant, TenantCreate,
};
use shared::order::{OrderStatus, OrderView};
use shared::util::now_millis;
use uuid::Uuid;

use super::{
    CatalogRepository, CatalogSeed, LeadCreate, LeadRepository, NewOrder, OrderRepository,
    RepoError, RepoResult, TenantRepository, ensure_tenant_partition,
};
use crate::tenant::Partition;

#[derive(Default)]
struct PartitionData {
    categories: Vec<Category>,
    items: Vec<MenuItem>,
    orders: HashMap<Uuid, OrderView>,
    /// business day → last ticket issued
    tickets: HashMap<NaiveDate, i32>,
}

impl PartitionData {
    fn take_ticket(&mut self, day: NaiveDate) -> i32 {
        let last = self.tickets.entry(day).or_insert(0);
        *last += 1;
        *last
    }

    fn seed(&mut self, seed: &CatalogSeed) {
        for seed_category in &seed.categories {
            let category = Category {
                id: Uuid::new_v4(),
                name: seed_category.name.to_string(),
                rank: seed_category.rank,
            };
            for seed_item in &seed_category.items {
                let item_id = Uuid::new_v4();
                let modifier_groups = seed_item
                    .groups
                    .iter()
                    .map(|g| {
                        let group_id = Uuid::new_v4();
                        ModifierGroup {
                            id: group_id,
                            item_id,
                            name: g.name.to_string(),
                            min_selection: g.min_selection,
                            max_selection: g.max_selection,
                            options: g
                                .options
                                .iter()
                                .map(|o| ModifierOption {
                                    id: Uuid::new_v4(),
                                    group_id,
                                    name: o.name.to_string(),
                                    price_adjustment: o.price_adjustment,
                                })
                                .collect(),
                        }
                    })
                    .collect();
                self.items.push(MenuItem {
                    id: item_id,
                    category_id: Some(category.id),
                    name: seed_item.name.to_string(),
                    description: seed_item.description.map(str::to_string),
                    price: seed_item.price,
                    image_url: seed_item.image_url.map(str::to_string),
                    is_available: true,
                    modifier_groups,
                });
            }
            self.categories.push(category);
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tenants: RwLock<Vec<Tenant>>,
    leads: Mutex<Vec<Lead>>,
    partitions: DashMap<Partition, Arc<Mutex<PartitionData>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, partition: &Partition) -> RepoResult<Arc<Mutex<PartitionData>>> {
        ensure_tenant_partition(partition)?;
        self.partitions
            .get(partition)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RepoError::NotFound(format!("partition {partition}")))
    }
}

#[async_trait]
impl TenantRepository for MemoryStore {
    async fn find_by_domain(&self, domain: &str) -> RepoResult<Option<Tenant>> {
        Ok(self
            .tenants
            .read()
            .iter()
            .find(|t| t.domain.as_deref() == Some(domain))
            .cloned())
    }

    async fn find_by_partition(&self, partition: &Partition) -> RepoResult<Option<Tenant>> {
        Ok(self
            .tenants
            .read()
            .iter()
            .find(|t| t.schema_name == partition.as_str())
            .cloned())
    }

    async fn create(&self, data: TenantCreate) -> RepoResult<Tenant> {
        let mut tenants = self.tenants.write();
        if let Some(domain) = &data.domain
            && tenants.iter().any(|t| t.domain.as_ref() == Some(domain))
        {
            return Err(RepoError::Duplicate(format!("domain {domain}")));
        }
        if tenants.iter().any(|t| t.schema_name == data.schema_name) {
            return Err(RepoError::Duplicate(format!("schema {}", data.schema_name)));
        }
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: data.name,
            schema_name: data.schema_name,
            domain: data.domain,
            is_sandbox: data.is_sandbox,
            theme_config: data.theme_config,
            created_at: now_millis(),
        };
        tenants.push(tenant.clone());
        Ok(tenant)
    }

    async fn create_partition(&self, partition: &Partition) -> RepoResult<()> {
        ensure_tenant_partition(partition)?;
        self.partitions.entry(partition.clone()).or_default();
        Ok(())
    }

    async fn reset_partition(&self, partition: &Partition, seed: &CatalogSeed) -> RepoResult<u64> {
        let data = self.partition(partition)?;
        let mut data = data.lock();
        let removed = data.orders.len() as u64;
        data.orders.clear();
        data.tickets.clear();
        data.items.clear();
        data.categories.clear();
        data.seed(seed);
        Ok(removed)
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_categories(&self, partition: &Partition) -> RepoResult<Vec<Category>> {
        let data = self.partition(partition)?;
        let mut categories = data.lock().categories.clone();
        categories.sort_by_key(|c| c.rank);
        Ok(categories)
    }

    async fn list_items(
        &self,
        partition: &Partition,
        only_available: bool,
    ) -> RepoResult<Vec<MenuItem>> {
        let data = self.partition(partition)?;
        let data = data.lock();
        Ok(data
            .items
            .iter()
            .filter(|i| !only_available || i.is_available)
            .cloned()
            .collect())
    }

    async fn find_items(&self, partition: &Partition, ids: &[Uuid]) -> RepoResult<Vec<MenuItem>> {
        let data = self.partition(partition)?;
        let data = data.lock();
        Ok(data
            .items
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn insert_seed(&self, partition: &Partition, seed: &CatalogSeed) -> RepoResult<()> {
        let data = self.partition(partition)?;
        data.lock().seed(seed);
        Ok(())
    }
}

impl MemoryStore {
    /// Replace an item in place (catalog edits in tests)
    #[cfg(test)]
    pub fn put_item(&self, partition: &Partition, item: MenuItem) -> RepoResult<()> {
        let data = self.partition(partition)?;
        let mut data = data.lock();
        match data.items.iter().position(|i| i.id == item.id) {
            Some(pos) => data.items[pos] = item,
            None => data.items.push(item),
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert_with_ticket(
        &self,
        partition: &Partition,
        order: NewOrder,
    ) -> RepoResult<OrderView> {
        let data = self.partition(partition)?;
        let mut data = data.lock();
        if data.orders.contains_key(&order.id) {
            return Err(RepoError::Duplicate(format!("order {}", order.id)));
        }
        let ticket_number = data.take_ticket(order.business_day);
        let view = OrderView {
            id: order.id,
            ticket_number,
            customer_name: order.customer_name,
            table_number: order.table_number,
            status: OrderStatus::Pending,
            total_amount: order.total_amount,
            items: order.items,
            business_day: order.business_day,
            created_at: order.created_at,
            updated_at: order.created_at,
        };
        data.orders.insert(view.id, view.clone());
        Ok(view)
    }

    async fn find(&self, partition: &Partition, id: Uuid) -> RepoResult<Option<OrderView>> {
        let data = self.partition(partition)?;
        let found = data.lock().orders.get(&id).cloned();
        Ok(found)
    }

    async fn list_active(&self, partition: &Partition) -> RepoResult<Vec<OrderView>> {
        let data = self.partition(partition)?;
        let mut active: Vec<OrderView> = data
            .lock()
            .orders
            .values()
            .filter(|o| o.status.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|o| (o.created_at, o.ticket_number));
        Ok(active)
    }

    async fn compare_and_set_status(
        &self,
        partition: &Partition,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<Option<OrderView>> {
        let data = self.partition(partition)?;
        let mut data = data.lock();
        let order = data
            .orders
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("order {id}")))?;
        if order.status != expected {
            return Ok(None);
        }
        order.status = next;
        order.updated_at = now_millis();
        Ok(Some(order.clone()))
    }
}

#[async_trait]
impl LeadRepository for MemoryStore {
    async fn record(&self, lead: LeadCreate) -> RepoResult<Lead> {
        let lead = Lead {
            id: Uuid::new_v4(),
            name: lead.name,
            email: lead.email,
            business_name: lead.business_name,
            schema_name: lead.partition.to_string(),
            created_at: now_millis(),
        };
        self.leads.lock().push(lead.clone());
        Ok(lead)
    }
}

//! Catalog Manager: owns equipment-type records.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use equipstock_catalog::{EquipmentStatus, EquipmentType, NewEquipmentType};
use equipstock_core::EquipmentTypeId;

use crate::error::{LedgerError, LedgerResult};
use crate::store::EquipmentRepository;

/// Input for `CatalogManager::create_equipment_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEquipmentType {
    pub name: String,
    pub description: String,
    pub status: EquipmentStatus,
    pub useful_life_years: Option<u16>,
}

#[derive(Clone)]
pub struct CatalogManager {
    repo: Arc<dyn EquipmentRepository>,
}

impl CatalogManager {
    pub fn new(repo: Arc<dyn EquipmentRepository>) -> Self {
        Self { repo }
    }

    /// Create a catalog entry acquired today.
    #[instrument(skip(self, cmd), fields(name = %cmd.name, status = %cmd.status), err)]
    pub async fn create_equipment_type(&self, cmd: CreateEquipmentType) -> LedgerResult<EquipmentType> {
        let new = NewEquipmentType::new(
            cmd.name,
            cmd.description,
            cmd.status,
            Utc::now().date_naive(),
            cmd.useful_life_years,
        )?;

        let created = self.repo.insert(new).await?;
        info!(equipment_id = %created.id, "equipment type created");
        Ok(created)
    }

    pub async fn list_equipment_types(&self) -> LedgerResult<Vec<EquipmentType>> {
        Ok(self.repo.list().await?)
    }

    /// The record, `NotFound` if absent, `Store` on a storage fault.
    pub async fn get_equipment_type(&self, id: EquipmentTypeId) -> LedgerResult<EquipmentType> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("equipment type {id} not found")))
    }

    /// Records matching any of `ids`. Unknown ids are skipped and an empty
    /// input never reaches the store.
    pub async fn get_equipment_types_by_ids(
        &self,
        ids: &[EquipmentTypeId],
    ) -> LedgerResult<Vec<EquipmentType>> {
        let unique: Vec<EquipmentTypeId> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if unique.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.repo.find_many(&unique).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn manager() -> CatalogManager {
        CatalogManager::new(Arc::new(InMemoryStore::new()))
    }

    fn cmd(name: &str, status: EquipmentStatus) -> CreateEquipmentType {
        CreateEquipmentType {
            name: name.to_string(),
            description: format!("{name} description"),
            status,
            useful_life_years: None,
        }
    }

    #[tokio::test]
    async fn create_sets_acquisition_date_to_today() {
        let catalog = manager();
        let before = Utc::now().date_naive();
        let created = catalog
            .create_equipment_type(cmd("Ventilator", EquipmentStatus::Operational))
            .await
            .unwrap();
        let after = Utc::now().date_naive();

        assert!(created.acquired_on >= before && created.acquired_on <= after);
        assert_eq!(created.name, "Ventilator");
        assert_eq!(created.status, EquipmentStatus::Operational);
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let err = manager()
            .create_equipment_type(cmd("  ", EquipmentStatus::Operational))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn get_distinguishes_not_found() {
        let catalog = manager();
        let created = catalog
            .create_equipment_type(cmd("Monitor", EquipmentStatus::Retired))
            .await
            .unwrap();

        assert_eq!(catalog.get_equipment_type(created.id).await.unwrap(), created);
        assert!(matches!(
            catalog.get_equipment_type(EquipmentTypeId::new(404)).await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_returns_everything() {
        let catalog = manager();
        for name in ["A", "B", "C"] {
            catalog
                .create_equipment_type(cmd(name, EquipmentStatus::Operational))
                .await
                .unwrap();
        }
        assert_eq!(catalog.list_equipment_types().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn by_ids_handles_empty_partial_and_duplicate_input() {
        let catalog = manager();
        let a = catalog
            .create_equipment_type(cmd("A", EquipmentStatus::Operational))
            .await
            .unwrap();
        let b = catalog
            .create_equipment_type(cmd("B", EquipmentStatus::Operational))
            .await
            .unwrap();

        assert!(catalog.get_equipment_types_by_ids(&[]).await.unwrap().is_empty());

        let partial = catalog
            .get_equipment_types_by_ids(&[b.id, EquipmentTypeId::new(99)])
            .await
            .unwrap();
        assert_eq!(partial, vec![b.clone()]);

        let dupes = catalog
            .get_equipment_types_by_ids(&[a.id, a.id, b.id])
            .await
            .unwrap();
        assert_eq!(dupes.len(), 2);
    }
}

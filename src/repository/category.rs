use async_trait::async_trait;

use crate::domain::category::{Category, NewCategory};
use crate::domain::types::CategoryId;
use crate::models::category::Category as StoredCategory;
use crate::repository::{
    CATEGORIES, CategoryReader, CategoryWriter, RepositoryError, RepositoryResult,
    StoreRepository, decode, decode_all,
};

#[async_trait]
impl CategoryReader for StoreRepository {
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let path = Self::collection(CATEGORIES)?;
        let children = self.store().children(&path).await?;
        Ok(decode_all(CATEGORIES, children, StoredCategory::into_domain))
    }

    async fn get_category_by_id(&self, id: &CategoryId) -> RepositoryResult<Option<Category>> {
        let path = Self::record(CATEGORIES, id.as_str())?;
        match self.store().get(&path).await? {
            Some(value) => decode(id.as_str(), value, StoredCategory::into_domain).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CategoryWriter for StoreRepository {
    async fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        let path = Self::collection(CATEGORIES)?;
        let document = serde_json::to_value(StoredCategory::from(category.clone()))
            .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;

        let key = self.store().push(&path, document).await?;
        let id = CategoryId::new(key)?;

        Ok(category.clone().with_id(id))
    }

    async fn update_category(&self, category: &Category) -> RepositoryResult<()> {
        let path = Self::record(CATEGORIES, category.id.as_str())?;
        let document = serde_json::to_value(StoredCategory::from(category.clone()))
            .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;

        self.store().set(&path, document).await?;
        Ok(())
    }
}

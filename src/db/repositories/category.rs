use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::StoreError;
use crate::entities::prelude::*;
use crate::entities::{categories, course_categories};

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<categories::Model>, StoreError> {
        let rows = Categories::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: Uuid) -> Result<categories::Model, StoreError> {
        Categories::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("Category with ID {id} not found")))
    }

    /// Category names are unique by exact match; no trimming or case folding.
    pub async fn create(&self, name: &str) -> Result<categories::Model, StoreError> {
        let taken = Categories::find()
            .filter(categories::Column::Name.eq(name))
            .count(&self.conn)
            .await?;
        if taken > 0 {
            return Err(StoreError::conflict(format!(
                "Category '{name}' already exists"
            )));
        }

        let model = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
        };
        let inserted = model.insert(&self.conn).await?;
        Ok(inserted)
    }

    pub async fn update(&self, id: Uuid, name: &str) -> Result<categories::Model, StoreError> {
        let category = self.get(id).await?;

        // Renaming a category to its current name is a no-op, not a conflict
        let taken = Categories::find()
            .filter(categories::Column::Name.eq(name))
            .filter(categories::Column::Id.ne(id))
            .count(&self.conn)
            .await?;
        if taken > 0 {
            return Err(StoreError::conflict(format!(
                "Category '{name}' already exists"
            )));
        }

        let mut active: categories::ActiveModel = category.into();
        active.name = Set(name.to_string());
        let updated = active.update(&self.conn).await?;
        Ok(updated)
    }

    /// Deleting a category detaches it from every course that carries it.
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let category = self.get(id).await?;

        let txn = self.conn.begin().await?;

        CourseCategories::delete_many()
            .filter(course_categories::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;

        let active: categories::ActiveModel = category.into();
        active.delete(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

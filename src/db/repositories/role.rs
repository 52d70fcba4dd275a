use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::StoreError;
use crate::entities::prelude::*;
use crate::entities::{roles, users};

pub struct RoleRepository {
    conn: DatabaseConnection,
}

impl RoleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<roles::Model>, StoreError> {
        let rows = Roles::find()
            .order_by_asc(roles::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<roles::Model, StoreError> {
        Roles::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("Role with ID {id} not found")))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<roles::Model>, StoreError> {
        let role = Roles::find()
            .filter(roles::Column::Name.eq(name))
            .one(&self.conn)
            .await?;
        Ok(role)
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<String>,
    ) -> Result<roles::Model, StoreError> {
        if self.get_by_name(name).await?.is_some() {
            return Err(StoreError::conflict(format!(
                "Role '{name}' already exists"
            )));
        }

        let model = roles::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        let inserted = model.insert(&self.conn).await?;
        Ok(inserted)
    }

    pub async fn update(
        &self,
        id: i32,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<roles::Model, StoreError> {
        let role = self.get(id).await?;

        if let Some(new_name) = &name {
            let taken = Roles::find()
                .filter(roles::Column::Name.eq(new_name.as_str()))
                .filter(roles::Column::Id.ne(id))
                .count(&self.conn)
                .await?;
            if taken > 0 {
                return Err(StoreError::conflict(format!(
                    "Role '{new_name}' already exists"
                )));
            }
        }

        let mut active: roles::ActiveModel = role.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(Some(description));
        }
        let updated = active.update(&self.conn).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let role = self.get(id).await?;

        let referenced = Users::find()
            .filter(users::Column::RoleId.eq(id))
            .count(&self.conn)
            .await?;
        if referenced > 0 {
            return Err(StoreError::conflict(
                "Cannot delete a role that is assigned to users",
            ));
        }

        let active: roles::ActiveModel = role.into();
        active.delete(&self.conn).await?;
        Ok(())
    }
}

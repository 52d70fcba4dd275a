use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Exact-match unique (case-sensitive).
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        super::course_categories::Relation::Course.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::course_categories::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,

    pub description: Option<String>,

    /// Non-negative, defaults to 0.
    pub price: f64,

    pub image_url: Option<String>,

    /// Set once at creation; never reassigned through the API.
    pub instructor_id: Uuid,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::InstructorId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Instructor,
    #[sea_orm(has_many = "super::lessons::Entity")]
    Lessons,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl Related<super::lessons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lessons.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        super::course_categories::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::course_categories::Relation::Course.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

/// A user's occupation of a spot. Open while `leaving_timestamp` is null.
/// `spot_id` becomes null when the spot's lot is deleted; the row itself is
/// never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub spot_id: Option<i32>,
    pub user_id: i32,
    pub parking_timestamp: chrono::DateTime<chrono::Utc>,
    pub leaving_timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub parking_cost_per_unit_time: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parking_spots::Entity",
        from = "Column::SpotId",
        to = "super::parking_spots::Column::Id"
    )]
    ParkingSpot,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::parking_spots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingSpot.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

/// One allocatable spot. `status` is `"A"` (available) or `"O"` (occupied).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "parking_spots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub lot_id: i32,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parking_lots::Entity",
        from = "Column::LotId",
        to = "super::parking_lots::Column::Id"
    )]
    ParkingLot,
    #[sea_orm(has_many = "super::reservations::Entity")]
    Reservations,
}

impl Related<super::parking_lots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingLot.def()
    }
}

impl Related<super::reservations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

/// A parking facility. `price` is charged per hour parked.
/// `maximum_number_of_spots` is fixed at creation and equals the number of
/// owned `parking_spots` rows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "parking_lots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub prime_location_name: String,
    pub price: f64,
    pub address: String,
    pub pin_code: i64,
    pub maximum_number_of_spots: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::parking_spots::Entity")]
    ParkingSpots,
}

impl Related<super::parking_spots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingSpots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

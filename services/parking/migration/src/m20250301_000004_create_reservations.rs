use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::SpotId).integer().null())
                    .col(ColumnDef::new(Reservations::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Reservations::ParkingTimestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Reservations::LeavingTimestamp)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::ParkingCostPerUnitTime)
                            .double()
                            .not_null(),
                    )
                    // History outlives the lot: deleting spots detaches, never deletes.
                    .foreign_key(
                        ForeignKey::create()
                            .from(Reservations::Table, Reservations::SpotId)
                            .to(ParkingSpots::Table, ParkingSpots::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Reservations::Table, Reservations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Reservations::Table)
                    .col(Reservations::UserId)
                    .col((Reservations::ParkingTimestamp, IndexOrder::Desc))
                    .name("idx_reservations_user_id_parking_timestamp")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Reservations::Table)
                    .col(Reservations::SpotId)
                    .name("idx_reservations_spot_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Reservations {
    Table,
    Id,
    SpotId,
    UserId,
    ParkingTimestamp,
    LeavingTimestamp,
    ParkingCostPerUnitTime,
}

#[derive(Iden)]
enum ParkingSpots {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

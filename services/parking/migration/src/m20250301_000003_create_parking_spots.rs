use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingSpots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingSpots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ParkingSpots::LotId).integer().not_null())
                    .col(
                        ColumnDef::new(ParkingSpots::Status)
                            .string_len(1)
                            .not_null()
                            .default("A"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ParkingSpots::Table, ParkingSpots::LotId)
                            .to(ParkingLots::Table, ParkingLots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Allocation scans a lot's available spots in id order.
        manager
            .create_index(
                Index::create()
                    .table(ParkingSpots::Table)
                    .col(ParkingSpots::LotId)
                    .col(ParkingSpots::Status)
                    .name("idx_parking_spots_lot_id_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSpots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ParkingSpots {
    Table,
    Id,
    LotId,
    Status,
}

#[derive(Iden)]
enum ParkingLots {
    Table,
    Id,
}

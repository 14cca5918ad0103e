use chrono::{DateTime, Utc};

use parklot_domain::cost::{hours_between, parking_cost};
use parklot_domain::spot::SpotStatus;
use parklot_domain::user::UserRole;

use crate::error::ParkingServiceError;

/// Upper bound on the spot pool created with a lot.
pub const MAX_SPOTS_PER_LOT: u32 = 10_000;

/// Login account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub role: UserRole,
}

/// A parking facility.
#[derive(Debug, Clone, PartialEq)]
pub struct Lot {
    pub id: i32,
    pub prime_location_name: String,
    /// Price per hour parked.
    pub price: f64,
    pub address: String,
    pub pin_code: i64,
    pub maximum_number_of_spots: i32,
}

/// A lot together with the current state of its spot pool.
#[derive(Debug, Clone, PartialEq)]
pub struct LotSummary {
    pub lot: Lot,
    pub available_spots: u32,
    pub occupied_spots: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spot {
    pub id: i32,
    pub lot_id: i32,
    pub status: SpotStatus,
}

/// A user's occupation of a spot, open until `leaving_timestamp` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: i32,
    /// `None` once the spot's lot has been deleted.
    pub spot_id: Option<i32>,
    pub user_id: i32,
    pub parking_timestamp: DateTime<Utc>,
    pub leaving_timestamp: Option<DateTime<Utc>>,
    /// Lot price captured when the spot was claimed.
    pub parking_cost_per_unit_time: f64,
}

impl Reservation {
    pub fn is_open(&self) -> bool {
        self.leaving_timestamp.is_none()
    }

    /// Hours parked so far, or in total once released.
    pub fn duration_hours(&self, now: DateTime<Utc>) -> f64 {
        hours_between(self.parking_timestamp, self.leaving_timestamp.unwrap_or(now))
    }

    /// Running cost for open reservations, final cost for released ones.
    pub fn cost(&self, now: DateTime<Utc>) -> f64 {
        parking_cost(
            self.parking_timestamp,
            self.leaving_timestamp.unwrap_or(now),
            self.parking_cost_per_unit_time,
        )
    }
}

/// Insert payload for a reservation created by a spot claim.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub spot_id: i32,
    pub user_id: i32,
    pub parking_timestamp: DateTime<Utc>,
    pub parking_cost_per_unit_time: f64,
}

/// Reservation joined with the lot its spot belongs to, if the lot still exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationDetail {
    pub reservation: Reservation,
    pub lot_id: Option<i32>,
    pub lot_name: Option<String>,
}

/// Outcome of a conditional lot deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotDeletion {
    Deleted,
    NotFound,
    Occupied,
}

/// Validated lot metadata, shared by create and edit.
#[derive(Debug, Clone, PartialEq)]
pub struct LotDraft {
    pub prime_location_name: String,
    pub price: f64,
    pub address: String,
    pub pin_code: i64,
}

impl LotDraft {
    /// Validate raw form values.
    pub fn parse(
        prime_location_name: &str,
        price: &str,
        address: &str,
        pin_code: &str,
    ) -> Result<Self, ParkingServiceError> {
        let prime_location_name = required(prime_location_name)?;
        let address = required(address)?;

        let price = required(price)?
            .parse::<f64>()
            .map_err(|_| ParkingServiceError::InvalidPrice)?;
        if !price.is_finite() || price < 0.0 {
            return Err(ParkingServiceError::InvalidPrice);
        }

        let pin_code = required(pin_code)?
            .parse::<i64>()
            .map_err(|_| ParkingServiceError::InvalidPinCode)?;

        Ok(Self {
            prime_location_name,
            price,
            address,
            pin_code,
        })
    }
}

/// Parse the size of a new lot's spot pool.
pub fn parse_spot_count(raw: &str) -> Result<u32, ParkingServiceError> {
    let count = required(raw)?
        .parse::<u32>()
        .map_err(|_| ParkingServiceError::InvalidSpotCount)?;
    if count > MAX_SPOTS_PER_LOT {
        return Err(ParkingServiceError::InvalidSpotCount);
    }
    Ok(count)
}

fn required(raw: &str) -> Result<String, ParkingServiceError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ParkingServiceError::MissingData);
    }
    Ok(value.to_owned())
}

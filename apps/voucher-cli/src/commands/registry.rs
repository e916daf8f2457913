//! # Registry Commands
//!
//! Restaurants and airlines a voucher may reference. Anyone can list them;
//! only administrators can add to them.

use serde::Serialize;
use std::fmt;
use tracing::info;

use crate::error::ApiError;
use crate::state::DbState;
use voucher_core::validation::{validate_airline_code, validate_name};
use voucher_core::{Capability, Session};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantListResponse {
    pub restaurants: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirlineEntry {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirlineListResponse {
    pub airlines: Vec<AirlineEntry>,
}

pub async fn list_restaurants(
    db: &DbState,
    session: &Session,
) -> Result<RestaurantListResponse, ApiError> {
    session.require(Capability::ManageVouchers)?;

    let registry = db.inner().registries().restaurants().await?;
    Ok(RestaurantListResponse {
        restaurants: registry.names().to_vec(),
    })
}

pub async fn add_restaurant(
    db: &DbState,
    session: &Session,
    name: &str,
) -> Result<RestaurantListResponse, ApiError> {
    session.require(Capability::ManageRegistries)?;
    let name = validate_name("restaurant", name)?;

    db.inner().registries().add_restaurant(&name).await?;
    info!(restaurant = %name, by = %session.username, "Restaurant registered");

    list_restaurants(db, session).await
}

pub async fn list_airlines(
    db: &DbState,
    session: &Session,
) -> Result<AirlineListResponse, ApiError> {
    session.require(Capability::ManageVouchers)?;

    let registry = db.inner().registries().airlines().await?;
    Ok(AirlineListResponse {
        airlines: registry
            .iter()
            .map(|(name, code)| AirlineEntry {
                name: name.to_string(),
                code: code.to_string(),
            })
            .collect(),
    })
}

/// Registers an airline with its three-character invoice code.
pub async fn add_airline(
    db: &DbState,
    session: &Session,
    name: &str,
    code: &str,
) -> Result<AirlineListResponse, ApiError> {
    session.require(Capability::ManageRegistries)?;
    let name = validate_name("airline", name)?;
    let code = validate_airline_code(code)?;

    db.inner().registries().add_airline(&name, &code).await?;
    info!(airline = %name, code = %code, by = %session.username, "Airline registered");

    list_airlines(db, session).await
}

impl fmt::Display for RestaurantListResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<&str> = self.restaurants.iter().map(String::as_str).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl fmt::Display for AirlineListResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .airlines
            .iter()
            .map(|a| format!("{}  {}", a.code, a.name))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::TestApp;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_lists_seeded_registries() {
        let app = TestApp::new().await;

        let restaurants = list_restaurants(&app.db, &app.clerk).await.unwrap();
        assert_eq!(
            restaurants.restaurants,
            vec!["Subway", "Paramount", "Pretzels", "LFD Bagel"]
        );

        let airlines = list_airlines(&app.db, &app.clerk).await.unwrap();
        let codes: Vec<&str> = airlines.airlines.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["ACD", "AFR", "BAW"]);
    }

    #[tokio::test]
    async fn test_admin_adds_airline_with_uppercased_code() {
        let app = TestApp::new().await;

        let resp = add_airline(&app.db, &app.admin, "WestJet", "wja").await.unwrap();
        let westjet = resp.airlines.iter().find(|a| a.name == "WestJet").unwrap();
        assert_eq!(westjet.code, "WJA");

        let err = add_airline(&app.db, &app.admin, "WestJet", "WJB").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Duplicate);

        let err = add_airline(&app.db, &app.admin, "Porter", "PO").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_user_role_cannot_change_registries() {
        let app = TestApp::new().await;

        let err = add_restaurant(&app.db, &app.clerk, "Tim Hortons").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let resp = add_restaurant(&app.db, &app.admin, "Tim Hortons").await.unwrap();
        assert_eq!(resp.restaurants.last().map(String::as_str), Some("Tim Hortons"));
    }
}

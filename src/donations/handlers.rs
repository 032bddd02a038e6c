use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    donations::{
        dto::{
            CreateDonationRequest, CreateDonationResponse, DashboardDonation, DashboardItem,
            DonationFailure,
        },
        repo::{Donation, DonationError},
        repo_types::{ItemUnit, NewDonationItem},
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/donations", get(list_donations))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/donations", post(create_donation))
}

fn reject(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<DonationFailure>) {
    (
        status,
        Json(DonationFailure {
            success: false,
            message: message.into(),
        }),
    )
}

#[instrument(skip(state, payload))]
pub async fn create_donation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateDonationRequest>,
) -> Result<(StatusCode, Json<CreateDonationResponse>), (StatusCode, Json<DonationFailure>)> {
    let mut items = Vec::with_capacity(payload.items.len());
    for item in payload.items {
        let Some(unit) = ItemUnit::parse(&item.unit) else {
            warn!(unit = %item.unit, "unknown unit");
            return Err(reject(
                StatusCode::BAD_REQUEST,
                format!("Unknown unit: {}", item.unit),
            ));
        };
        items.push(NewDonationItem {
            item_name: item.item_name,
            quantity: item.quantity,
            unit,
        });
    }

    let record = match Donation::create(&state.db, user_id, &items).await {
        Ok(r) => r,
        Err(DonationError::EmptyItemList) => {
            warn!(%user_id, "donation without items");
            return Err(reject(
                StatusCode::BAD_REQUEST,
                "Add at least one item to the donation",
            ));
        }
        Err(DonationError::InvalidItem(msg)) => {
            warn!(%user_id, %msg, "invalid donation item");
            return Err(reject(StatusCode::BAD_REQUEST, msg));
        }
        Err(DonationError::Storage(e)) => {
            error!(error = %e, %user_id, "create donation failed");
            return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    info!(
        donation_id = %record.donation.id,
        %user_id,
        items = record.items.len(),
        "donation recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateDonationResponse {
            success: true,
            redirect: "/dashboard".into(),
        }),
    ))
}

/// The dashboard feed. Authentication gates access to the feature, but the
/// listing itself covers every user's donations.
#[instrument(skip(state))]
pub async fn list_donations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<DashboardDonation>>, (StatusCode, String)> {
    let donations = Donation::list_all(&state.db).await.map_err(|e| {
        error!(error = %e, "list donations failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let out = donations
        .into_iter()
        .map(|d| DashboardDonation {
            id: d.id,
            username: d.username,
            status: d.status,
            created_at: d.created_at,
            items: d
                .items
                .into_iter()
                .map(|i| DashboardItem {
                    id: i.id,
                    item_name: i.item_name,
                    quantity: i.quantity,
                    unit: i.unit,
                })
                .collect(),
        })
        .collect();

    Ok(Json(out))
}

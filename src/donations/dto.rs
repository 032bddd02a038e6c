use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// One line of the create-donation request body.
#[derive(Debug, Deserialize)]
pub struct CreateDonationItem {
    pub item_name: String,
    pub quantity: f64,
    pub unit: String,
}

/// Request body for recording a donation.
#[derive(Debug, Deserialize)]
pub struct CreateDonationRequest {
    pub items: Vec<CreateDonationItem>,
}

/// Success response: the client is told where to go next.
#[derive(Debug, Serialize)]
pub struct CreateDonationResponse {
    pub success: bool,
    pub redirect: String,
}

/// Validation-failure response body.
#[derive(Debug, Serialize)]
pub struct DonationFailure {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardItem {
    pub id: Uuid,
    pub item_name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardDonation {
    pub id: Uuid,
    pub username: String,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub items: Vec<DashboardItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_deserializes_wire_shape() {
        let body = r#"{
            "items": [
                {"item_name": "Rice", "quantity": 5, "unit": "kilogram"},
                {"item_name": "Water", "quantity": 12, "unit": "bottle"}
            ]
        }"#;
        let req: CreateDonationRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.items.len(), 2);
        assert_eq!(req.items[0].item_name, "Rice");
        assert_eq!(req.items[1].unit, "bottle");
    }

    #[test]
    fn success_response_carries_redirect() {
        let res = CreateDonationResponse {
            success: true,
            redirect: "/dashboard".into(),
        };
        let json = serde_json::to_string(&res).unwrap();
        assert!(json.contains(r#""success":true"#));
        assert!(json.contains(r#""redirect":"/dashboard""#));
    }

    #[test]
    fn failure_response_carries_message() {
        let res = DonationFailure {
            success: false,
            message: "quantity must be greater than zero".into(),
        };
        let json = serde_json::to_string(&res).unwrap();
        assert!(json.contains(r#""success":false"#));
        assert!(json.contains("greater than zero"));
    }
}

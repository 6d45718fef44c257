use crate::api::models::{LocationSubmission, SubmissionReceipt};
use crate::api::{ApiError, LaundryApi};
use crate::geo::models::GeoPoint;
use crate::maps::models::PointOfInterest;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory stand-in for the REST API.
#[derive(Default)]
pub struct FakeLaundryApi {
    pub shops: Mutex<Vec<PointOfInterest>>,
    pub addresses: Mutex<Vec<PointOfInterest>>,
    pub tracking: Mutex<Vec<PointOfInterest>>,
    pub submissions: Mutex<Vec<LocationSubmission>>,
    pub unreachable: AtomicBool,
}

impl FakeLaundryApi {
    pub fn with_shops(shops: Vec<PointOfInterest>) -> Self {
        Self {
            shops: Mutex::new(shops),
            ..Self::default()
        }
    }

    fn check_reachable(&self) -> Result<(), ApiError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ApiError::Network(String::from("connection refused")));
        }
        Ok(())
    }
}

pub fn sample_shops() -> Vec<PointOfInterest> {
    vec![
        PointOfInterest::new(
            "s1",
            "Sukhumvit Wash & Fold",
            GeoPoint::from_lng_lat([100.50, 13.75]).ok(),
        ),
        PointOfInterest::new("s2", "Silom Laundry (moving)", None),
    ]
}

#[async_trait]
impl LaundryApi for FakeLaundryApi {
    async fn shops(&self) -> Result<Vec<PointOfInterest>, ApiError> {
        self.check_reachable()?;
        Ok(self.shops.lock().unwrap().clone())
    }

    async fn saved_addresses(&self, _user_id: &str) -> Result<Vec<PointOfInterest>, ApiError> {
        self.check_reachable()?;
        Ok(self.addresses.lock().unwrap().clone())
    }

    async fn order_tracking(&self, _order_id: &str) -> Result<Vec<PointOfInterest>, ApiError> {
        self.check_reachable()?;
        Ok(self.tracking.lock().unwrap().clone())
    }

    async fn submit_location(
        &self,
        submission: &LocationSubmission,
    ) -> Result<SubmissionReceipt, ApiError> {
        self.check_reachable()?;
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(submission.clone());
        Ok(SubmissionReceipt {
            id: Some(format!("receipt-{}", submissions.len())),
        })
    }
}

//! # Customer Service
//!
//! Customer records. Visit counts, spending and the visit log are updated
//! by sales through the rollup in `salon-db`, never edited here. Sales are
//! matched to customers by phone, so changing a customer's phone moves
//! every later rollup to the new number.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::non_blank;
use crate::error::{ApiError, ApiResult};
use salon_core::validation;
use salon_core::{Customer, ValidationError};
use salon_db::repository::new_id;
use salon_db::{CustomerDetails, Database, DbError};

/// Input for creating a customer or editing one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub vip: bool,
}

impl NewCustomer {
    fn validate(&self) -> ApiResult<CustomerDetails> {
        let name = validation::validate_required("name", &self.name)?;
        let phone = validation::validate_phone(&self.phone)?;
        let email = non_blank(self.email.as_deref());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(ValidationError::InvalidFormat {
                    field: "email".to_string(),
                    reason: "must contain '@'".to_string(),
                }
                .into());
            }
        }

        Ok(CustomerDetails {
            name,
            email,
            phone,
            vip: self.vip,
        })
    }
}

fn phone_conflict(err: DbError) -> ApiError {
    match err {
        DbError::UniqueViolation { value, .. } => {
            ApiError::validation(format!("A customer with phone {} already exists", value))
        }
        other => other.into(),
    }
}

#[derive(Debug, Clone)]
pub struct CustomerService {
    db: Database,
}

impl CustomerService {
    pub fn new(db: Database) -> Self {
        CustomerService { db }
    }

    pub async fn get(&self, id: &str) -> ApiResult<Customer> {
        self.db
            .customers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer", id))
    }

    /// Exact match on the phone as stored.
    pub async fn find_by_phone(&self, phone: &str) -> ApiResult<Option<Customer>> {
        Ok(self.db.customers().find_by_phone(phone.trim()).await?)
    }

    pub async fn list(&self) -> ApiResult<Vec<Customer>> {
        Ok(self.db.customers().list().await?)
    }

    /// Registers a customer with no visits.
    ///
    /// ## Returns
    /// * `VALIDATION_ERROR` - the phone is already registered
    pub async fn create(&self, input: NewCustomer) -> ApiResult<Customer> {
        let details = input.validate()?;

        let now = Utc::now();
        let customer = Customer {
            id: new_id(),
            name: details.name,
            email: details.email,
            phone: details.phone,
            visits: 0,
            spending_cents: 0,
            vip: details.vip,
            visit_history: Vec::new(),
            created_at: now,
            updated_at: now,
            sync_version: 0,
        };
        self.db
            .customers()
            .insert(&customer)
            .await
            .map_err(phone_conflict)?;

        info!(id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Edits name, phone, email and VIP flag.
    ///
    /// Visits, spending and the visit log are never written here.
    ///
    /// ## Returns
    /// * `NOT_FOUND` - no such customer
    /// * `VALIDATION_ERROR` - the phone belongs to another customer
    pub async fn update_details(&self, id: &str, input: NewCustomer) -> ApiResult<Customer> {
        let details = input.validate()?;
        self.db
            .customers()
            .update_details(id, &details)
            .await
            .map_err(phone_conflict)?;

        info!(id = %id, "Customer updated");
        self.get(id).await
    }

    /// Deletes a customer together with its visit log.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.db.customers().delete(id).await?;
        info!(id = %id, "Customer deleted");
        Ok(())
    }
}

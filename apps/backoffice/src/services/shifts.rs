//! # Shift Service
//!
//! Opening and closing cashier shifts. At most one shift is open at a time;
//! sales recorded while it is open are credited to its ledger by
//! [`SaleService`](super::SaleService).

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use salon_core::validation;
use salon_core::{CoreError, Money, SalesDetails, Shift, ShiftStatus};
use salon_db::repository::new_id;
use salon_db::{Database, DbError, ShiftClosing};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenShift {
    pub cashier: String,
    /// Wall-clock label, e.g. "09:00".
    pub start_time: String,
    #[serde(default)]
    pub starting_cash_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseShift {
    pub end_time: String,
    pub final_cash_cents: i64,
    #[serde(default)]
    pub total_expenses_cents: i64,
}

#[derive(Debug, Clone)]
pub struct ShiftService {
    db: Database,
}

impl ShiftService {
    pub fn new(db: Database) -> Self {
        ShiftService { db }
    }

    pub async fn get(&self, id: &str) -> ApiResult<Shift> {
        self.db
            .shifts()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Shift", id))
    }

    /// The open shift, if any.
    pub async fn current(&self) -> ApiResult<Option<Shift>> {
        Ok(self.db.shifts().find_open().await?)
    }

    pub async fn list(&self, status: Option<ShiftStatus>) -> ApiResult<Vec<Shift>> {
        Ok(self.db.shifts().list(status).await?)
    }

    /// Opens a shift with an empty sales ledger.
    ///
    /// ## Returns
    /// * `BUSINESS_LOGIC` - another shift is already open
    pub async fn open(&self, input: OpenShift) -> ApiResult<Shift> {
        let cashier = validation::validate_required("cashier", &input.cashier)?;
        let start_time = validation::validate_required("startTime", &input.start_time)?;
        let starting_cash = Money::from_cents(input.starting_cash_cents);
        validation::validate_non_negative("startingCash", starting_cash)?;

        if let Some(open) = self.db.shifts().find_open().await? {
            return Err(CoreError::ShiftAlreadyOpen {
                open_shift_id: open.id,
            }
            .into());
        }

        let now = Utc::now();
        let shift = Shift {
            id: new_id(),
            cashier,
            start_time,
            end_time: None,
            starting_cash_cents: starting_cash.cents(),
            total_sales_cents: 0,
            total_expenses_cents: 0,
            final_cash_cents: 0,
            status: ShiftStatus::Open,
            sales_details: SalesDetails::default(),
            opened_at: now,
            closed_at: None,
            updated_at: now,
            sync_version: 0,
        };

        match self.db.shifts().insert(&shift).await {
            Ok(()) => {}
            // Lost a race with another open() between the check and the insert.
            Err(e) if e.is_unique_violation_on("shifts.status") => {
                let open_shift_id = match self.db.shifts().find_open().await? {
                    Some(open) => open.id,
                    None => return Err(e.into()),
                };
                warn!(open_shift_id = %open_shift_id, "Shift opened concurrently");
                return Err(CoreError::ShiftAlreadyOpen { open_shift_id }.into());
            }
            Err(e) => return Err(e.into()),
        }

        info!(id = %shift.id, cashier = %shift.cashier, "Shift opened");
        Ok(shift)
    }

    /// Closes an open shift. Its sales figures stay as recorded.
    ///
    /// ## Returns
    /// * `NOT_FOUND` - no such shift
    /// * `BUSINESS_LOGIC` - the shift is already closed
    pub async fn close(&self, id: &str, input: CloseShift) -> ApiResult<Shift> {
        let end_time = validation::validate_required("endTime", &input.end_time)?;
        let final_cash = Money::from_cents(input.final_cash_cents);
        let expenses = Money::from_cents(input.total_expenses_cents);
        validation::validate_non_negative("finalCash", final_cash)?;
        validation::validate_non_negative("totalExpenses", expenses)?;

        let shift = self.get(id).await?;
        if !shift.is_open() {
            return Err(CoreError::ShiftNotOpen {
                shift_id: shift.id,
            }
            .into());
        }

        let closing = ShiftClosing {
            end_time,
            final_cash_cents: final_cash.cents(),
            total_expenses_cents: expenses.cents(),
            closed_at: Utc::now(),
        };
        if !self.db.shifts().close(id, &closing).await? {
            return Err(CoreError::ShiftNotOpen {
                shift_id: id.to_string(),
            }
            .into());
        }

        info!(
            id = %id,
            total_sales_cents = shift.total_sales_cents,
            final_cash = %final_cash,
            "Shift closed"
        );
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        match self.db.shifts().delete(id).await {
            Ok(()) => {
                info!(id = %id, "Shift deleted");
                Ok(())
            }
            Err(DbError::NotFound { .. }) => Err(ApiError::not_found("Shift", id)),
            Err(e) => Err(e.into()),
        }
    }
}

//! Reconciling defendant contact details read off a scanned form with the
//! values already held for the case.

mod details;
mod reconcile;

pub use details::{
    normalise_ni_number, normalise_postcode, DefendantDetails, EmploymentStatus,
    FinancialMeans, IncomeFrequency,
};
pub use reconcile::{reconcile_defendant_details, DefendantDetailsReconciliation, ReconciliationInput};

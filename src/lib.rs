pub mod amortization;
pub mod decimal;
pub mod errors;
pub mod foreclosure;
pub mod gateway;
pub mod ledger;
pub mod lifecycle;
pub mod loan;
pub mod types;
pub mod validation;

// re-export key types
pub use decimal::{Money, Rate};
pub use errors::{Result, ServicingError};
pub use gateway::{
    Directory, InMemoryDirectory, InMemoryGateway, LoanStore, Notifier, NotifyTarget,
    RecordingNotifier, SentNotification,
};
pub use ledger::EmiLedger;
pub use lifecycle::{ApplyRequest, LoanLifecycle};
pub use loan::{Emi, LoanApplication, LoanType, Payment, User};
pub use types::{EmiId, LoanId, LoanStatus, LoanTypeId, PaymentId, Role, Severity, UserId};
pub use validation::LoanTypeCatalog;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

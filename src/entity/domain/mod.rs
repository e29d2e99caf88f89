//! Business records that own checklists.
//!
//! Each record carries only the fields the task adapters read or change:
//! identity, display fields, its status and the marker stamped when every
//! required task is resolved.

mod record;
mod service_request;
mod status;
mod stock_issue;
mod stock_receipt;
mod stock_transfer;
mod ticket;

pub use record::EntityRecord;
pub use service_request::{ServiceRequest, ServiceRequestStatus};
pub use status::{Priority, StatusChange};
pub use stock_issue::{StockIssue, StockIssueStatus};
pub use stock_receipt::{StockReceipt, StockReceiptStatus};
pub use stock_transfer::{StockTransfer, StockTransferStatus};
pub use ticket::{Ticket, TicketStatus};

//! Fulfillment documents around a process.
//!
//! Government-side instruments (contracts, supply authorizations, purchase
//! commitments), the linkages that slice a process item across them, fiscal
//! invoices, and supplier quotations. These are read-only inputs to the
//! valuation engine.

pub mod instrument;
pub mod invoice;
pub mod linkage;
pub mod quotation;

pub use instrument::{
    Contract, ContractId, Instrument, InstrumentHeader, InstrumentKind, InstrumentRef, PurchaseCommitment,
    PurchaseCommitmentId, SupplyAuthorization, SupplyAuthorizationId,
};
pub use invoice::{Invoice, InvoiceDirection, InvoiceId, Settlement, SettlementFilter};
pub use linkage::{Linkage, LinkageId};
pub use quotation::{Quotation, QuotationId, chosen as chosen_quotation};

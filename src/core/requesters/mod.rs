//! Module to provide the operations required
//! in order to retrieve a ticket from the KDC

mod senders;

mod request_tgt;
pub use request_tgt::request_tgt;

mod request_tgs;
pub use request_tgs::request_s4u2self;

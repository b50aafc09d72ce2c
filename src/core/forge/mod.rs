//! This module provide functionalities to create/parse kerberos structs

mod kdc_req;
pub use kdc_req::KdcReqBuilder;

mod krb_cred;
pub use krb_cred::new_krb_cred_info;

mod krb_user;
pub use krb_user::KrbUser;

mod principal_name;
pub use principal_name::{
    new_nt_principal, new_nt_srv_inst, new_nt_unknown, principal_to_string,
};

mod pa_data;

mod build_req;
pub use build_req::{build_as_req, build_s4u2self_req};

mod decrypters;
pub use decrypters::{extract_ticket_from_as_rep, extract_ticket_from_tgs_rep};

use super::kdc_req::KdcReqBuilder;
use super::pa_data::{
    new_pa_data_ap_req, new_pa_data_encrypted_timestamp,
    new_pa_data_pa_for_user,
};
use super::principal_name::new_nt_unknown;
use crate::core::forge::KrbUser;
use crate::core::{Cipher, TicketCred};
use crate::error::Result;
use kerberos_asn1::{AsReq, TgsReq};
use std::convert::TryFrom;

/// Helper to easily craft an AS-REQ message for asking a TGT
/// from user data
pub fn build_as_req(user: KrbUser, cipher: Option<&Cipher>) -> AsReq {
    let mut as_req_builder =
        KdcReqBuilder::new(user.realm).username(&user.name).request_pac();

    if let Some(cipher) = cipher {
        let padata = new_pa_data_encrypted_timestamp(cipher);
        as_req_builder = as_req_builder
            .push_padata(padata)
            .etypes(vec![cipher.etype()]);
    }

    return as_req_builder.build_as_req();
}

/// Helper to easily craft a TGS-REQ message for S4U2Self
/// from user data and TGT
pub fn build_s4u2self_req(
    user: KrbUser,
    impersonate_user: KrbUser,
    tgt: TicketCred,
) -> Result<TgsReq> {
    let realm = user.realm.clone();
    let sname = new_nt_unknown(&user.name);
    let cipher = Cipher::try_from(tgt.cred_info.key)?;

    let padatas = vec![
        new_pa_data_pa_for_user(impersonate_user, &cipher),
        new_pa_data_ap_req(user, tgt.ticket, &cipher),
    ];

    let tgs_req = KdcReqBuilder::new(realm)
        .padatas(padatas)
        .sname(Some(sname))
        .build_tgs_req();

    return Ok(tgs_req);
}

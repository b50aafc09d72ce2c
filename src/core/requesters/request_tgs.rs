use super::senders::send_recv_tgs;
use crate::communication::KrbChannel;
use crate::core::forge::{build_s4u2self_req, extract_ticket_from_tgs_rep};
use crate::core::{Cipher, KrbUser, TicketCred};
use crate::error::Result;
use log::info;
use std::convert::TryFrom;

/// Use a TGT to request a TGS for user itself on behalf other user
pub fn request_s4u2self(
    user: KrbUser,
    impersonate_user: KrbUser,
    tgt: TicketCred,
    channel: &dyn KrbChannel,
) -> Result<TicketCred> {
    info!("Request {} S4U2Self TGS for {}", impersonate_user, user);
    let cipher = Cipher::try_from(tgt.cred_info.key.clone())?;
    let tgs_req = build_s4u2self_req(user, impersonate_user, tgt)?;

    let tgs_rep = send_recv_tgs(channel, &tgs_req)?;

    return extract_ticket_from_tgs_rep(tgs_rep, &cipher);
}

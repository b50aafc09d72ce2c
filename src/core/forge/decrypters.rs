use super::krb_cred::new_krb_cred_info;
use crate::core::{Cipher, TicketCred};
use crate::error::{Error, Result};
use kerberos_asn1::{AsRep, Asn1Object, EncAsRepPart, EncTgsRepPart, TgsRep};
use kerberos_constants::key_usages::{
    KEY_USAGE_AS_REP_ENC_PART, KEY_USAGE_TGS_REP_ENC_PART_SESSION_KEY,
};

/// Decrypts the AS-REP with the user key and packs the TGT together with
/// its session key.
pub fn extract_ticket_from_as_rep(
    as_rep: AsRep,
    cipher: &Cipher,
) -> Result<TicketCred> {
    if as_rep.enc_part.etype != cipher.etype() {
        return Err(Error::DataError(format!(
            "Unable to decrypt KDC response AS-REP: mismatch etypes ({} != {})",
            as_rep.enc_part.etype,
            cipher.etype()
        )));
    }

    let raw_enc_as_rep_part = cipher
        .decrypt(KEY_USAGE_AS_REP_ENC_PART, &as_rep.enc_part.cipher)
        .map_err(|error| {
            format!("Error decrypting KDC response AS-REP: {}", error)
        })?;

    let (_, enc_as_rep_part) = EncAsRepPart::parse(&raw_enc_as_rep_part)
        .map_err(|_| Error::DataError(format!("Error decoding AS-REP")))?;

    let cred_info =
        new_krb_cred_info(enc_as_rep_part.into(), as_rep.crealm, as_rep.cname);

    return Ok(TicketCred::new(as_rep.ticket, cred_info));
}

/// Decrypts the TGS-REP with the TGT session key and packs the ticket
/// together with its session key.
pub fn extract_ticket_from_tgs_rep(
    tgs_rep: TgsRep,
    cipher: &Cipher,
) -> Result<TicketCred> {
    let raw_enc_tgs_rep_part = cipher
        .decrypt(
            KEY_USAGE_TGS_REP_ENC_PART_SESSION_KEY,
            &tgs_rep.enc_part.cipher,
        )
        .map_err(|error| format!("Error decrypting TGS-REP: {}", error))?;

    let (_, enc_tgs_rep_part) = EncTgsRepPart::parse(&raw_enc_tgs_rep_part)
        .map_err(|_| Error::DataError(format!("Error decoding TGS-REP")))?;

    let cred_info = new_krb_cred_info(
        enc_tgs_rep_part.into(),
        tgs_rep.crealm,
        tgs_rep.cname,
    );

    return Ok(TicketCred::new(tgs_rep.ticket, cred_info));
}

//! Structs to allow handle easier tickets and their associated KrbCredInfo

use crate::core::forge::{new_nt_principal, new_nt_srv_inst};
use crate::core::KrbUser;
use crate::error::Error;
use chrono::{DateTime, Utc};
use kerberos_asn1::{
    Asn1Object, EncKrbCredPart, EncryptedData, KrbCred, KrbCredInfo,
    PrincipalName, Ticket,
};
use kerberos_constants::etypes::NO_ENCRYPTION;
use std::convert::TryFrom;
use std::slice::Iter;

#[derive(Debug, Clone, Default)]
pub struct TicketCreds {
    pub ticket_creds: Vec<TicketCred>,
}

impl TicketCreds {
    pub fn new(ticket_creds: Vec<TicketCred>) -> Self {
        return Self { ticket_creds };
    }

    pub fn empty() -> Self {
        return Self::new(Vec::new());
    }

    pub fn push(&mut self, ticket_info: TicketCred) {
        self.ticket_creds.push(ticket_info);
    }

    pub fn iter(&self) -> Iter<TicketCred> {
        return self.ticket_creds.iter();
    }

    pub fn len(&self) -> usize {
        return self.ticket_creds.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.ticket_creds.is_empty();
    }

    pub fn get(&self, index: usize) -> Option<&TicketCred> {
        return self.ticket_creds.get(index);
    }

    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&TicketCred) -> bool,
    {
        self.iter()
            .filter(|tci| predicate(tci))
            .cloned()
            .collect::<Vec<TicketCred>>()
            .into()
    }

    /// Filter tickets for prealm (realm of the client). Case insensitive.
    pub fn prealm(&self, realm: &str) -> Self {
        self.filter(|tci| {
            if let Some(prealm) = &tci.cred_info.prealm {
                return prealm.to_lowercase() == realm.to_lowercase();
            }
            return false;
        })
    }

    /// Filter tickets for pname (the name of the client).
    pub fn pname(&self, name: &PrincipalName) -> Self {
        self.filter(|tci| {
            if let Some(pname) = &tci.cred_info.pname {
                return pname.name_string == name.name_string;
            }
            return false;
        })
    }

    /// Filter tickets for sname (the name of the service).
    pub fn sname(&self, name: &PrincipalName) -> Self {
        self.filter(|tci| {
            if let Some(sname) = &tci.cred_info.sname {
                return sname.name_string == name.name_string;
            }
            return false;
        })
    }

    /// Filter for the username and the user realm.
    pub fn user(&self, user: &KrbUser) -> Self {
        return self.prealm(&user.realm).pname(&new_nt_principal(&user.name));
    }

    /// Filter to only returns TGTs for a given realm.
    pub fn tgt_realm(&self, realm: &str) -> Self {
        let tgt_service = new_nt_srv_inst(&format!("krbtgt/{}", realm));
        return self.sname(&tgt_service);
    }

    /// Filter to only returns the user TGTs for a given realm.
    pub fn user_tgt_realm(&self, user: &KrbUser, realm: &str) -> Self {
        return self.tgt_realm(realm).user(user);
    }

    /// Removes the tickets that are also present in `other`, compared by
    /// client and service.
    pub fn without(&self, other: &TicketCreds) -> Self {
        self.filter(|tci| !other.iter().any(|o| tci.same_principals(o)))
    }
}

impl From<TicketCreds> for KrbCred {
    fn from(creds: TicketCreds) -> Self {
        let mut krb_cred = KrbCred::default();
        let mut tickets = Vec::with_capacity(creds.ticket_creds.len());
        let mut cred_infos = Vec::with_capacity(creds.ticket_creds.len());

        for ticket_cred_info in creds.ticket_creds {
            tickets.push(ticket_cred_info.ticket);
            cred_infos.push(ticket_cred_info.cred_info);
        }

        krb_cred.tickets = tickets;
        let mut cred_part = EncKrbCredPart::default();
        cred_part.ticket_info = cred_infos;
        krb_cred.enc_part =
            EncryptedData::new(NO_ENCRYPTION, None, cred_part.build());
        return krb_cred;
    }
}

/// Convert from Kerberos credentials in plain text, the usual way of storing
/// them in machines. In case the credentials are encrypted this will fail.
impl TryFrom<KrbCred> for TicketCreds {
    type Error = Error;

    fn try_from(krb_cred: KrbCred) -> Result<Self, Error> {
        if krb_cred.enc_part.etype != NO_ENCRYPTION {
            return Err(Error::DataError(format!(
                "Unable to decrypt the credentials"
            )));
        }

        let (_, cred_part) = EncKrbCredPart::parse(&krb_cred.enc_part.cipher)
            .map_err(|_| {
                Error::DataError(format!(
                    "Error parsing credentials: EncKrbCredPart"
                ))
            })?;

        let tickets = krb_cred.tickets;
        let cred_infos = cred_part.ticket_info;

        return Ok((tickets, cred_infos).into());
    }
}

impl From<(Vec<Ticket>, Vec<KrbCredInfo>)> for TicketCreds {
    fn from((tickets, cred_infos): (Vec<Ticket>, Vec<KrbCredInfo>)) -> Self {
        let mut ticket_cred_infos = Vec::with_capacity(tickets.len());

        for (ticket, cred_info) in
            tickets.into_iter().zip(cred_infos.into_iter())
        {
            ticket_cred_infos.push(TicketCred::new(ticket, cred_info));
        }

        return Self::new(ticket_cred_infos);
    }
}

impl From<Vec<TicketCred>> for TicketCreds {
    fn from(v: Vec<TicketCred>) -> Self {
        return Self::new(v);
    }
}

impl From<TicketCred> for TicketCreds {
    fn from(ticket_info: TicketCred) -> Self {
        return Self::new(vec![ticket_info]);
    }
}

/// Struct to store a ticket and the related user info, like the session key.
#[derive(Debug, Clone)]
pub struct TicketCred {
    pub ticket: Ticket,
    pub cred_info: KrbCredInfo,
}

impl TicketCred {
    pub fn new(ticket: Ticket, cred_info: KrbCredInfo) -> Self {
        return Self { ticket, cred_info };
    }

    /// Start of the ticket validity, falling back to the authentication time.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let start = self
            .cred_info
            .starttime
            .as_ref()
            .or(self.cred_info.authtime.as_ref())?;
        return Some(start.with_timezone(&Utc));
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        let end = self.cred_info.endtime.as_ref()?;
        return Some(end.with_timezone(&Utc));
    }

    fn same_principals(&self, other: &TicketCred) -> bool {
        let names = |tc: &TicketCred| {
            (
                tc.cred_info.prealm.clone().map(|r| r.to_lowercase()),
                tc.cred_info.pname.as_ref().map(|p| p.name_string.clone()),
                tc.cred_info.sname.as_ref().map(|s| s.name_string.clone()),
            )
        };
        return names(self) == names(other);
    }
}

impl From<(Ticket, KrbCredInfo)> for TicketCred {
    fn from((t, kci): (Ticket, KrbCredInfo)) -> Self {
        return Self::new(t, kci);
    }
}

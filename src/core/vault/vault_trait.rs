use crate::core::{CredFormat, KrbUser, TicketCred, TicketCreds};
use crate::Result;

/// Storage of Kerberos credentials.
pub trait Vault {
    fn id(&self) -> &str;

    /// Retrieve all the tickets.
    fn dump(&self) -> Result<TicketCreds>;

    /// Retrieves the user TGTs (if many) for the user realm.
    fn get_user_tgts(&self, user: &KrbUser) -> Result<TicketCreds> {
        return Ok(self.dump()?.user_tgt_realm(user, &user.realm));
    }

    /// Add a new ticket, replacing the ones of the same client and service.
    fn add(&self, ticket_info: TicketCred) -> Result<()> {
        let new_creds: TicketCreds = ticket_info.into();
        let mut creds = self.dump()?.without(&new_creds);
        for ticket in new_creds.ticket_creds {
            creds.push(ticket);
        }
        return self.save(creds);
    }

    /// Saves the given tickets into the vault. The rest of the tickets are
    /// destroyed.
    fn save(&self, creds: TicketCreds) -> Result<()>;

    /// Saves the given tickets in the given format, if possible. The rest
    /// of the tickets are destroyed.
    fn save_as(&self, creds: TicketCreds, cred_format: CredFormat)
        -> Result<()>;
}

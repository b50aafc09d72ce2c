//! Authenticated identities returned by the login.

use crate::communication::KdcLocator;
use crate::core::keytab::{load_keytab_keys, select_key};
use crate::core::{request_s4u2self, request_tgt, KrbUser, TicketCred, Vault};
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};

/// Fraction of the ticket lifetime, in tenths, after which a relogin is
/// performed.
const RELOGIN_WINDOW_TENTHS: i64 = 8;

/// Identity logged in with the keys of a keytab.
#[derive(Debug, Clone)]
pub struct KeytabIdentity {
    user: KrbUser,
    keytab: PathBuf,
    locator: KdcLocator,
    tgt: TicketCred,
    login_time: DateTime<Utc>,
}

impl KeytabIdentity {
    /// Performs an AS exchange with the key of the user stored in the keytab.
    pub fn login(
        user: KrbUser,
        keytab: &Path,
        locator: KdcLocator,
    ) -> Result<Self> {
        let tgt = request_keytab_tgt(&user, keytab, &locator)?;
        info!("Login successful for user {} using keytab file {}", user, keytab.display());

        return Ok(Self {
            user,
            keytab: keytab.to_path_buf(),
            locator,
            tgt,
            login_time: Utc::now(),
        });
    }

    pub fn user(&self) -> &KrbUser {
        return &self.user;
    }

    pub fn keytab(&self) -> &Path {
        return &self.keytab;
    }

    pub fn tgt(&self) -> &TicketCred {
        return &self.tgt;
    }

    pub fn login_time(&self) -> DateTime<Utc> {
        return self.login_time;
    }

    fn relogin(&mut self) -> Result<()> {
        info!("Relogin user {} from keytab {}", self.user, self.keytab.display());
        self.tgt = request_keytab_tgt(&self.user, &self.keytab, &self.locator)?;
        self.login_time = Utc::now();
        return Ok(());
    }
}

fn request_keytab_tgt(
    user: &KrbUser,
    keytab: &Path,
    locator: &KdcLocator,
) -> Result<TicketCred> {
    let keys = load_keytab_keys(keytab)?;
    let key = select_key(&keys, user)?;
    return locator.send_to_kdcs(&user.realm, |channel| {
        return request_tgt(user.clone(), &key, channel);
    });
}

/// An authenticated user. A proxy acts on behalf of another user through the
/// credentials of its real user.
#[derive(Debug, Clone)]
pub enum Ugi {
    Keytab(KeytabIdentity),
    Proxy { user: String, real_user: Box<Ugi> },
}

impl Ugi {
    pub fn login_from_keytab(
        user: KrbUser,
        keytab: &Path,
        locator: KdcLocator,
    ) -> Result<Self> {
        return Ok(Ugi::Keytab(KeytabIdentity::login(user, keytab, locator)?));
    }

    pub fn create_proxy_user(user: &str, real_user: Ugi) -> Self {
        return Ugi::Proxy {
            user: user.to_string(),
            real_user: Box::new(real_user),
        };
    }

    /// Full name of the user, `name@REALM` for keytab identities.
    pub fn user_name(&self) -> String {
        match self {
            Ugi::Keytab(identity) => identity.user.to_string(),
            Ugi::Proxy { user, .. } => user.clone(),
        }
    }

    /// Name without realm and instance.
    pub fn short_user_name(&self) -> String {
        match self {
            Ugi::Keytab(identity) => identity.user.short_name().to_string(),
            Ugi::Proxy { user, .. } => {
                let name = user.split('@').next().unwrap_or(user);
                name.split('/').next().unwrap_or(name).to_string()
            }
        }
    }

    pub fn real_user(&self) -> Option<&Ugi> {
        match self {
            Ugi::Keytab(_) => None,
            Ugi::Proxy { real_user, .. } => Some(real_user.as_ref()),
        }
    }

    /// The identity holding the keytab credentials.
    pub fn keytab_identity(&self) -> &KeytabIdentity {
        match self {
            Ugi::Keytab(identity) => identity,
            Ugi::Proxy { real_user, .. } => real_user.keytab_identity(),
        }
    }

    pub fn is_from_keytab(&self) -> bool {
        return matches!(self, Ugi::Keytab(_));
    }

    pub fn tgt(&self) -> &TicketCred {
        return &self.keytab_identity().tgt;
    }

    /// Logs in again from the keytab when the TGT is close to expire.
    /// Returns whether a new TGT was requested.
    pub fn check_tgt_and_relogin_from_keytab(&mut self) -> Result<bool> {
        match self {
            Ugi::Proxy { real_user, .. } => {
                return real_user.check_tgt_and_relogin_from_keytab()
            }
            Ugi::Keytab(identity) => {
                let now = Utc::now();
                let tgt = &identity.tgt;
                if !should_relogin(tgt.start_time(), tgt.end_time(), now) {
                    debug!("TGT of {} is still valid", identity.user);
                    return Ok(false);
                }
                identity.relogin()?;
                return Ok(true);
            }
        }
    }

    /// Stores the TGT of the identity, replacing older TGTs of the same
    /// user.
    pub fn save_credentials(&self, vault: &dyn Vault) -> Result<()> {
        let identity = self.keytab_identity();
        info!("Save {} TGT in {}", identity.user, vault.id());
        return vault.add(identity.tgt.clone());
    }

    /// Service ticket for the real user on behalf of the proxy user,
    /// obtained with S4U2Self.
    pub fn impersonation_ticket(&self) -> Result<TicketCred> {
        let (user, real_user) = match self {
            Ugi::Proxy { user, real_user } => (user, real_user),
            Ugi::Keytab(identity) => {
                return Err(Error::ArgumentError(format!(
                    "{} is not a proxy user",
                    identity.user
                )))
            }
        };

        let identity = real_user.keytab_identity();
        let impersonate_user =
            KrbUser::from_principal(user, Some(&identity.user.realm))?;
        return identity.locator.send_to_kdcs(&identity.user.realm, |channel| {
            return request_s4u2self(
                identity.user.clone(),
                impersonate_user.clone(),
                identity.tgt.clone(),
                channel,
            );
        });
    }
}

impl fmt::Display for Ugi {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Ugi::Keytab(identity) => {
                write!(f, "{} (auth:KERBEROS)", identity.user)
            }
            Ugi::Proxy { user, real_user } => {
                write!(f, "{} (auth:PROXY) via {}", user, real_user)
            }
        }
    }
}

/// Whether a ticket valid between `start` and `end` must be renewed at
/// `now`. Tickets without times are always renewed.
pub fn should_relogin(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => return true,
    };

    let lifetime = (end - start).num_milliseconds();
    if lifetime <= 0 {
        return true;
    }

    let refresh_time =
        start + Duration::milliseconds(lifetime * RELOGIN_WINDOW_TENTHS / 10);
    return now >= refresh_time;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::communication::TransportProtocol;
    use crate::core::forge::{new_nt_principal, new_nt_srv_inst};
    use kerberos_asn1::{KrbCredInfo, Ticket};

    pub fn fake_identity(name: &str, realm: &str, valid_hours: i64) -> KeytabIdentity {
        let now = Utc::now();
        let mut cred_info = KrbCredInfo::default();
        cred_info.prealm = Some(realm.to_string());
        cred_info.pname = Some(new_nt_principal(name));
        cred_info.srealm = Some(realm.to_string());
        cred_info.sname = Some(new_nt_srv_inst(&format!("krbtgt/{}", realm)));
        cred_info.authtime = Some(now.into());
        cred_info.endtime = Some((now + Duration::hours(valid_hours)).into());

        return KeytabIdentity {
            user: KrbUser::new(name.to_string(), realm.to_string()),
            keytab: PathBuf::from("/nonexistent/hue.keytab"),
            locator: KdcLocator::new(TransportProtocol::TCP),
            tgt: TicketCred::new(Ticket::default(), cred_info),
            login_time: now,
        };
    }

    #[test]
    fn test_should_relogin() {
        let start = Utc::now();
        let end = start + Duration::hours(10);

        assert!(!should_relogin(Some(start), Some(end), start));
        assert!(!should_relogin(
            Some(start),
            Some(end),
            start + Duration::hours(7)
        ));
        assert!(should_relogin(
            Some(start),
            Some(end),
            start + Duration::hours(8)
        ));
        assert!(should_relogin(Some(start), Some(end), end));
        assert!(should_relogin(None, Some(end), start));
        assert!(should_relogin(Some(end), Some(start), start));
    }

    #[test]
    fn test_display() {
        let ugi = Ugi::Keytab(fake_identity("hue/10.11.159.156", "OTOCYON.COM", 10));
        assert_eq!("hue/10.11.159.156@OTOCYON.COM (auth:KERBEROS)", ugi.to_string());
        assert_eq!("hue", ugi.short_user_name());
        assert!(ugi.is_from_keytab());

        let proxy = Ugi::create_proxy_user("alice", ugi);
        assert_eq!(
            "alice (auth:PROXY) via hue/10.11.159.156@OTOCYON.COM (auth:KERBEROS)",
            proxy.to_string()
        );
        assert_eq!("alice", proxy.user_name());
        assert!(!proxy.is_from_keytab());
        assert_eq!(
            "hue/10.11.159.156",
            proxy.keytab_identity().user().name
        );
    }

    #[test]
    fn test_valid_tgt_skips_relogin() {
        let mut ugi = Ugi::Keytab(fake_identity("hdfs", "OTOCYON.COM", 10));
        assert!(!ugi.check_tgt_and_relogin_from_keytab().unwrap());

        let mut proxy = Ugi::create_proxy_user("alice", ugi);
        assert!(!proxy.check_tgt_and_relogin_from_keytab().unwrap());
    }

    #[test]
    fn test_expired_tgt_relogins_from_keytab() {
        let mut ugi = Ugi::Keytab(fake_identity("hdfs", "OTOCYON.COM", 0));
        // the keytab of the fake identity does not exist
        let err = ugi.check_tgt_and_relogin_from_keytab().unwrap_err();
        assert!(err.is_not_found_error());
    }

    #[test]
    fn test_impersonation_requires_proxy() {
        let ugi = Ugi::Keytab(fake_identity("hdfs", "OTOCYON.COM", 10));
        assert!(ugi.impersonation_ticket().unwrap_err().is_argument_error());
    }
}

use std::env;
use syncauth::core::CredFormat;

pub const CCACHE_ENVVAR: &str = "KRB5CCNAME";

/// File to store credentials: the one given by arguments, then the
/// configured one, then KRB5CCNAME and finally one named after the user.
pub fn get_ticket_file(
    args_file: Option<String>,
    config_file: Option<&str>,
    username: &str,
    cred_format: &CredFormat,
) -> String {
    if let Some(file) = args_file {
        return file;
    }

    if let Some(file) = config_file {
        return file.to_string();
    }

    if let Some(file) = get_env_ticket_file() {
        return file;
    }

    return format!("{}.{}", username, cred_format);
}

/// File where the login command still has to store the TGT. None when the
/// login already stored it in the configured credentials cache.
pub fn get_login_ticket_file(
    args_file: Option<String>,
    config_file: Option<&str>,
    username: &str,
    cred_format: &CredFormat,
) -> Option<String> {
    if let Some(config_file) = config_file {
        match &args_file {
            None => return None,
            Some(file) if file == config_file => return None,
            _ => {}
        }
    }

    return Some(get_ticket_file(args_file, config_file, username, cred_format));
}

pub fn get_env_ticket_file() -> Option<String> {
    let file = env::var(CCACHE_ENVVAR).ok()?;
    let file = file.trim_start_matches("FILE:");
    if file.is_empty() {
        return None;
    }
    return Some(file.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_file_precedence() {
        assert_eq!(
            "args.ccache",
            get_ticket_file(
                Some("args.ccache".into()),
                Some("/tmp/conf.ccache"),
                "hue",
                &CredFormat::Ccache
            )
        );
        assert_eq!(
            "/tmp/conf.ccache",
            get_ticket_file(None, Some("/tmp/conf.ccache"), "hue", &CredFormat::Krb)
        );
    }

    #[test]
    fn test_login_ticket_file_skips_configured_cache() {
        assert_eq!(
            None,
            get_login_ticket_file(
                None,
                Some("/tmp/conf.ccache"),
                "hue",
                &CredFormat::Ccache
            )
        );
        assert_eq!(
            None,
            get_login_ticket_file(
                Some("/tmp/conf.ccache".into()),
                Some("/tmp/conf.ccache"),
                "hue",
                &CredFormat::Ccache
            )
        );
        assert_eq!(
            Some("args.krb".to_string()),
            get_login_ticket_file(
                Some("args.krb".into()),
                Some("/tmp/conf.ccache"),
                "hue",
                &CredFormat::Krb
            )
        );
        assert_eq!(
            Some("args.ccache".to_string()),
            get_login_ticket_file(
                Some("args.ccache".into()),
                None,
                "hue",
                &CredFormat::Ccache
            )
        );
    }
}

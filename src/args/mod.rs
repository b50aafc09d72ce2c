pub mod fetch;
pub mod login;
pub mod principal;
pub mod proxy;
mod validators;

use clap::{App, AppSettings, Arg, ArgMatches};

pub fn args() -> App<'static, 'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequired)
        .subcommand(fetch::command())
        .subcommand(login::command())
        .subcommand(principal::command())
        .subcommand(proxy::command())
}

/// Arguments shared by every command.
pub fn config_arg() -> Arg<'static, 'static> {
    Arg::with_name("config")
        .long("config")
        .short("c")
        .takes_value(true)
        .value_name("file")
        .help("JSON file with the kerberos configuration")
        .required(true)
        .validator(validators::is_file)
}

pub fn verbosity_arg() -> Arg<'static, 'static> {
    Arg::with_name("verbosity")
        .short("v")
        .multiple(true)
        .help("Increase message verbosity")
}

pub enum Arguments {
    Fetch(fetch::Arguments),
    Login(login::Arguments),
    Principal(principal::Arguments),
    Proxy(proxy::Arguments),
}

impl Arguments {
    pub fn verbosity(&self) -> usize {
        match self {
            Arguments::Fetch(args) => args.verbosity,
            Arguments::Login(args) => args.verbosity,
            Arguments::Principal(args) => args.verbosity,
            Arguments::Proxy(args) => args.verbosity,
        }
    }
}

pub struct ArgumentsParser {}

impl ArgumentsParser {
    pub fn parse<'a>(matches: &'a ArgMatches) -> Arguments {
        match matches.subcommand() {
            (fetch::COMMAND_NAME, Some(matches)) => {
                return Arguments::Fetch(fetch::ArgumentsParser::parse(matches));
            }
            (login::COMMAND_NAME, Some(matches)) => {
                return Arguments::Login(login::ArgumentsParser::parse(matches));
            }
            (principal::COMMAND_NAME, Some(matches)) => {
                return Arguments::Principal(
                    principal::ArgumentsParser::parse(matches),
                );
            }
            (proxy::COMMAND_NAME, Some(matches)) => {
                return Arguments::Proxy(proxy::ArgumentsParser::parse(matches));
            }
            _ => unreachable!("Unknown command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login() {
        let config = tempfile::NamedTempFile::new().unwrap();
        let config_path = config.path().to_str().unwrap();

        let matches = args()
            .get_matches_from_safe(vec![
                "syncauth",
                "login",
                "-c",
                config_path,
                "--cred-file",
                "hue.krb",
                "-vv",
            ])
            .unwrap();

        match ArgumentsParser::parse(&matches) {
            Arguments::Login(login) => {
                assert_eq!(config_path, login.config);
                assert_eq!(Some("hue.krb".to_string()), login.out_file);
                assert_eq!(2, login.verbosity);
                assert!(login.kdc.is_none());
            }
            _ => panic!("expected login arguments"),
        }
    }

    #[test]
    fn test_config_is_required() {
        assert!(args()
            .get_matches_from_safe(vec!["syncauth", "principal"])
            .is_err());
        assert!(args()
            .get_matches_from_safe(vec![
                "syncauth",
                "principal",
                "-c",
                "/nonexistent/config.json"
            ])
            .is_err());
    }

    #[test]
    fn test_parse_proxy() {
        let config = tempfile::NamedTempFile::new().unwrap();
        let config_path = config.path().to_str().unwrap();

        let matches = args()
            .get_matches_from_safe(vec![
                "syncauth", "proxy", "-c", config_path, "--user", "alice",
            ])
            .unwrap();

        match ArgumentsParser::parse(&matches) {
            Arguments::Proxy(proxy) => {
                assert_eq!("alice", proxy.proxy_user);
                assert!(proxy.keytab.is_none());
                assert_eq!(0, proxy.verbosity);
            }
            _ => panic!("expected proxy arguments"),
        }
    }
}

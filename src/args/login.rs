use super::{config_arg, validators, verbosity_arg};
use syncauth::core::CredFormat;
use clap::{App, Arg, ArgMatches, SubCommand};

pub const COMMAND_NAME: &str = "login";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Login with the keytab of the configuration and save the TGT")
        .arg(config_arg())
        .arg(
            Arg::with_name("kdc")
                .long("kdc")
                .short("k")
                .takes_value(true)
                .value_name("host[:port]")
                .help("Address of the KDC, overrides the configuration")
                .validator(validators::is_kdc_address),
        )
        .arg(
            Arg::with_name("cred-format")
                .long("cred-format")
                .takes_value(true)
                .possible_values(&["krb", "ccache"])
                .help("Format to save the TGT")
                .default_value("ccache"),
        )
        .arg(
            Arg::with_name("cred-file")
                .long("cred-file")
                .takes_value(true)
                .value_name("file")
                .help("File to save the TGT"),
        )
        .arg(
            Arg::with_name("udp")
                .long("udp")
                .help("Use udp as transport protocol"),
        )
        .arg(verbosity_arg())
}

#[derive(Debug)]
pub struct Arguments {
    pub config: String,
    pub kdc: Option<String>,
    pub cred_format: CredFormat,
    pub out_file: Option<String>,
    pub udp: bool,
    pub verbosity: usize,
}

pub struct ArgumentsParser<'a> {
    matches: &'a ArgMatches<'a>,
}

impl<'a> ArgumentsParser<'a> {
    pub fn parse(matches: &'a ArgMatches) -> Arguments {
        let parser = Self { matches: matches };
        return parser._parse();
    }

    fn _parse(&self) -> Arguments {
        return Arguments {
            config: self.matches.value_of("config").unwrap().into(),
            kdc: self.matches.value_of("kdc").map(|s| s.into()),
            cred_format: self.parse_cred_format(),
            out_file: self.matches.value_of("cred-file").map(|s| s.into()),
            udp: self.matches.is_present("udp"),
            verbosity: self.matches.occurrences_of("verbosity") as usize,
        };
    }

    fn parse_cred_format(&self) -> CredFormat {
        match self.matches.value_of("cred-format").unwrap() {
            "krb" => CredFormat::Krb,
            "ccache" => CredFormat::Ccache,
            _ => unreachable!("Unknown credential format"),
        }
    }
}

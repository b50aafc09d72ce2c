mod args;
mod commands;
mod utils;

use args::{args, Arguments, ArgumentsParser};
use log::error;
use syncauth::{KerberosConfig, KeytabCache, Result};

fn init_log(verbosity: usize) {
    stderrlog::new()
        .module(module_path!())
        .verbosity(verbosity)
        .init()
        .unwrap();
}

fn main() {
    let args = ArgumentsParser::parse(&args().get_matches());
    init_log(args.verbosity() + 1);

    if let Err(error) = main_inner(args) {
        error!("{}", error);
        std::process::exit(1);
    }
}

fn main_inner(args: Arguments) -> Result<()> {
    match args {
        Arguments::Fetch(args) => {
            let config = KerberosConfig::from_file(&args.config)?;
            return commands::fetch(&config, &KeytabCache::default(), args.krb5);
        }
        Arguments::Login(args) => {
            let mut config = KerberosConfig::from_file(&args.config)?;
            if args.kdc.is_some() {
                config.kdc = args.kdc;
            }
            if args.udp {
                config.kdc_transport = Some("udp".into());
            }
            return commands::login(
                &config,
                &KeytabCache::default(),
                args.out_file,
                args.cred_format,
            );
        }
        Arguments::Principal(args) => {
            let config = KerberosConfig::from_file(&args.config)?;
            return commands::principal(&config, &KeytabCache::default());
        }
        Arguments::Proxy(args) => {
            let config = KerberosConfig::from_file(&args.config)?;
            return commands::proxy(
                &config,
                &KeytabCache::default(),
                &args.proxy_user,
                args.keytab,
                args.out_file,
            );
        }
    }
}

use std::path::PathBuf;

use clap::{
    App,
    Arg,
    ArgMatches,
};

pub struct Settings {
    pub host: String,
    pub port: u16,
    pub dir: PathBuf,
}

const BIND_HOST: &str  = "0.0.0.0";
const BIND_PORT: u16 = 8000;

impl Settings {

    pub fn new() -> Settings {
        Settings {
            host: BIND_HOST.to_string(),
            port: BIND_PORT,
            dir: PathBuf::from("."),
        }
    }

    fn from_matches(&mut self, arg: &ArgMatches) {
        match arg.value_of("host") {
            Some(v) => {
                self.host = v.to_string();
            },
            _ => {},
        };

        match arg.value_of("port") {
            Some(v) => {
                match u16::from_str_radix(&v, 10) {
                    Ok(port) => {
                        self.port = port;
                    },
                    _ => {},
                };
            },
            _ => {},
        };

        match arg.value_of("datadir") {
            Some(v) => {
                self.dir = PathBuf::from(v);
            },
            _ => {},
        };
    }

    pub fn from_args() -> Settings {
        let mut o = App::new("hashery");
        o = o.version(env!("CARGO_PKG_VERSION"));
        o = o.arg(
            Arg::with_name("host")
                .long("host")
                .short("h")
                .value_name("Host or ip to bind server to.")
                .takes_value(true)
                );
        o = o.arg(
            Arg::with_name("port")
                .long("port")
                .short("p")
                .value_name("Port to bind server to")
                .takes_value(true)
                );
        o = o.arg(
            Arg::with_name("datadir")
                .long("data-dir")
                .short("d")
                .value_name("Storage directory")
                .takes_value(true)
                );

        let arg_matches = o.get_matches();
        let mut settings = Settings::new();
        settings.from_matches(&arg_matches);
        settings
    }
}

use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

use tiny_http::{
    Server,
    ServerConfig,
    Request,
    Method,
};

use env_logger;

use hashery::arg::Settings;
use hashery::request::process_method;
use hashery::response::{
    exec_response,
    preflight_response,
};

use log::{info, error};

fn main() {
    env_logger::init();

    let settings = Settings::from_args();

    let ip_addr = match Ipv4Addr::from_str(settings.host.as_str()) {
        Ok(v) => {
            v
        },
        Err(e) => {
            error!("invalid host {}: {}", settings.host, e);
            return;
        },
    };
    let sock_addr = SocketAddrV4::new(ip_addr, settings.port);
    let srv_cfg = ServerConfig{
        addr: sock_addr,
        ssl: None,
    };
    let srv = match Server::new(srv_cfg) {
        Ok(v) => {
            v
        },
        Err(e) => {
            error!("cannot bind server: {}", e);
            return;
        },
    };
    info!("hashery serving {:?} on {}:{}", settings.dir, settings.host, settings.port);

    loop {
        let r = srv.recv();
        let mut req: Request;
        match r {
            Ok(v) => req = v,
            Err(e) => {
                error!("{}", e);
                break;
            }
        };

        let method = req.method().clone();
        match method {
            Method::Options => {
                preflight_response(req);
                continue;
            },
            Method::Get => {},
            Method::Put => {},
            _ => {
                let res = hashery::record::RequestResult::plain(
                    hashery::record::RequestResultType::InputError,
                    None,
                );
                exec_response(req, res);
                continue;
            },
        };

        let url = req.url().to_string();
        let expected_size = match req.body_length() {
            Some(v) => {
                v
            },
            None => {
                0
            },
        };
        info!("processing request {} for {}", method, url);

        let f = req.as_reader();
        let result = process_method(&method, url, f, expected_size, settings.dir.as_path());
        exec_response(req, result);
    }
}

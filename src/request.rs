use std::path::Path;
use std::str::FromStr;

use tiny_http::Method;
use url::Url;

use crate::record::{
    put_alias,
    put_immutable,
    resolve,
    RequestResult,
    RequestResultType,
};
use crate::cake::Role;
use crate::web::{
    Resource,
    WebPath,
};
use crate::response::mime_for_extension;
use std::io::Read;

use log::{
    debug,
    error,
};

// route prefixes of the server surface
const INFO_PREFIX: &str = "/info/";
const DATA_PREFIX: &str = "/data/";

fn resolve_route(route: &str, path: &Path, want_meta: bool) -> RequestResult {
    let web_path = match WebPath::from_str(route) {
        Ok(v) => {
            v
        },
        Err(e) => {
            let err_str = format!("{}", e);
            error!("{}", err_str);
            return RequestResult::plain(RequestResultType::InputError, Some(err_str));
        },
    };
    let alias_path = match &web_path.resource {
        Resource::Alias(v) => {
            v
        },
        _ => {
            // root and settings routes belong to the browser, not the store
            return RequestResult::plain(RequestResultType::InputError, Some(String::from("not a content path")));
        },
    };

    let resolved = match resolve(path, alias_path) {
        Some(v) => {
            v
        },
        None => {
            return RequestResult::plain(RequestResultType::RecordError, Some(String::new()));
        },
    };
    debug!("route {} resolved to {}", route, resolved.cake);

    if want_meta {
        let meta = resolved.meta(web_path.extension());
        let json = match serde_json::to_string(&meta) {
            Ok(v) => {
                v
            },
            Err(e) => {
                error!("cannot serialize metadata: {}", e);
                return RequestResult::plain(RequestResultType::RecordError, None);
            },
        };
        return RequestResult {
            typ: RequestResultType::Found,
            v: Some(json),
            b: None,
            m: Some(mime::APPLICATION_JSON),
        };
    }

    RequestResult {
        typ: RequestResultType::Found,
        v: None,
        b: Some(resolved.content),
        m: Some(mime_for_extension(web_path.extension())),
    }
}

fn put_route(route: &str, f: impl Read, expected_size: usize, path: &Path) -> RequestResult {
    let trimmed = route.trim_matches('/');
    let r = match trimmed {
        "" => {
            debug!("immutable put");
            put_immutable(path, f, expected_size, Role::Synapse)
        },
        v => {
            if v.contains('/') || v == "~" || v == "_" {
                return RequestResult::plain(RequestResultType::InputError, Some(String::from("invalid alias name")));
            }
            debug!("alias put for {}", v);
            put_alias(path, v, f, expected_size, Role::Synapse)
        },
    };
    match r {
        Ok(v) => {
            RequestResult::plain(RequestResultType::Changed, Some(v.text().to_string()))
        },
        Err(e) => {
            let err_str = format!("{:?}", e);
            error!("{}", err_str);
            RequestResult::plain(RequestResultType::RecordError, Some(err_str))
        },
    }
}

/// Handle client input by method type.
///
/// # Arguments
///
/// * `method` - The HTTP method of the client request.
/// * `url` - The local part of the URL of the client request.
/// * `f` - Reader providing the content body of a client PUT request.
/// * `expected_size` - Size hint for content body.
/// * `path` - Absolute path to storage directory.
pub fn process_method(method: &Method, url: String, f: impl Read, expected_size: usize, path: &Path) -> RequestResult {
    // strip any query string before routing
    let base = match Url::parse("http://localhost/") {
        Ok(v) => {
            v
        },
        Err(_) => {
            return RequestResult::plain(RequestResultType::InputError, None);
        },
    };
    let route = match base.join(url.as_str()) {
        Ok(v) => {
            v.path().to_string()
        },
        Err(e) => {
            let err_str = format!("{}", e);
            error!("cannot parse url {}: {}", url, err_str);
            return RequestResult::plain(RequestResultType::InputError, Some(err_str));
        },
    };

    match method {
        Method::Get => {
            if route.starts_with(INFO_PREFIX) {
                return resolve_route(&route[INFO_PREFIX.len()..], path, true);
            }
            if route.starts_with(DATA_PREFIX) {
                return resolve_route(&route[DATA_PREFIX.len()..], path, false);
            }
            RequestResult::plain(RequestResultType::InputError, Some(String::from("unknown route")))
        },
        Method::Put => {
            put_route(route.as_str(), f, expected_size, path)
        },
        _ => {
            RequestResult::plain(RequestResultType::InputError, Some(String::new()))
        },
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{
        write,
        File,
    };
    use tempfile::tempdir;
    use tiny_http::Method;

    use super::process_method;
    use crate::cake::Role;
    use crate::rack::CakeRack;
    use crate::record::{
        put_alias,
        put_immutable,
        RequestResultType,
    };

    const LOREM: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

    fn body(dir: &std::path::Path, data: &[u8]) -> File {
        let fp = dir.join("body");
        write(&fp, data).unwrap();
        File::open(&fp).unwrap()
    }

    #[test]
    fn test_put_immutable() {
        let d = tempdir().unwrap();
        let f = body(d.path(), b"foobar");

        let res = process_method(&Method::Put, String::from("/"), f, 6, d.path());
        assert_eq!(res.typ, RequestResultType::Changed);
        // six bytes fit inline
        let cake = res.v.unwrap();
        assert!(cake.starts_with('0'));
    }

    #[test]
    fn test_put_alias_and_get() {
        let d = tempdir().unwrap();
        let store = d.path().join("store");
        std::fs::create_dir(&store).unwrap();

        let f = body(d.path(), LOREM);
        let res = process_method(&Method::Put, String::from("/acme"), f, LOREM.len(), &store);
        assert_eq!(res.typ, RequestResultType::Changed);

        let f = body(d.path(), b"");
        let res = process_method(&Method::Get, String::from("/data/acme"), f, 0, &store);
        assert_eq!(res.typ, RequestResultType::Found);
        assert_eq!(res.b.unwrap(), LOREM.to_vec());
    }

    #[test]
    fn test_put_alias_reserved() {
        let d = tempdir().unwrap();
        let f = body(d.path(), b"foobar");
        let res = process_method(&Method::Put, String::from("/~"), f, 6, d.path());
        assert_eq!(res.typ, RequestResultType::InputError);
    }

    #[test]
    fn test_get_info() {
        let d = tempdir().unwrap();
        let store = d.path().join("store");
        std::fs::create_dir(&store).unwrap();

        let content_cake = put_immutable(&store, LOREM, 0, Role::Synapse).unwrap();
        let mut rack = CakeRack::new();
        rack.insert("b.txt", content_cake);
        put_alias(&store, "acme", rack.content().as_bytes(), 0, Role::Neuron).unwrap();

        let f = body(d.path(), b"");
        let res = process_method(&Method::Get, String::from("/info/acme/b.txt"), f, 0, &store);
        assert_eq!(res.typ, RequestResultType::Found);
        let json = res.v.unwrap();
        assert!(json.contains("\"file_type\":\"txt\""));
        assert!(json.contains(format!("\"size\":{}", LOREM.len()).as_str()));

        let f = body(d.path(), b"");
        let res = process_method(&Method::Get, String::from("/info/acme/"), f, 0, &store);
        assert!(res.v.unwrap().contains("\"file_type\":\"DIR\""));
    }

    #[test]
    fn test_get_unknown_route() {
        let d = tempdir().unwrap();
        let f = body(d.path(), b"");
        let res = process_method(&Method::Get, String::from("/nosuch"), f, 0, d.path());
        assert_eq!(res.typ, RequestResultType::InputError);
    }

    #[test]
    fn test_get_missing_record() {
        let d = tempdir().unwrap();
        let f = body(d.path(), b"");
        let res = process_method(&Method::Get, String::from("/data/acme/b.txt"), f, 0, d.path());
        assert_eq!(res.typ, RequestResultType::RecordError);
    }

    #[test]
    fn test_get_settings_route_rejected() {
        let d = tempdir().unwrap();
        let f = body(d.path(), b"");
        let res = process_method(&Method::Get, String::from("/data/~/acl"), f, 0, d.path());
        assert_eq!(res.typ, RequestResultType::InputError);
    }

    #[test]
    fn test_query_string_stripped() {
        let d = tempdir().unwrap();
        let f = body(d.path(), b"foobar");
        let res = process_method(&Method::Put, String::from("/?x=1"), f, 6, d.path());
        assert_eq!(res.typ, RequestResultType::Changed);
    }
}

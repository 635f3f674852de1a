use std::str::FromStr;

use tiny_http::{
    StatusCode,
    Request,
    Response,
    Header,
    HeaderField,
};
use ascii::AsciiString;

use mime::Mime;

use crate::record::{
    RequestResult,
    RequestResultType,
};

use log::{debug};

/// Content type for a route, decided by path extension alone. The store
/// keeps no per-record type metadata; anything unrecognized is served as
/// an octet stream.
pub fn mime_for_extension(extension: Option<String>) -> Mime {
    let ext = match extension {
        Some(v) => {
            v
        },
        None => {
            return mime::APPLICATION_OCTET_STREAM;
        },
    };
    match ext.as_str() {
        "/" => mime::APPLICATION_JSON,
        "txt" => mime::TEXT_PLAIN_UTF_8,
        "md" => mime::TEXT_PLAIN_UTF_8,
        "csv" => mime::TEXT_CSV_UTF_8,
        "json" => mime::APPLICATION_JSON,
        "htm" => mime::TEXT_HTML_UTF_8,
        "html" => mime::TEXT_HTML_UTF_8,
        "png" => mime::IMAGE_PNG,
        "jpg" => mime::IMAGE_JPEG,
        "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "svg" => mime::IMAGE_SVG,
        "pdf" => mime::APPLICATION_PDF,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

pub fn origin_headers() -> Vec<Header> {
    let mut headers: Vec<Header> = vec!();
    headers.push(Header{
        field: HeaderField::from_str("Access-Control-Allow-Origin").unwrap(),
        value: AsciiString::from_ascii("*").unwrap(),
    });
    headers.push(Header{
        field: HeaderField::from_str("Access-Control-Allow-Methods").unwrap(),
        value: AsciiString::from_ascii("OPTIONS, PUT, GET").unwrap(),
    });
    headers.push(Header{
        field: HeaderField::from_str("Access-Control-Allow-Headers").unwrap(),
        value: AsciiString::from_ascii("Content-Type").unwrap(),
    });

    let server_header_v = format!("hashery/{}, tiny_http (Rust)", env!("CARGO_PKG_VERSION"));
    headers.push(Header{
            field: HeaderField::from_str("Server").unwrap(),
            value: AsciiString::from_ascii(server_header_v).unwrap(),
        });

    headers
}

pub fn preflight_response(req: Request) {
    let auth_origin_headers = origin_headers();
    let res_status = StatusCode(200);
    let mut res = Response::empty(res_status);
    for v in auth_origin_headers.iter() {
        res.add_header(v.clone());
    }
    let _ = req.respond(res);
    debug!("served options request");
}

fn content_type_header(m: &Mime) -> Option<Header> {
    let v = AsciiString::from_ascii(m.as_ref()).ok()?;
    Some(Header{
        field: HeaderField::from_str("Content-Type").ok()?,
        value: v,
    })
}

fn disposition_header(m: &Mime) -> Option<Header> {
    let s = match m.type_() {
        mime::TEXT => {
            "inline"
        },
        mime::IMAGE => {
            "inline"
        },
        mime::APPLICATION => {
            match *m == mime::APPLICATION_JSON {
                true => "inline",
                false => "attachment",
            }
        },
        _ => {
            "attachment"
        },
    };
    Some(Header{
        field: HeaderField::from_str("Content-Disposition").ok()?,
        value: AsciiString::from_ascii(s).ok()?,
    })
}

pub fn exec_response(req: Request, r: RequestResult) {
    let res_status: StatusCode;
    match r.typ {
        RequestResultType::Found => {
            res_status = StatusCode(200);
        },
        RequestResultType::Changed => {
            res_status = StatusCode(200);
        },
        RequestResultType::WriteError => {
            res_status = StatusCode(500);
        },
        RequestResultType::ReadError => {
            res_status = StatusCode(500);
        },
        RequestResultType::InputError => {
            res_status = StatusCode(400);
        },
        RequestResultType::RecordError => {
            res_status = StatusCode(404);
        },
    }

    let auth_origin_headers = origin_headers();

    match r.v {
        Some(v) => {
            let mut res = Response::from_string(v);
            res = res.with_status_code(res_status);
            match &r.m {
                Some(m) => {
                    match content_type_header(m) {
                        Some(h) => {
                            res.add_header(h);
                        },
                        None => {},
                    };
                },
                None => {},
            };
            for v in auth_origin_headers.iter() {
                res.add_header(v.clone());
            }
            let _ = req.respond(res);
        },
        None => {
            match r.b {
                Some(b) => {
                    let mut res = Response::from_data(b);
                    let m = match &r.m {
                        Some(v) => {
                            v.clone()
                        },
                        None => {
                            mime::APPLICATION_OCTET_STREAM
                        },
                    };
                    match content_type_header(&m) {
                        Some(h) => {
                            res.add_header(h);
                        },
                        None => {},
                    };
                    match disposition_header(&m) {
                        Some(h) => {
                            res.add_header(h);
                        },
                        None => {},
                    };
                    res = res.with_status_code(res_status);
                    for v in auth_origin_headers.iter() {
                        res.add_header(v.clone());
                    }
                    let _ = req.respond(res);
                },
                None => {
                    let mut res = Response::empty(res_status);
                    for v in auth_origin_headers.iter() {
                        res.add_header(v.clone());
                    }
                    let _ = req.respond(res);
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mime_for_extension;

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension(Some(String::from("txt"))), mime::TEXT_PLAIN_UTF_8);
        assert_eq!(mime_for_extension(Some(String::from("/"))), mime::APPLICATION_JSON);
        assert_eq!(mime_for_extension(None), mime::APPLICATION_OCTET_STREAM);
        assert_eq!(mime_for_extension(Some(String::from("weird"))), mime::APPLICATION_OCTET_STREAM);
    }
}

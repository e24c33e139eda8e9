use db_setup::{Credentials, DatabaseService, QueryOptions, ServiceError, SupabaseClient};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::Once;
use std::thread::{self, JoinHandle};

/// A request as seen on the wire.
struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn json_body(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Serve exactly one canned HTTP response on a local port and hand back the
/// request that produced it.
fn serve_once(response: String) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            let (name, value) = line.split_once(':').unwrap();
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        let length = headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
            .map(|(_, v)| v.parse::<usize>().unwrap())
            .unwrap_or(0);
        let mut body = vec![0; length];
        reader.read_exact(&mut body).unwrap();

        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body,
        }
    });

    (url, handle)
}

fn response(status: &str, extra_headers: &[(&str, &str)], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {}\r\n", status);
    for (name, value) in extra_headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    ));
    out
}

static NO_PROXY: Once = Once::new();

fn client(url: &str) -> SupabaseClient {
    // The stub is local; a proxy from the environment would never reach it.
    NO_PROXY.call_once(|| {
        for proxy in ["HTTP_PROXY", "HTTPS_PROXY", "ALL_PROXY"] {
            std::env::remove_var(proxy);
            std::env::remove_var(proxy.to_lowercase());
        }
    });

    let credentials = Credentials::from_lookup(|name| match name {
        "SUPABASE_URL" => Some(url.to_string()),
        "SUPABASE_SERVICE_ROLE_KEY" => Some("service-key".to_string()),
        _ => None,
    })
    .unwrap();
    SupabaseClient::new(&credentials).unwrap()
}

#[test]
fn test_execute_sql_posts_to_rpc_with_key_headers() {
    let (url, server) = serve_once(response("204 No Content", &[], ""));

    client(&url).execute_sql("SELECT 1").unwrap();

    let req = server.join().unwrap();
    assert_eq!(req.request_line, "POST /rest/v1/rpc/exec_sql HTTP/1.1");
    assert_eq!(req.header("apikey"), Some("service-key"));
    assert_eq!(req.header("authorization"), Some("Bearer service-key"));
    assert!(req
        .header("content-type")
        .unwrap()
        .starts_with("application/json"));
    assert_eq!(req.json_body(), json!({ "sql": "SELECT 1" }));
}

#[test]
fn test_counted_query_reads_content_range() {
    let rows = r#"[{"symbol":"BTC"},{"symbol":"BTC"},{"symbol":"ETH"},{"symbol":"SOL"}]"#;
    let (url, server) = serve_once(response(
        "206 Partial Content",
        &[
            ("Content-Type", "application/json"),
            ("Content-Range", "0-3/12"),
        ],
        rows,
    ));

    let resp = client(&url)
        .query("price_history", "symbol", QueryOptions::exact_count())
        .unwrap();

    assert_eq!(resp.count, Some(12));
    assert_eq!(resp.rows.len(), 4);
    assert_eq!(resp.rows[2], json!({ "symbol": "ETH" }));

    let req = server.join().unwrap();
    assert_eq!(
        req.request_line,
        "GET /rest/v1/price_history?select=symbol HTTP/1.1"
    );
    assert_eq!(req.header("prefer"), Some("count=exact"));
    assert_eq!(req.header("apikey"), Some("service-key"));
}

#[test]
fn test_plain_query_sends_no_count_preference() {
    let (url, server) = serve_once(response(
        "200 OK",
        &[("Content-Type", "application/json")],
        r#"[{"symbol":"ADA"}]"#,
    ));

    let resp = client(&url)
        .query("price_history", "symbol", QueryOptions::default())
        .unwrap();

    assert_eq!(resp.count, None);
    assert_eq!(resp.rows, vec![json!({ "symbol": "ADA" })]);
    assert_eq!(server.join().unwrap().header("prefer"), None);
}

#[test]
fn test_postgrest_error_body_is_classified() {
    let body = r#"{"code":"42601","message":"syntax error at or near \"CREAT\"","details":null,"hint":null}"#;
    let (url, server) = serve_once(response(
        "400 Bad Request",
        &[("Content-Type", "application/json")],
        body,
    ));

    let err = client(&url).execute_sql("CREAT TABLE t ();").unwrap_err();
    server.join().unwrap();

    match err {
        ServiceError::Sql { code, message } => {
            assert_eq!(code, "42601");
            assert_eq!(message, "syntax error at or near \"CREAT\"");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_counted_query_without_content_range_is_invalid() {
    let (url, server) = serve_once(response(
        "200 OK",
        &[("Content-Type", "application/json")],
        "[]",
    ));

    let err = client(&url)
        .query("price_history", "symbol", QueryOptions::exact_count())
        .unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, ServiceError::InvalidResponse(_)));
}

//! End-to-end checks driving a real `Server` over a real TCP socket:
//! minimal GET, a malformed request line, a POST with a body, header
//! folding, query parsing, and pool overflow.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use blocking_http::{Response, Server, Status};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn start(handler: impl Fn(&blocking_http::Request) -> Response + Send + Sync + 'static) -> std::net::SocketAddr {
    init_logging();
    let mut server = Server::bind("127.0.0.1", 0, handler).expect("bind");
    let addr = server.local_addr().expect("local_addr");
    thread::spawn(move || {
        server.run();
    });
    // Give the accept loop a moment to reach the reactor's first `wait()`.
    thread::sleep(Duration::from_millis(20));
    addr
}

fn roundtrip(addr: std::net::SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut client = TcpStream::connect(addr).expect("connect");
    client.write_all(request).expect("write");
    client.shutdown(std::net::Shutdown::Write).ok();
    let mut out = Vec::new();
    client.read_to_end(&mut out).expect("read");
    out
}

#[test]
fn s1_minimal_get() {
    let addr = start(|_req| Response::new(Status::Ok, b"hi".to_vec(), "text/plain"));
    let out = roundtrip(addr, b"GET / HTTP/1.0\r\n\r\n");
    assert_eq!(
        out,
        b"HTTP/1.0 200 OK\r\nContent-Length: 2\r\nContent-Type: text/plain\r\n\r\nhi".to_vec()
    );
}

#[test]
fn s2_malformed_request_line() {
    let addr = start(|_req| Response::empty(Status::Ok));
    let out = roundtrip(addr, b"G@T / HTTP/1.0\r\n\r\n");
    assert_eq!(out, b"HTTP/1.0 400 Bad request\r\n".to_vec());
}

#[test]
fn s3_post_with_body_is_echoed() {
    let addr = start(|req| Response::new(Status::Ok, req.body().to_vec(), "text/plain"));
    let out = roundtrip(addr, b"POST /x HTTP/1.0\r\nContent-Length: 5\r\n\r\nhello");
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Content-Length: 5"));
    assert!(text.ends_with("hello"));
}

#[test]
fn s4_header_folding_joins_continuation_with_a_space() {
    let seen = Arc::new(std::sync::Mutex::new(String::new()));
    let seen_clone = Arc::clone(&seen);
    let addr = start(move |req| {
        if let Some(value) = req.headers().get("X") {
            *seen_clone.lock().unwrap() = value.to_string();
        }
        Response::empty(Status::Ok)
    });
    let out = roundtrip(addr, b"GET / HTTP/1.0\r\nX: a\r\n b\r\n\r\n");
    assert!(out.starts_with(b"HTTP/1.0 200 OK\r\n"));
    assert_eq!(seen.lock().unwrap().as_str(), "a b");
}

#[test]
fn s5_query_parsing_duplicate_keys_overwrite() {
    let addr = start(|req| {
        let uri = req.uri();
        assert_eq!(uri.absolute_path(), "/p");
        let query = uri.query();
        assert!(matches::matches!(query.get("a").map(String::as_str), Some("3")));
        assert!(matches::matches!(query.get("b").map(String::as_str), Some("2")));
        Response::empty(Status::Ok)
    });
    let out = roundtrip(addr, b"GET /p?a=1&b=2&a=3 HTTP/1.0\r\n\r\n");
    assert!(out.starts_with(b"HTTP/1.0 200 OK\r\n"));
}

#[test]
fn s6_pool_overflow_drops_connections_past_max_load() {
    use std::sync::atomic::{AtomicBool, Ordering};

    init_logging();
    let release = Arc::new(AtomicBool::new(false));
    let release_clone = Arc::clone(&release);
    let mut server = blocking_http::Server::bind_with_pool(
        "127.0.0.1",
        0,
        move |_req| {
            while !release_clone.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
            Response::empty(Status::Ok)
        },
        Some(1),
        2,
    )
    .expect("bind");
    let addr = server.local_addr().expect("local_addr");
    thread::spawn(move || {
        server.run();
    });
    thread::sleep(Duration::from_millis(20));

    // The first connection's handler spins on `release`, occupying the
    // pool's single worker; two more fit in the queue (max_load=2); a
    // fourth finds the queue already full and gets its socket dropped
    // with no response.
    let mut blocked = TcpStream::connect(addr).unwrap();
    blocked.write_all(b"GET /1 HTTP/1.0\r\n\r\n").unwrap();
    thread::sleep(Duration::from_millis(20));

    let mut queued_a = TcpStream::connect(addr).unwrap();
    queued_a.write_all(b"GET /2 HTTP/1.0\r\n\r\n").unwrap();
    let mut queued_b = TcpStream::connect(addr).unwrap();
    queued_b.write_all(b"GET /3 HTTP/1.0\r\n\r\n").unwrap();
    thread::sleep(Duration::from_millis(20));

    let mut overflow = TcpStream::connect(addr).unwrap();
    overflow.write_all(b"GET /4 HTTP/1.0\r\n\r\n").unwrap();
    let mut overflow_out = Vec::new();
    overflow.read_to_end(&mut overflow_out).unwrap();
    assert!(overflow_out.is_empty());

    release.store(true, Ordering::Release);
    for mut stream in [blocked, queued_a, queued_b] {
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert!(out.starts_with(b"HTTP/1.0 200 OK\r\n"));
    }
}

//! Minimal HTTP/1.1 camera emulator for integration tests.
//!
//! Speaks enough of the `cgi-bin/api.cgi` JSON API for a fetch run: Login,
//! Logout, GetDevInfo, Search and Download. Like real firmware, a Search
//! window that spans more than one day returns only the per-day bitmap.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EmulatedClip {
    /// Camera path, e.g. `Mp4Record/2024-01-01/RecM01_...mp4`.
    pub name: String,
    /// `(year, mon, day, hour, min, sec)`
    pub start: (i32, u32, u32, u32, u32, u32),
    pub end: (i32, u32, u32, u32, u32, u32),
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct CameraOptions {
    pub username: String,
    pub password: String,
    /// Answer the first Search after login with rspCode -6 (token expired).
    pub expire_first_token: bool,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "secret".to_string(),
            expire_first_token: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct CameraLog {
    pub logins: usize,
    pub logouts: usize,
    /// Search windows as `(StartTime, EndTime)` JSON objects.
    pub searches: Vec<(Value, Value)>,
    pub downloads: Vec<String>,
}

struct State {
    opts: CameraOptions,
    clips: Vec<EmulatedClip>,
    tokens_issued: u32,
    valid_token: Option<String>,
    expired_once: bool,
    log: CameraLog,
}

pub struct CameraServer {
    pub port: u16,
    state: Arc<Mutex<State>>,
}

impl CameraServer {
    pub fn with_log<R>(&self, f: impl FnOnce(&CameraLog) -> R) -> R {
        f(&self.state.lock().unwrap().log)
    }
}

/// Starts the emulator on an ephemeral port in a background thread. The
/// server runs until the process exits.
pub fn start(clips: Vec<EmulatedClip>, opts: CameraOptions) -> CameraServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State {
        opts,
        clips,
        tokens_issued: 0,
        valid_token: None,
        expired_once: false,
        log: CameraLog::default(),
    }));
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &state));
        }
    });
    CameraServer { port, state }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some((target, body)) = read_request(&mut stream) else {
        return;
    };
    let url = match url::Url::parse(&format!("http://camera{}", target)) {
        Ok(u) => u,
        Err(_) => return write_response(&mut stream, "400 Bad Request", "text/plain", b""),
    };
    let query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
    let cmd = query.get("cmd").cloned().unwrap_or_default();
    let token = query.get("token").cloned();

    let mut st = state.lock().unwrap();
    if cmd == "Login" {
        let reply = login(&mut st, &body);
        drop(st);
        return write_json(&mut stream, &reply);
    }

    if token.is_none() || token != st.valid_token {
        drop(st);
        return write_json(&mut stream, &error_reply(&cmd, -6, "please login first"));
    }

    match cmd.as_str() {
        "Logout" => {
            st.log.logouts += 1;
            st.valid_token = None;
            drop(st);
            write_json(&mut stream, &ok_reply("Logout", json!({"rspCode": 200})))
        }
        "GetDevInfo" => {
            drop(st);
            write_json(
                &mut stream,
                &ok_reply(
                    "GetDevInfo",
                    json!({"DevInfo": {"name": "Driveway", "model": "RLC-810A", "firmVer": "v3.1.0", "channelNum": 1}}),
                ),
            )
        }
        "Search" => {
            if st.opts.expire_first_token && !st.expired_once {
                st.expired_once = true;
                st.valid_token = None;
                drop(st);
                return write_json(&mut stream, &error_reply("Search", -6, "please login first"));
            }
            let reply = search(&mut st, &body);
            drop(st);
            write_json(&mut stream, &reply)
        }
        "Download" => {
            let source = query.get("source").cloned().unwrap_or_default();
            st.log.downloads.push(source.clone());
            let clip = st.clips.iter().find(|c| c.name == source).cloned();
            drop(st);
            match clip {
                Some(c) => write_response(&mut stream, "200 OK", "video/mp4", &c.body),
                None => write_json(&mut stream, &error_reply("Download", -12, "file not found")),
            }
        }
        _ => {
            drop(st);
            write_json(&mut stream, &error_reply(&cmd, -9, "not support"))
        }
    }
}

fn login(st: &mut State, body: &[u8]) -> Value {
    let req = first_param(body);
    let user = req.pointer("/User/userName").and_then(Value::as_str);
    let pass = req.pointer("/User/password").and_then(Value::as_str);
    if user != Some(st.opts.username.as_str()) || pass != Some(st.opts.password.as_str()) {
        return error_reply("Login", -7, "login failed");
    }
    st.tokens_issued += 1;
    let token = format!("tok{}", st.tokens_issued);
    st.valid_token = Some(token.clone());
    st.log.logins += 1;
    ok_reply("Login", json!({"Token": {"leaseTime": 3600, "name": token}}))
}

fn search(st: &mut State, body: &[u8]) -> Value {
    let param = first_param(body);
    let start = param.pointer("/Search/StartTime").cloned().unwrap_or(Value::Null);
    let end = param.pointer("/Search/EndTime").cloned().unwrap_or(Value::Null);
    st.log.searches.push((start.clone(), end.clone()));

    let (Some(s), Some(e)) = (time_key(&start), time_key(&end)) else {
        return error_reply("Search", -4, "param error");
    };
    let overlapping: Vec<&EmulatedClip> = st
        .clips
        .iter()
        .filter(|c| tuple_key(c.start) <= e && tuple_key(c.end) > s)
        .collect();

    // The bitmap covers each month the window touches and flags every day of
    // it with a recording, whatever the hours asked for.
    let mut months: BTreeMap<(i32, u32), Vec<u8>> = [s, e]
        .iter()
        .map(|k| (((k / 10_000_000_000) as i32, ((k / 100_000_000) % 100) as u32), vec![b'0'; 31]))
        .collect();
    for c in &st.clips {
        if let Some(table) = months.get_mut(&(c.start.0, c.start.1)) {
            table[(c.start.2 - 1) as usize] = b'1';
        }
    }
    let status: Vec<Value> = months
        .into_iter()
        .map(|((year, mon), t)| json!({"year": year, "mon": mon, "table": String::from_utf8(t).unwrap()}))
        .collect();

    let same_day = s / 1_000_000 == e / 1_000_000;
    let mut result = json!({"channel": 0, "Status": status});
    if same_day && !overlapping.is_empty() {
        let files: Vec<Value> = overlapping
            .iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    // Firmware sends the size as a string.
                    "size": c.body.len().to_string(),
                    "StartTime": time_json(c.start),
                    "EndTime": time_json(c.end),
                    "type": "main",
                })
            })
            .collect();
        result["File"] = Value::Array(files);
    }
    ok_reply("Search", json!({"SearchResult": result}))
}

fn first_param(body: &[u8]) -> Value {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get(0).and_then(|c| c.get("param")).cloned())
        .unwrap_or(Value::Null)
}

/// Sortable `YYYYMMDDhhmmss` number.
fn tuple_key(t: (i32, u32, u32, u32, u32, u32)) -> u64 {
    let (y, mo, d, h, mi, s) = t;
    (((((y as u64 * 100 + mo as u64) * 100 + d as u64) * 100 + h as u64) * 100 + mi as u64) * 100) + s as u64
}

fn time_key(v: &Value) -> Option<u64> {
    let f = |k: &str| v.get(k).and_then(Value::as_u64);
    Some(tuple_key((
        f("year")? as i32,
        f("mon")? as u32,
        f("day")? as u32,
        f("hour")? as u32,
        f("min")? as u32,
        f("sec")? as u32,
    )))
}

fn time_json(t: (i32, u32, u32, u32, u32, u32)) -> Value {
    json!({"year": t.0, "mon": t.1, "day": t.2, "hour": t.3, "min": t.4, "sec": t.5})
}

fn ok_reply(cmd: &str, value: Value) -> Value {
    json!([{"cmd": cmd, "code": 0, "value": value}])
}

fn error_reply(cmd: &str, rsp_code: i64, detail: &str) -> Value {
    json!([{"cmd": cmd, "code": 1, "error": {"rspCode": rsp_code, "detail": detail}}])
}

/// Reads the request head and a `Content-Length` body; returns the request
/// target (path + query) and the body.
fn read_request(stream: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let head_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&data[..head_end]).ok()?.to_string();
    let target = head.lines().next()?.split_whitespace().nth(1)?.to_string();
    let content_length = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = data[head_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    Some((target, body))
}

fn write_json(stream: &mut TcpStream, value: &Value) {
    let body = serde_json::to_vec(value).unwrap();
    write_response(stream, "200 OK", "application/json", &body);
}

fn write_response(stream: &mut TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

//! Engine-level scenarios driven through recording mock collaborators.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{json, Value};

use hearth_db::{
    Database, DatabaseConfig, Frame, Opcode, Scheduler, TimerToken, Transport, KEEPALIVE_INTERVAL,
};

#[derive(Default)]
struct TransportLog {
    sent: Vec<String>,
}

#[derive(Clone, Default)]
struct MockTransport(Rc<RefCell<TransportLog>>);

impl Transport for MockTransport {
    fn send_text(&mut self, payload: &str) {
        self.0.borrow_mut().sent.push(payload.to_string());
    }
}

#[derive(Default)]
struct SchedulerLog {
    next_token: u64,
    armed: Vec<(TimerToken, Duration)>,
    cancelled: Vec<TimerToken>,
}

#[derive(Clone, Default)]
struct MockScheduler(Rc<RefCell<SchedulerLog>>);

impl Scheduler for MockScheduler {
    fn run_delayed(&mut self, delay: Duration) -> TimerToken {
        let mut log = self.0.borrow_mut();
        log.next_token += 1;
        let token = TimerToken(log.next_token);
        log.armed.push((token, delay));
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.0.borrow_mut().cancelled.push(token);
    }
}

type TestDatabase = Database<MockTransport, MockScheduler>;

fn new_database() -> (
    TestDatabase,
    Rc<RefCell<TransportLog>>,
    Rc<RefCell<SchedulerLog>>,
) {
    let transport = MockTransport::default();
    let scheduler = MockScheduler::default();
    let sent = Rc::clone(&transport.0);
    let timers = Rc::clone(&scheduler.0);
    let config = DatabaseConfig::new("db.example.com", "mydb", "/things");
    (Database::new(config, transport, scheduler), sent, timers)
}

fn text_frame(payload: &str) -> Frame {
    Frame::text(payload.as_bytes().to_vec())
}

fn count_updates(db: &mut TestDatabase) -> Rc<RefCell<usize>> {
    let count = Rc::new(RefCell::new(0usize));
    let hook = Rc::clone(&count);
    db.set_update_handler(move || *hook.borrow_mut() += 1);
    count
}

#[test]
fn publish_is_locally_visible_and_sent() {
    let (mut db, sent, _) = new_database();
    let id = db.publish("/a", json!({"foo": {"bar": 1}})).unwrap();

    assert_eq!(id, 1);
    assert_eq!(db.get("/a/foo/bar"), Some(json!(1)));

    let frames = &sent.borrow().sent;
    assert_eq!(frames.len(), 1);
    let envelope: Value = serde_json::from_str(&frames[0]).unwrap();
    assert_eq!(
        envelope,
        json!({"t": "d", "d": {"r": 1, "a": "p", "b": {"p": "/a", "d": {"foo": {"bar": 1}}}}})
    );
}

#[test]
fn publish_request_ids_are_monotonic() {
    let (mut db, sent, _) = new_database();
    assert_eq!(db.publish("/a", json!(1)).unwrap(), 1);
    assert_eq!(db.publish("/b", json!(2)).unwrap(), 2);
    assert_eq!(db.publish("/c", json!(3)).unwrap(), 3);

    let ids: Vec<u64> = sent
        .borrow()
        .sent
        .iter()
        .map(|frame| {
            let envelope: Value = serde_json::from_str(frame).unwrap();
            envelope["d"]["r"].as_u64().unwrap()
        })
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn publish_null_deletes_locally() {
    let (mut db, sent, _) = new_database();
    db.publish("/a/b", json!(1)).unwrap();
    db.publish("/a/b", Value::Null).unwrap();

    assert_eq!(db.get("/a/b"), None);
    assert_eq!(db.get("/a"), None);
    assert_eq!(db.get(""), Some(json!({})));
    // Both writes went out regardless of the local deletion.
    assert_eq!(sent.borrow().sent.len(), 2);
}

#[test]
fn inbound_replace_updates_the_mirror() {
    let (mut db, _, _) = new_database();
    let updates = count_updates(&mut db);
    db.publish("/a", json!({"foo": {"bar": 1}})).unwrap();

    db.handle_frame(text_frame(
        r#"{"t":"d","d":{"a":"d","b":{"p":"/a/foo","d":{"bar":2}}}}"#,
    ));

    assert_eq!(db.get("/a/foo/bar"), Some(json!(2)));
    assert_eq!(*updates.borrow(), 1);
}

#[test]
fn inbound_merge_fires_the_callback_once() {
    let (mut db, _, _) = new_database();
    let updates = count_updates(&mut db);
    db.handle_frame(text_frame(
        r#"{"t":"d","d":{"a":"d","b":{"p":"/a","d":{"foo":{"bar":2}}}}}"#,
    ));
    assert_eq!(*updates.borrow(), 1);

    db.handle_frame(text_frame(
        r#"{"t":"d","d":{"a":"m","b":{"p":"/a","d":{"x":1,"y":null}}}}"#,
    ));

    assert_eq!(db.get("/a/x"), Some(json!(1)));
    assert_eq!(db.get("/a/y"), None);
    // A key the merge did not name is retained.
    assert_eq!(db.get("/a/foo/bar"), Some(json!(2)));
    // Once per frame, not once per merge entry.
    assert_eq!(*updates.borrow(), 2);
}

#[test]
fn merge_with_failing_entry_is_dropped_whole() {
    let (mut db, _, _) = new_database();
    let updates = count_updates(&mut db);

    // The first entry writes a scalar at /a; the second tries to walk
    // through it. The frame must be dropped without mutating the mirror,
    // so the silent drop and the missing callback agree.
    db.handle_frame(text_frame(
        r#"{"t":"d","d":{"a":"m","b":{"p":"","d":{"a":1,"a/b":2}}}}"#,
    ));

    assert_eq!(db.get("/a"), None);
    assert_eq!(db.get(""), Some(json!({})));
    assert_eq!(*updates.borrow(), 0);
}

#[test]
fn connection_command_records_the_real_host() {
    let (mut db, _, _) = new_database();
    let updates = count_updates(&mut db);
    db.publish("/a", json!(1)).unwrap();

    assert_eq!(db.real_host(), None);
    db.handle_frame(text_frame(
        r#"{"t":"c","d":{"t":"h","d":{"h":"s-host-1.example.com"}}}"#,
    ));

    assert_eq!(db.real_host(), Some("s-host-1.example.com"));
    // Tree and callback are unaffected by connection commands.
    assert_eq!(db.get("/a"), Some(json!(1)));
    assert_eq!(*updates.borrow(), 0);
}

#[test]
fn redirect_records_host_without_reconnecting() {
    let (mut db, sent, _) = new_database();
    db.handle_frame(text_frame(
        r#"{"t":"c","d":{"t":"r","d":{"h":"s-host-2.example.com"}}}"#,
    ));

    assert_eq!(db.real_host(), Some("s-host-2.example.com"));
    // Nothing was sent; reconnection is the caller's decision.
    assert!(sent.borrow().sent.is_empty());
}

#[test]
fn keepalive_sends_immediately_then_reschedules() {
    let (mut db, sent, timers) = new_database();
    db.connect();

    assert_eq!(sent.borrow().sent, vec!["0"]);
    let first = {
        let log = timers.borrow();
        assert_eq!(log.armed.len(), 1);
        assert_eq!(log.armed[0].1, KEEPALIVE_INTERVAL);
        log.armed[0].0
    };

    db.handle_timer(first);
    assert_eq!(sent.borrow().sent, vec!["0", "0"]);
    assert_eq!(timers.borrow().armed.len(), 2);

    // A stale token does nothing.
    db.handle_timer(first);
    assert_eq!(sent.borrow().sent.len(), 2);
    assert_eq!(timers.borrow().armed.len(), 2);
}

#[test]
fn keepalive_has_no_data_side_effects() {
    let (mut db, _, timers) = new_database();
    let updates = count_updates(&mut db);
    db.connect();
    let token = timers.borrow().armed[0].0;
    db.handle_timer(token);

    assert_eq!(db.get(""), Some(json!({})));
    assert_eq!(*updates.borrow(), 0);
}

#[test]
fn disconnect_cancels_the_pending_keepalive() {
    let (mut db, _, timers) = new_database();
    db.connect();
    let token = timers.borrow().armed[0].0;

    db.disconnect();
    assert_eq!(timers.borrow().cancelled, vec![token]);

    // A cancelled token that fires anyway is ignored.
    db.handle_timer(token);
    assert_eq!(timers.borrow().armed.len(), 1);
}

#[test]
fn drop_cancels_the_pending_keepalive() {
    let (mut db, _, timers) = new_database();
    db.connect();
    let token = timers.borrow().armed[0].0;

    drop(db);
    assert_eq!(timers.borrow().cancelled, vec![token]);
}

#[test]
fn reconnect_rearms_a_fresh_keepalive() {
    let (mut db, sent, timers) = new_database();
    db.connect();
    let first = timers.borrow().armed[0].0;
    db.connect();

    assert_eq!(sent.borrow().sent, vec!["0", "0"]);
    assert_eq!(timers.borrow().cancelled, vec![first]);
    assert_eq!(timers.borrow().armed.len(), 2);
}

#[test]
fn malformed_frames_change_nothing() {
    let (mut db, sent, _) = new_database();
    let updates = count_updates(&mut db);
    db.publish("/a", json!({"b": 1})).unwrap();
    let sends_before = sent.borrow().sent.len();

    let malformed = [
        "",
        "not json",
        "0",
        "[1,2,3]",
        r#"{"t":"x","d":{}}"#,
        r#"{"t":"d","d":{"r":"four","a":"d","b":{"p":"/a","d":2}}}"#,
        r#"{"t":"d","d":{"b":{"p":"/a","d":2}}}"#,
        r#"{"t":"d","d":{"a":"q","b":{"p":"/a","d":2}}}"#,
        r#"{"t":"d","d":{"a":"d"}}"#,
        // Merge with a non-object patch value is a protocol error.
        r#"{"t":"d","d":{"a":"m","b":{"p":"/a","d":[1,2]}}}"#,
        // Replace whose path walks through a scalar.
        r#"{"t":"d","d":{"a":"d","b":{"p":"/a/b/c","d":2}}}"#,
        r#"{"t":"c","d":{"t":"h","d":{"h":""}}}"#,
    ];
    for payload in malformed {
        db.handle_frame(text_frame(payload));
    }
    for opcode in [
        Opcode::Binary,
        Opcode::Ping,
        Opcode::Pong,
        Opcode::Close,
        Opcode::Continue,
    ] {
        db.handle_frame(Frame {
            opcode,
            payload: br#"{"t":"d","d":{"a":"d","b":{"p":"/a","d":9}}}"#.to_vec(),
        });
    }

    assert_eq!(db.get("/a"), Some(json!({"b": 1})));
    assert_eq!(db.real_host(), None);
    assert_eq!(*updates.borrow(), 0);
    assert_eq!(sent.borrow().sent.len(), sends_before);
}

#[test]
fn root_replace_from_the_wire() {
    let (mut db, _, _) = new_database();
    db.publish("/old", json!(1)).unwrap();

    db.handle_frame(text_frame(
        r#"{"t":"d","d":{"a":"d","b":{"p":"","d":{"fresh":true}}}}"#,
    ));

    assert_eq!(db.get(""), Some(json!({"fresh": true})));
    assert_eq!(db.get("/old"), None);
}

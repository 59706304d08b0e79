#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use witlink_common::{Command, Frame, FrameType, PAYLOAD_LEN};
use witlink_host::transport::{NOTIFY_CHAR_UUID, SERVICE_UUID, WRITE_CHAR_UUID};
use witlink_host::{NotifySink, ServiceInfo, Transport, TransportError};

#[derive(Default)]
pub struct MockState {
    pub connected: bool,
    pub connects: usize,
    pub disconnects: usize,
    pub unsubscribes: usize,
    /// `unsubscribes` at the time of each disconnect
    pub unsubscribes_at_disconnect: Vec<usize>,
    pub sink: Option<NotifySink>,
    pub writes: Vec<(Instant, Command)>,
}

/// In-memory transport. Everything it sees is recorded in `state`.
pub struct MockTransport {
    pub state: Arc<Mutex<MockState>>,
    pub services: Vec<ServiceInfo>,
    pub fail_connect: bool,
    pub fail_writes: bool,
    pub write_delay: Duration,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_characteristics(&[NOTIFY_CHAR_UUID, WRITE_CHAR_UUID])
    }

    pub fn with_characteristics(chars: &[&str]) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            services: vec![
                ServiceInfo {
                    uuid: "00001800-0000-1000-8000-00805f9b34fb".to_string(),
                    characteristics: vec!["00002a00-0000-1000-8000-00805f9b34fb".to_string()],
                },
                ServiceInfo {
                    uuid: SERVICE_UUID.to_uppercase(),
                    characteristics: chars.iter().map(|c| c.to_string()).collect(),
                },
            ],
            fail_connect: false,
            fail_writes: false,
            write_delay: Duration::ZERO,
        }
    }

    pub fn without_service() -> Self {
        let mut t = Self::new();
        t.services.truncate(1);
        t
    }

    pub fn handle(&self) -> Arc<Mutex<MockState>> {
        self.state.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.fail_connect {
            return Err(TransportError::Connect("out of range".to_string()));
        }
        let mut s = self.state.lock().unwrap();
        s.connected = true;
        s.connects += 1;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        let mut s = self.state.lock().unwrap();
        s.connected = false;
        s.disconnects += 1;
        let unsubscribes = s.unsubscribes;
        s.unsubscribes_at_disconnect.push(unsubscribes);
        s.sink = None;
        Ok(())
    }

    async fn discover_services(&mut self) -> Result<Vec<ServiceInfo>, TransportError> {
        Ok(self.services.clone())
    }

    async fn subscribe_notify(
        &mut self,
        _characteristic: &str,
        sink: NotifySink,
    ) -> Result<(), TransportError> {
        self.state.lock().unwrap().sink = Some(sink);
        Ok(())
    }

    async fn unsubscribe_notify(&mut self, _characteristic: &str) -> Result<(), TransportError> {
        let mut s = self.state.lock().unwrap();
        s.unsubscribes += 1;
        s.sink = None;
        Ok(())
    }

    async fn write_characteristic(
        &mut self,
        characteristic: &str,
        data: &[u8],
    ) -> Result<(), TransportError> {
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }
        if self.fail_writes {
            return Err(TransportError::Write {
                characteristic: characteristic.to_string(),
                reason: "gatt error".to_string(),
            });
        }
        let cmd = Command::from_bytes(data).expect("only commands are written");
        self.state.lock().unwrap().writes.push((Instant::now(), cmd));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }
}

pub fn push_notification(state: &Arc<Mutex<MockState>>, chunk: &[u8]) {
    let s = state.lock().unwrap();
    s.sink
        .as_ref()
        .expect("not subscribed")
        .send(chunk.to_vec())
        .expect("drain task gone");
}

pub fn written(state: &Arc<Mutex<MockState>>) -> Vec<Command> {
    state.lock().unwrap().writes.iter().map(|(_, c)| *c).collect()
}

pub fn motion_frame(words: [i16; 9]) -> Frame {
    let mut payload = [0u8; PAYLOAD_LEN];
    for (i, w) in words.iter().enumerate() {
        payload[i * 2..i * 2 + 2].copy_from_slice(&w.to_le_bytes());
    }
    Frame::new(FrameType::Motion, &payload)
}

pub fn orientation_frame(register: u8, words: &[i16]) -> Frame {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[0] = register;
    for (i, w) in words.iter().enumerate() {
        payload[2 + i * 2..4 + i * 2].copy_from_slice(&w.to_le_bytes());
    }
    Frame::new(FrameType::Orientation, &payload)
}

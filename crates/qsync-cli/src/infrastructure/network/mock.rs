//! Scripted hub transport for unit and integration testing.
//!
//! [`ScriptedConnector`] hands out transports that replay a fixed byte
//! script (what the hub would send) and record everything written to them.
//! A shared [`SessionLog`] lets tests inspect sent bytes and check that every
//! connection was released, even after the transport has been dropped.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use qsync_core::protocol::codec::{
    encode_count_header, encode_group_record, encode_scene_record,
};
use qsync_core::{Frame, Group, Scene};

use crate::application::transport::{HubConnector, HubTransport, TransportError};

/// Builder for the bytes a simulated hub sends on one connection.
#[derive(Debug, Clone, Default)]
pub struct HubScript {
    bytes: Vec<u8>,
}

impl HubScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arbitrary frame.
    pub fn frame(mut self, frame: &Frame) -> Self {
        self.bytes.extend_from_slice(&frame.to_bytes());
        self
    }

    /// Appends raw bytes, for malformed-input tests.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn count_header(self, group_count: u16, scene_count: u16) -> Self {
        self.frame(&encode_count_header(group_count, scene_count))
    }

    /// Appends a group record.  Panics if the group cannot be encoded.
    pub fn group(self, group: &Group) -> Self {
        let frame = encode_group_record(group).expect("test group must be encodable");
        self.frame(&frame)
    }

    /// Appends a scene record.  Panics if the scene cannot be encoded.
    pub fn scene(self, scene: &Scene) -> Self {
        let frame = encode_scene_record(scene).expect("test scene must be encodable");
        self.frame(&frame)
    }

    /// Appends a full catalog dump: header, then groups, then scenes.
    pub fn catalog(self, groups: &[Group], scenes: &[Scene]) -> Self {
        let script = self.count_header(groups.len() as u16, scenes.len() as u16);
        let script = groups.iter().fold(script, |s, g| s.group(g));
        scenes.iter().fold(script, |s, sc| s.scene(sc))
    }

    /// Appends the empty inbound frame the simulated hub uses as a command acknowledgement.
    pub fn acknowledgement(self) -> Self {
        self.frame(&Frame::catalog_query())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// What happened across all connections made by one [`ScriptedConnector`].
#[derive(Debug, Default)]
pub struct SessionLog {
    /// Number of successful `connect` calls.
    pub connections: usize,
    /// Number of transports dropped.
    pub released: usize,
    /// Every byte written, across all connections, in order.
    pub sent: Vec<u8>,
}

/// A [`HubConnector`] whose transports replay a script from memory.
pub struct ScriptedConnector {
    script: Vec<u8>,
    refuse: bool,
    log: Arc<Mutex<SessionLog>>,
}

impl ScriptedConnector {
    /// Every connection replays `script` from the start.
    pub fn new(script: HubScript) -> Self {
        Self {
            script: script.into_bytes(),
            refuse: false,
            log: Arc::new(Mutex::new(SessionLog::default())),
        }
    }

    /// A connector whose `connect` always fails.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::new(HubScript::new())
        }
    }

    /// Shared handle to the session log.
    pub fn log(&self) -> Arc<Mutex<SessionLog>> {
        Arc::clone(&self.log)
    }

    pub fn connections(&self) -> usize {
        self.log.lock().expect("lock poisoned").connections
    }

    pub fn released(&self) -> usize {
        self.log.lock().expect("lock poisoned").released
    }

    pub fn sent(&self) -> Vec<u8> {
        self.log.lock().expect("lock poisoned").sent.clone()
    }
}

impl HubConnector for ScriptedConnector {
    type Transport = ScriptedTransport;

    fn connect(&self) -> Result<ScriptedTransport, TransportError> {
        if self.refuse {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "scripted refusal",
            )));
        }
        self.log.lock().expect("lock poisoned").connections += 1;
        Ok(ScriptedTransport::with_log(
            self.script.clone(),
            Arc::clone(&self.log),
        ))
    }
}

/// In-memory [`HubTransport`] replaying a byte script.
pub struct ScriptedTransport {
    inbound: VecDeque<u8>,
    log: Arc<Mutex<SessionLog>>,
}

impl ScriptedTransport {
    /// A standalone transport with its own log.
    pub fn new(script: HubScript) -> Self {
        Self::with_log(script.into_bytes(), Arc::new(Mutex::new(SessionLog::default())))
    }

    fn with_log(script: Vec<u8>, log: Arc<Mutex<SessionLog>>) -> Self {
        Self {
            inbound: script.into(),
            log,
        }
    }

    /// Bytes written to this transport's log so far.
    pub fn sent(&self) -> Vec<u8> {
        self.log.lock().expect("lock poisoned").sent.clone()
    }

    /// Script bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inbound.len()
    }
}

impl HubTransport for ScriptedTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.log
            .lock()
            .expect("lock poisoned")
            .sent
            .extend_from_slice(bytes);
        Ok(())
    }

    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        if self.inbound.len() < buf.len() {
            // The script ran dry: behave like a peer that hung up.
            self.inbound.clear();
            return Err(TransportError::Closed);
        }
        let len = buf.len();
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..len)) {
            *slot = byte;
        }
        Ok(())
    }
}

impl Drop for ScriptedTransport {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.released += 1;
        }
    }
}

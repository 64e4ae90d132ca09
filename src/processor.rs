/*!
One request/response cycle against a southbound service

The processor builds a request packet from a catalogue entry, pushes
it onto the client session, invokes the session and classifies the
result code it gets back.

An empty read is reported by the southbound services as a missing
instance. For list reads this is not an error, so the result code is
exempted and the request succeeds with an empty response.
*/

use conf::GatewayConf;
use factory::{StructFactory, INDEX};
use ipc::error::{Error, Result};
use ipc::units::IpcDataUnit;
use ipc::ClientSession;
use request::{IpcRequest, IpcRequestPacket};
use result_code::{create_error_json, ErrorJson};
use serde_json::Value;
use std::str::FromStr;
use unc::*;

/// Service ids of the logical service
const UPLL_CONFIG_SERVICE: u32 = 0;
const UPLL_READ_SERVICE: u32 = 1;
/// Service ids of the physical service
const UPPL_CONFIG_SERVICE: u32 = 1;
const UPPL_READ_SERVICE: u32 = 2;

/// Where the processor is in the request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    /// A packet is built but not processed yet
    Unsent,
    /// The session is being invoked
    Sent,
    /// The session failed or returned a fatal status
    Fatal,
    /// The response does not start with a result code
    NoResultCode,
    Success,
    /// The service returned an error result code
    Error,
    /// The service found no instance, which is fine for this read
    ExemptedSuccess,
}

pub struct IpcRequestProcessor<'a, S: ClientSession> {
    session: S,
    conf: &'a GatewayConf,
    session_id: u32,
    config_id: u32,
    packet: Option<IpcRequestPacket>,
    service: Option<(String, u32)>,
    state: ProcessorState,
    error_json: Option<ErrorJson>,
}

/// Takes `body.max_repetition` if it is a number below the ceiling
fn max_repetition(body: &Value, ceiling: u32) -> u32 {
    let requested = match body.get("max_repetition") {
        Some(&Value::Number(ref n)) => n.as_u64(),
        Some(&Value::String(ref s)) => u64::from_str(s.trim()).ok(),
        _ => None,
    };
    match requested {
        Some(n) if n < u64::from(ceiling) => n as u32,
        _ => ceiling,
    }
}

/// The result code of a missing instance in the key type's namespace
fn no_such_instance(key_type: KeyType) -> Option<u32> {
    match key_type.range() {
        KeyTypeRange::Logical => Some(UPLL_RC_ERR_NO_SUCH_INSTANCE),
        KeyTypeRange::Physical => Some(UPPL_RC_ERR_NO_SUCH_INSTANCE),
        KeyTypeRange::Unclassified => None,
    }
}

/// Checks whether `result_code` means an empty result for this packet
fn is_exempted(packet: &IpcRequestPacket, result_code: u32) -> bool {
    let list_read = packet.operation.is_sibling_read() || packet.request.is_read_as_list();
    let multi_call = packet.request.is_multi_call() && packet.option2 != Option2::Neighbor;
    (list_read || multi_call) && no_such_instance(packet.key_type) == Some(result_code)
}

impl<'a, S: ClientSession> IpcRequestProcessor<'a, S> {
    pub fn new(session: S, conf: &'a GatewayConf, session_id: u32, config_id: u32) -> Self {
        IpcRequestProcessor {
            session: session,
            conf: conf,
            session_id: session_id,
            config_id: config_id,
            packet: None,
            service: None,
            state: ProcessorState::Unsent,
            error_json: None,
        }
    }

    /// Builds the packet for `request` and makes it the current one.
    /// Reads are adjusted by `max_repetition`, `targetdb` and `op` of the body.
    pub fn create_ipc_request_packet(
        &mut self,
        request: IpcRequest,
        body: &Value,
        uri: &[String],
    ) -> Result<()> {
        let descriptor = request.descriptor();
        let factory = StructFactory::new(self.conf);
        let key = factory.build(descriptor.key, body, uri)?;
        let value = match descriptor.value {
            Some(kind) => Some(factory.build(kind, body, uri)?),
            None => None,
        };

        let mut packet = IpcRequestPacket {
            request: request,
            session_id: self.session_id,
            config_id: self.config_id,
            operation: descriptor.operation,
            max_rep_count: 0,
            option1: descriptor.option1,
            option2: descriptor.option2,
            data_type: descriptor.data_type,
            key_type: descriptor.key_type,
            key: key,
            value: value,
            extra_data_units: vec![],
        };

        if packet.operation.is_read_family() {
            packet.max_rep_count = max_repetition(body, self.conf.max_repetition);

            if let Some(dt) = body
                .get("targetdb")
                .and_then(Value::as_str)
                .and_then(DataType::from_target_db)
            {
                packet.data_type = dt;
            }

            match body.get("op").and_then(Value::as_str) {
                Some("count") => packet.operation = Operation::ReadSiblingCount,
                Some("detail") | Some("normal") | Some("info") => {
                    packet.operation = if body.get(INDEX).is_some() {
                        Operation::ReadSibling
                    }
                    else {
                        Operation::ReadSiblingBegin
                    };
                }
                _ => {}
            }
        }

        debug!("Created packet {}", packet);
        self.set_ipc_request_packet(packet);
        Ok(())
    }

    /// Makes an already built packet the current one
    pub fn set_ipc_request_packet(&mut self, packet: IpcRequestPacket) {
        self.packet = Some(packet);
        self.state = ProcessorState::Unsent;
        self.error_json = None;
    }

    pub fn packet(&self) -> Option<&IpcRequestPacket> {
        self.packet.as_ref()
    }

    /// Adds a data unit to be pushed after the structs of the current packet
    pub fn add_extra_data_unit(&mut self, unit: IpcDataUnit) -> Result<()> {
        match self.packet {
            Some(ref mut packet) => {
                packet.extra_data_units.push(unit);
                Ok(())
            }
            None => Err(Error::Internal("no request packet".to_owned())),
        }
    }

    /// Addresses the following requests to another service
    pub fn set_service_info(&mut self, name: &str, id: u32) {
        self.service = Some((name.to_owned(), id));
    }

    /// Picks the service handling `operation` on `key_type`.
    /// Key types owned by no service have none.
    pub fn service_for(&self, key_type: KeyType, operation: Operation) -> Option<(String, u32)> {
        let services = &self.conf.services;
        let read = operation.is_read_family();
        match key_type.range() {
            KeyTypeRange::Logical => Some((
                services.logical.clone(),
                if read { UPLL_READ_SERVICE } else { UPLL_CONFIG_SERVICE },
            )),
            KeyTypeRange::Physical => Some((
                services.physical.clone(),
                if read { UPPL_READ_SERVICE } else { UPPL_CONFIG_SERVICE },
            )),
            KeyTypeRange::Unclassified => None,
        }
    }

    /// Sends the current packet and classifies the response
    pub fn process_ipc_request(&mut self) -> Result<()> {
        let packet = match self.packet {
            Some(ref p) => p,
            None => return Err(Error::Internal("no request packet".to_owned())),
        };
        info!("Processing {}", packet);

        if let Some((ref name, id)) = self.service {
            self.session.reset(name, id)?;
        }
        for unit in packet.units() {
            self.session.add_output(unit)?;
        }

        self.state = ProcessorState::Sent;
        let status = match self.session.invoke() {
            Ok(s) => s,
            Err(e) => {
                error!("Session failed on {}: {}", packet.request, e);
                self.state = ProcessorState::Fatal;
                return Err(match e {
                    Error::Io(_) | Error::Decode(_) | Error::IpcOp(_) => e,
                    other => Error::IpcOp(other.to_string()),
                });
            }
        };
        if status < 0 {
            error!("Fatal response status {} on {}", status, packet.request);
            self.state = ProcessorState::Fatal;
            return Err(Error::IpcOp(format!("fatal response status {}", status)));
        }

        let result_code = self
            .session
            .response(0)
            .and_then(IpcDataUnit::as_u64)
            .filter(|rc| *rc <= u64::from(u32::max_value()));
        let result_code = match result_code {
            Some(rc) => rc as u32,
            None => {
                error!("No result code in response to {}", packet.request);
                let error_json = ErrorJson::internal_server_error();
                self.state = ProcessorState::NoResultCode;
                self.error_json = Some(error_json.clone());
                return Err(Error::Service(error_json));
            }
        };

        if result_code == RC_SUCCESS {
            debug!("{} succeeded", packet.request);
            self.state = ProcessorState::Success;
            return Ok(());
        }
        if is_exempted(packet, result_code) {
            debug!("{} found no instance", packet.request);
            self.state = ProcessorState::ExemptedSuccess;
            return Ok(());
        }

        let error_json = create_error_json(result_code, packet.key_type as u32);
        warn!("{} failed with result code {}: {}", packet.request, result_code, error_json);
        self.state = ProcessorState::Error;
        self.error_json = Some(error_json.clone());
        Err(Error::Service(error_json))
    }

    /// The response units after the result code.
    /// Empty if the result code was exempted.
    pub fn get_ipc_response_packet(&self) -> Vec<IpcDataUnit> {
        if self.state == ProcessorState::ExemptedSuccess {
            return vec![];
        }
        (1..self.session.response_count())
            .filter_map(|i| self.session.response(i))
            .cloned()
            .collect()
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    /// The error body of the last failed request
    pub fn error_json(&self) -> Option<&ErrorJson> {
        self.error_json.as_ref()
    }

    pub fn session(&self) -> &S {
        &self.session
    }
}

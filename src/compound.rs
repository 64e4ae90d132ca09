/*!
Runs a document of requests as one compound operation

```json
{"requests": [
    {"request": "KT_VTN_CREATE", "uri": ["vtn1"], "body": {"vtn": {"description": "d"}}},
    {"request": "KT_VBRIDGE_CREATE", "uri": ["vtn1", "vbr1"]},
    {"request": "KT_VBRIDGE_GET", "uri": ["vtn1"], "body": {"op": "detail"}},
    {"request": "KT_PORT_GET", "uri": ["ctr1", "sw1"], "extra": [{"uint32": 5}]}
]}
```

`extra` lists data units appended to the packet after its structs,
each written as `{"<type>": <value>}`.

Every step is addressed to the service owning its key type. When a
step fails, the mutating steps before it are rolled back.
*/

use ipc::error::{Error, Result};
use ipc::units::IpcDataUnit;
use ipc::ClientSession;
use processor::IpcRequestProcessor;
use request::IpcRequest;
use rollback::IpcRollback;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct RequestDocument {
    pub requests: Vec<RequestStep>,
}

#[derive(Debug, Deserialize)]
pub struct RequestStep {
    /// A request name like `KT_VTN_CREATE`
    pub request: String,
    #[serde(default)]
    pub uri: Vec<String>,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub extra: Vec<Value>,
}

fn run_step<S: ClientSession>(processor: &mut IpcRequestProcessor<S>, step: &RequestStep) -> Result<IpcRequest> {
    let request = IpcRequest::from_name(&step.request)
        .ok_or_else(|| Error::Internal(format!("unknown request {}", step.request)))?;
    processor.create_ipc_request_packet(request, &step.body, &step.uri)?;
    for value in &step.extra {
        let unit = IpcDataUnit::from_json(value)
            .ok_or_else(|| Error::Internal(format!("bad extra data unit {}", value)))?;
        processor.add_extra_data_unit(unit)?;
    }

    let descriptor = request.descriptor();
    let operation = processor.packet().map_or(descriptor.operation, |p| p.operation);
    if let Some((name, id)) = processor.service_for(descriptor.key_type, operation) {
        processor.set_service_info(&name, id);
    }
    processor.process_ipc_request()?;
    Ok(request)
}

/// Runs `steps` in order and returns the responses of the reads.
/// On failure the error of the failing step is returned, or the
/// rollback error if compensating failed as well.
pub fn run_compound<S: ClientSession>(
    processor: &mut IpcRequestProcessor<S>,
    rollback: &mut IpcRollback,
    steps: &[RequestStep],
) -> Result<Vec<Value>> {
    let mut responses = vec![];
    for step in steps {
        match run_step(processor, step) {
            Ok(request) => {
                if let Some(packet) = processor.packet() {
                    if packet.operation.is_mutating() {
                        rollback.push_ipc_packet(packet.clone());
                    }
                    else if packet.operation.is_read_family() {
                        let units: Vec<_> = processor
                            .get_ipc_response_packet()
                            .iter()
                            .map(|u| u.to_json())
                            .collect();
                        responses.push(json!({
                            "request": request.name(),
                            "response": units,
                        }));
                    }
                }
            }
            Err(e) => {
                error!("{} failed in state {:?}: {}", step.request, processor.state(), e);
                if let Some(body) = processor.error_json() {
                    debug!("Error body {}", body.to_json());
                }
                rollback.roll_back_ipc_request(processor)?;
                return Err(e);
            }
        }
    }
    Ok(responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conf::{GatewayConf, RollbackOrder};
    use ipc::units::IpcDataUnit;
    use processor::tests::{result, RecordingSession};
    use serde_json;
    use structs::KeyVtn;
    use unc::Operation;

    fn document(s: &str) -> Vec<RequestStep> {
        serde_json::from_str::<RequestDocument>(s).unwrap().requests
    }

    #[test]
    fn reads_are_collected() {
        let conf = GatewayConf::default();
        let answer = Ok((
            0,
            vec![
                IpcDataUnit::Uint32(0),
                IpcDataUnit::Struct(
                    KeyVtn {
                        vtn_name: "vtn1".to_owned(),
                    }.into(),
                ),
            ],
        ));
        let session = RecordingSession::answering(vec![result(0), answer]);
        let mut processor = IpcRequestProcessor::new(session, &conf, 0, 0);
        let mut rollback = IpcRollback::new(RollbackOrder::Insertion);
        let steps = document(
            r#"{"requests": [
                {"request": "KT_VTN_CREATE", "uri": ["vtn1"]},
                {"request": "KT_VTN_GET", "body": {"op": "detail"}}
            ]}"#,
        );

        let responses = run_compound(&mut processor, &mut rollback, &steps).unwrap();
        assert_eq!(
            vec![json!({
                "request": "KT_VTN_GET",
                "response": [{"key_vtn": {"vtn_name": "vtn1"}}],
            })],
            responses
        );
        assert_eq!(1, rollback.len());
        assert_eq!(
            vec![("upll".to_owned(), 0), ("upll".to_owned(), 1)],
            processor.session().resets
        );
    }

    #[test]
    fn failure_rolls_back() {
        let conf = GatewayConf::default();
        let session = RecordingSession::answering(vec![result(0), result(0), result(17)]);
        let mut processor = IpcRequestProcessor::new(session, &conf, 0, 0);
        let mut rollback = IpcRollback::new(RollbackOrder::Insertion);
        let steps = document(
            r#"{"requests": [
                {"request": "KT_VTN_CREATE", "uri": ["vtn1"]},
                {"request": "KT_VBRIDGE_CREATE", "uri": ["vtn1", "vbr1"]},
                {"request": "KT_VBRIDGE_CREATE", "uri": ["vtn1", "vbr1"]}
            ]}"#,
        );

        let err = run_compound(&mut processor, &mut rollback, &steps).unwrap_err();
        assert_eq!("40901", err.code());
        assert!(rollback.is_empty());
        let session = processor.session();
        assert_eq!(5, session.invocations.len());
        assert_eq!(Operation::Delete as u64, session.operation(3));
        assert_eq!(Operation::Delete as u64, session.operation(4));
    }

    #[test]
    fn extra_units_are_sent() {
        let conf = GatewayConf::default();
        let session = RecordingSession::answering(vec![result(0)]);
        let mut processor = IpcRequestProcessor::new(session, &conf, 0, 0);
        let mut rollback = IpcRollback::new(RollbackOrder::Insertion);
        let steps = document(
            r#"{"requests": [
                {"request": "KT_PORT_GET", "uri": ["ctr1", "sw1"],
                 "extra": [{"uint32": 5}, {"string": "eth1"}]}
            ]}"#,
        );

        run_compound(&mut processor, &mut rollback, &steps).unwrap();
        let pushed = &processor.session().invocations[0];
        let n = pushed.len();
        assert_eq!(IpcDataUnit::Uint32(5), pushed[n - 2]);
        assert_eq!(IpcDataUnit::String("eth1".to_owned()), pushed[n - 1]);
    }

    #[test]
    fn bad_extra_unit() {
        let conf = GatewayConf::default();
        let mut processor = IpcRequestProcessor::new(RecordingSession::default(), &conf, 0, 0);
        let mut rollback = IpcRollback::new(RollbackOrder::Insertion);
        let steps = document(
            r#"{"requests": [{"request": "KT_VTN_GET", "extra": [{"uint8": 256}]}]}"#,
        );
        let err = run_compound(&mut processor, &mut rollback, &steps).unwrap_err();
        assert_eq!("INTERNAL_ERROR", err.code());
        assert!(processor.session().invocations.is_empty());
    }

    #[test]
    fn unknown_request() {
        let conf = GatewayConf::default();
        let mut processor = IpcRequestProcessor::new(RecordingSession::default(), &conf, 0, 0);
        let mut rollback = IpcRollback::new(RollbackOrder::Insertion);
        let steps = document(r#"{"requests": [{"request": "KT_UNKNOWN_GET"}]}"#);
        let err = run_compound(&mut processor, &mut rollback, &steps).unwrap_err();
        assert_eq!("INTERNAL_ERROR", err.code());
        assert!(processor.session().invocations.is_empty());
    }
}

/*!
Compensation of a partly applied compound operation

Every successful mutating request of a compound operation is pushed.
When a later request fails, the pushed packets are replayed with
CREATE turned into DELETE.
*/

use conf::RollbackOrder;
use ipc::error::{Error, Result};
use ipc::ClientSession;
use processor::IpcRequestProcessor;
use request::IpcRequestPacket;
use unc::Operation;

pub struct IpcRollback {
    packets: Vec<IpcRequestPacket>,
    order: RollbackOrder,
}

impl IpcRollback {
    pub fn new(order: RollbackOrder) -> IpcRollback {
        IpcRollback {
            packets: vec![],
            order: order,
        }
    }

    pub fn push_ipc_packet(&mut self, packet: IpcRequestPacket) {
        debug!("Pushing {} for rollback", packet);
        self.packets.push(packet);
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Replays the pushed packets through `processor`.
    /// Stops at the first failing replay. No packet is left pushed
    /// afterwards, whatever the outcome.
    pub fn roll_back_ipc_request<S: ClientSession>(
        &mut self,
        processor: &mut IpcRequestProcessor<S>,
    ) -> Result<()> {
        let mut packets: Vec<_> = self.packets.drain(..).collect();
        if self.order == RollbackOrder::Reverse {
            packets.reverse();
        }
        info!("Rolling back {} requests", packets.len());

        for mut packet in packets {
            if packet.operation == Operation::Create {
                packet.operation = Operation::Delete;
            }
            if let Some((name, id)) = processor.service_for(packet.key_type, packet.operation) {
                processor.set_service_info(&name, id);
            }
            processor.set_ipc_request_packet(packet);
            if let Err(e) = processor.process_ipc_request() {
                error!("Rollback aborted: {}", e);
                return Err(Error::Rollback(Box::new(e)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conf::GatewayConf;
    use processor::tests::{result, RecordingSession};
    use request::IpcRequest;
    use unc::KeyType;

    fn uri(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    /// Pushes a vtn and a controller creation and a vtn update
    fn pushed<S: ClientSession>(processor: &mut IpcRequestProcessor<S>, order: RollbackOrder) -> IpcRollback {
        let mut rollback = IpcRollback::new(order);
        let steps = [
            (IpcRequest::VtnCreate, uri(&["vtn1"])),
            (IpcRequest::ControllerCreate, uri(&["odc1"])),
            (IpcRequest::VtnUpdate, uri(&["vtn1"])),
        ];
        for &(request, ref uri) in steps.iter() {
            processor.create_ipc_request_packet(request, &json!({}), uri).unwrap();
            rollback.push_ipc_packet(processor.packet().unwrap().clone());
        }
        rollback
    }

    #[test]
    fn create_is_replayed_as_delete() {
        let conf = GatewayConf::default();
        let mut processor = IpcRequestProcessor::new(RecordingSession::default(), &conf, 0, 0);
        let mut rollback = pushed(&mut processor, RollbackOrder::Insertion);
        assert_eq!(3, rollback.len());

        rollback.roll_back_ipc_request(&mut processor).unwrap();
        assert!(rollback.is_empty());

        let session = processor.session();
        assert_eq!(3, session.invocations.len());
        assert_eq!(Operation::Delete as u64, session.operation(0));
        assert_eq!(Operation::Delete as u64, session.operation(1));
        assert_eq!(Operation::Update as u64, session.operation(2));
        assert_eq!(
            vec![
                ("upll".to_owned(), 0),
                ("uppl".to_owned(), 1),
                ("upll".to_owned(), 0),
            ],
            session.resets
        );
    }

    #[test]
    fn reverse_order() {
        let conf = GatewayConf::default();
        let mut processor = IpcRequestProcessor::new(RecordingSession::default(), &conf, 0, 0);
        let mut rollback = pushed(&mut processor, RollbackOrder::Reverse);
        rollback.roll_back_ipc_request(&mut processor).unwrap();

        let session = processor.session();
        assert_eq!(Operation::Update as u64, session.operation(0));
        assert_eq!(KeyType::Controller as u64, session.invocations[1][7].as_u64().unwrap());
    }

    #[test]
    fn failing_replay_aborts_and_clears() {
        let conf = GatewayConf::default();
        let session = RecordingSession::answering(vec![result(0), result(9)]);
        let mut processor = IpcRequestProcessor::new(session, &conf, 0, 0);
        let mut rollback = pushed(&mut processor, RollbackOrder::Insertion);

        let err = rollback.roll_back_ipc_request(&mut processor).unwrap_err();
        assert_eq!("ROLLBACK_ERROR", err.code());
        assert!(rollback.is_empty());
        // the update after the failing replay is never sent
        assert_eq!(2, processor.session().invocations.len());

        // nothing left to replay
        rollback.roll_back_ipc_request(&mut processor).unwrap();
        assert_eq!(2, processor.session().invocations.len());
    }
}

/*!
Client side of a UNC IPC session.

A session carries one request at a time: the caller pushes data units
with `add_output`, calls `invoke` and then reads the response units.
The `ClientSession` trait is the seam between the request processor
and the transport, `StreamSession` implements it on any byte stream.
*/

pub mod error;
pub mod units;

use conf::IpcConnection;
use ipc::error::{Error, Result};
use ipc::units::serialize::{IpcRequestFrame, IpcResponseFrame};
use ipc::units::IpcDataUnit;

use std::io::{Read, Write};
use std::net::TcpStream;

/// Status returned by `invoke` when the session itself failed
pub const RESP_FATAL: i32 = -1;

/// A client session towards one southbound service
pub trait ClientSession {
    /// Addresses the next request to another service and drops
    /// any pushed units and received responses
    fn reset(&mut self, service_name: &str, service_id: u32) -> Result<()>;

    /// Pushes one data unit of the next request
    fn add_output(&mut self, unit: IpcDataUnit) -> Result<()>;

    /// Sends the pushed units and waits for the response.
    /// Returns the session status, `RESP_FATAL` or any other
    /// negative value meaning that no usable response exists.
    fn invoke(&mut self) -> Result<i32>;

    /// Number of data units in the last response
    fn response_count(&self) -> usize;

    /// Gets one data unit of the last response
    fn response(&self, index: usize) -> Option<&IpcDataUnit>;
}

/// A session speaking the framed wire format on a byte stream
#[derive(Debug)]
pub struct StreamSession<S: Read + Write> {
    stream: S,
    request: IpcRequestFrame,
    responses: Vec<IpcDataUnit>,
}

/// The session used towards a running service
pub type TcpClientSession = StreamSession<TcpStream>;

impl TcpClientSession {
    /// Connects to the configured endpoint.
    /// Requests go to `service_name`/`service_id` until the next reset.
    pub fn connect(
        connection: &IpcConnection,
        service_name: &str,
        service_id: u32,
    ) -> Result<TcpClientSession> {
        let stream = TcpStream::connect(connection.socket)?;
        info!("Connected to {}", connection.socket);
        Ok(StreamSession::new(stream, service_name, service_id))
    }
}

impl<S: Read + Write> StreamSession<S> {
    pub fn new(stream: S, service_name: &str, service_id: u32) -> StreamSession<S> {
        StreamSession {
            stream: stream,
            request: IpcRequestFrame {
                service_name: service_name.to_owned(),
                service_id: service_id,
                units: vec![],
            },
            responses: vec![],
        }
    }
}

impl<S: Read + Write> ClientSession for StreamSession<S> {
    fn reset(&mut self, service_name: &str, service_id: u32) -> Result<()> {
        debug!("Resetting session to {}/{}", service_name, service_id);
        self.request.service_name = service_name.to_owned();
        self.request.service_id = service_id;
        self.request.units.clear();
        self.responses.clear();
        Ok(())
    }

    fn add_output(&mut self, unit: IpcDataUnit) -> Result<()> {
        self.request.units.push(unit);
        Ok(())
    }

    fn invoke(&mut self) -> Result<i32> {
        self.responses.clear();
        let sent = self.request.serialize(&mut self.stream);
        self.request.units.clear();
        sent?;
        let response = match IpcResponseFrame::deserialize(&mut self.stream) {
            Ok(r) => r,
            Err(Error::Decode(msg)) => {
                error!("Dropping malformed response: {}", msg);
                return Ok(RESP_FATAL);
            }
            Err(e) => return Err(e),
        };
        self.responses = response.units;
        Ok(response.status)
    }

    fn response_count(&self) -> usize {
        self.responses.len()
    }

    fn response(&self, index: usize) -> Option<&IpcDataUnit> {
        self.responses.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// Answers one request with its service id as result code
    /// followed by its units in reverse order.
    fn echo_service(listener: TcpListener) -> thread::JoinHandle<IpcRequestFrame> {
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = IpcRequestFrame::deserialize(&mut stream).unwrap();
            let mut units = vec![IpcDataUnit::Uint32(request.service_id)];
            units.extend(request.units.iter().rev().cloned());
            let response = IpcResponseFrame {
                status: 0,
                units: units,
            };
            response.serialize(&mut stream).unwrap();
            request
        })
    }

    #[test]
    fn tcp_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let connection = IpcConnection {
            socket: listener.local_addr().unwrap(),
        };
        let service = echo_service(listener);

        let mut session = TcpClientSession::connect(&connection, "upll", 0).unwrap();
        session.reset("uppl", 2).unwrap();
        session.add_output(IpcDataUnit::Uint32(7)).unwrap();
        session.add_output(IpcDataUnit::String("x".to_owned())).unwrap();
        assert_eq!(0, session.invoke().unwrap());

        assert_eq!(3, session.response_count());
        assert_eq!(Some(&IpcDataUnit::Uint32(2)), session.response(0));
        assert_eq!(Some(&IpcDataUnit::String("x".to_owned())), session.response(1));
        assert_eq!(None, session.response(3));

        let request = service.join().unwrap();
        assert_eq!("uppl", request.service_name);
        assert_eq!(2, request.units.len());
    }

    #[test]
    fn malformed_response_is_fatal() {
        use std::io::Cursor;

        // status 0, one unit with an unknown tag
        let stream = Cursor::new(vec![0, 0, 0, 0, 0, 0, 0, 1, 99]);
        let mut session = StreamSession::new(ReplayStream::new(stream), "upll", 0);
        assert_eq!(RESP_FATAL, session.invoke().unwrap());
        assert_eq!(0, session.response_count());
    }

    /// Reads from a canned buffer and swallows everything written
    struct ReplayStream<R: Read> {
        input: R,
    }

    impl<R: Read> ReplayStream<R> {
        fn new(input: R) -> ReplayStream<R> {
            ReplayStream { input: input }
        }
    }

    impl<R: Read> Read for ReplayStream<R> {
        fn read(&mut self, buf: &mut [u8]) -> ::std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl<R: Read> Write for ReplayStream<R> {
        fn write(&mut self, buf: &[u8]) -> ::std::io::Result<usize> {
            Ok(buf.len())
        }
        fn flush(&mut self) -> ::std::io::Result<()> {
            Ok(())
        }
    }
}

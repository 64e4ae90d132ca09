/*!
All serialization routines for data units and session frames

A frame is serialized into a buffer first, so a failing unit never
leaves half a frame on the stream.
*/

use byteorder::{NetworkEndian, WriteBytesExt};
use ipc::units::*;
use std::io;
use std::io::Write;

/// One request as sent on a session: the service it is addressed to
/// and the data units pushed for it
#[derive(Debug, Clone, PartialEq)]
pub struct IpcRequestFrame {
    pub service_name: String,
    pub service_id: u32,
    pub units: Vec<IpcDataUnit>,
}

/// One response as received on a session
#[derive(Debug, Clone, PartialEq)]
pub struct IpcResponseFrame {
    /// Status of the invocation; negative values are fatal
    pub status: i32,
    pub units: Vec<IpcDataUnit>,
}

fn too_long(what: &str, len: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{} of {} bytes does not fit into a data unit", what, len),
    )
}

impl IpcDataUnit {
    /// Serializes the tag and the payload of this unit
    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        stream.write_u8(self.tag() as u8)?;
        match *self {
            IpcDataUnit::Uint8(v) => stream.write_u8(v),
            IpcDataUnit::Uint16(v) => stream.write_u16::<NetworkEndian>(v),
            IpcDataUnit::Uint32(v) => stream.write_u32::<NetworkEndian>(v),
            IpcDataUnit::Uint64(v) => stream.write_u64::<NetworkEndian>(v),
            IpcDataUnit::Ipv4(ref a) => stream.write_all(&a.octets()),
            IpcDataUnit::Ipv6(ref a) => stream.write_all(&a.octets()),
            IpcDataUnit::String(ref s) => {
                if s.len() > 0xffff {
                    return Err(too_long("string", s.len()));
                }
                stream.write_u16::<NetworkEndian>(s.len() as u16)?;
                stream.write_all(s.as_bytes())
            }
            IpcDataUnit::Mac(ref m) => stream.write_all(m),
            IpcDataUnit::Null => Ok(()),
            IpcDataUnit::Struct(ref s) => {
                let name = s.name();
                let mut body = vec![];
                s.encode(&mut body)?;
                if body.len() > 0xffff {
                    return Err(too_long(name, body.len()));
                }
                stream.write_u8(name.len() as u8)?;
                stream.write_all(name.as_bytes())?;
                stream.write_u16::<NetworkEndian>(body.len() as u16)?;
                stream.write_all(&body)
            }
        }
    }
}

fn serialize_units<S: Write>(stream: &mut S, units: &[IpcDataUnit]) -> io::Result<()> {
    stream.write_u32::<NetworkEndian>(units.len() as u32)?;
    for unit in units {
        trace!("Outgoing unit: {}", unit);
        unit.serialize(stream)?;
    }
    Ok(())
}

impl IpcRequestFrame {
    /// Serializes this request with network byte order
    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        let name = self.service_name.as_bytes();
        if name.len() > 0xffff {
            return Err(too_long("service name", name.len()));
        }
        let mut buf = vec![];
        buf.write_u8(IPC_FRAME_VERSION)?;
        buf.write_u16::<NetworkEndian>(name.len() as u16)?;
        buf.write_all(name)?;
        buf.write_u32::<NetworkEndian>(self.service_id)?;
        serialize_units(&mut buf, &self.units)?;
        debug!(
            "Outgoing request for {}/{} with {} units",
            self.service_name,
            self.service_id,
            self.units.len()
        );
        stream.write_all(&buf)?;
        stream.flush()
    }
}

impl IpcResponseFrame {
    /// Serializes this response with network byte order
    pub fn serialize<S: Write>(&self, stream: &mut S) -> io::Result<()> {
        let mut buf = vec![];
        buf.write_i32::<NetworkEndian>(self.status)?;
        serialize_units(&mut buf, &self.units)?;
        stream.write_all(&buf)?;
        stream.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use structs::KeyVtn;

    #[test]
    fn scalar_units() {
        let mut ser = vec![];
        IpcDataUnit::Uint32(0x11223344).serialize(&mut ser).unwrap();
        assert_eq!(vec![5, 0x11, 0x22, 0x33, 0x44], ser);

        let mut ser = vec![];
        IpcDataUnit::Ipv4(Ipv4Addr::new(192, 0, 2, 1)).serialize(&mut ser).unwrap();
        assert_eq!(vec![10, 192, 0, 2, 1], ser);

        let mut ser = vec![];
        IpcDataUnit::String("upll".to_owned()).serialize(&mut ser).unwrap();
        assert_eq!(vec![12, 0, 4, b'u', b'p', b'l', b'l'], ser);
    }

    #[test]
    fn struct_unit() {
        let unit = IpcDataUnit::Struct(
            KeyVtn {
                vtn_name: "vtn1".to_owned(),
            }.into(),
        );
        let mut ser = vec![];
        unit.serialize(&mut ser).unwrap();
        assert_eq!(15, ser[0]);
        assert_eq!(7, ser[1]);
        assert_eq!(b"key_vtn", &ser[2..9]);
        assert_eq!(&[0, 32], &ser[9..11]);
        assert_eq!(11 + 32, ser.len());
    }

    #[test]
    fn request_frame_header() {
        let frame = IpcRequestFrame {
            service_name: "uppl".to_owned(),
            service_id: 2,
            units: vec![IpcDataUnit::Null],
        };
        let mut ser = vec![];
        frame.serialize(&mut ser).unwrap();
        assert_eq!(
            vec![1, 0, 4, b'u', b'p', b'p', b'l', 0, 0, 0, 2, 0, 0, 0, 1, 14],
            ser
        );
    }
}

/*!
All deserialization routines for data units and session frames

Fixed-size payloads go through the `Deserialize` trait, which checks
the payload length before anything is interpreted.
*/

use byteorder::{NetworkEndian, ReadBytesExt};
use ipc::error::{Error, Result};
use ipc::units::serialize::{IpcRequestFrame, IpcResponseFrame};
use ipc::units::*;
use std::io::Read;
use std::net::{Ipv4Addr, Ipv6Addr};
use structs::IpcStruct;

/// To be implemented by all payloads that are received
pub trait Deserialize {
    /// The type to deserialize
    type R;

    /// Deserialize the bytes buffer
    /// Fails on providing a too small or too large buffer
    fn deserialize(bytes: Vec<u8>) -> Result<Self::R> {
        if Self::min_length() > bytes.len() || Self::max_length() < bytes.len() {
            return Err(Error::Decode(format!(
                "payload of {} bytes, expected {} to {}",
                bytes.len(),
                Self::min_length(),
                Self::max_length()
            )));
        }
        Self::deserialize_len_ok(bytes)
    }

    /// Deserializes the byte buffer (network byte order)
    /// Implementers can rely on the buffer's size to be within the bounds
    fn deserialize_len_ok(bytes: Vec<u8>) -> Result<Self::R>;

    /// The minimum length of the payload in bytes
    fn min_length() -> usize;

    /// The maximum length of the payload in bytes
    fn max_length() -> usize {
        Self::min_length()
    }
}

impl Deserialize for Ipv4Addr {
    type R = Ipv4Addr;

    fn deserialize_len_ok(bytes: Vec<u8>) -> Result<Self::R> {
        Ok(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }

    fn min_length() -> usize {
        4
    }
}

impl Deserialize for Ipv6Addr {
    type R = Ipv6Addr;

    fn deserialize_len_ok(bytes: Vec<u8>) -> Result<Self::R> {
        let mut octets = [0; 16];
        octets.copy_from_slice(&bytes);
        Ok(Ipv6Addr::from(octets))
    }

    fn min_length() -> usize {
        16
    }
}

/// Payload of a MAC address unit
struct MacPayload;

impl Deserialize for MacPayload {
    type R = [u8; 6];

    fn deserialize_len_ok(bytes: Vec<u8>) -> Result<Self::R> {
        let mut mac = [0; 6];
        mac.copy_from_slice(&bytes);
        Ok(mac)
    }

    fn min_length() -> usize {
        6
    }
}

impl Deserialize for String {
    type R = String;

    fn deserialize_len_ok(bytes: Vec<u8>) -> Result<Self::R> {
        String::from_utf8(bytes).map_err(|e| Error::Decode(e.to_string()))
    }

    fn min_length() -> usize {
        0
    }

    fn max_length() -> usize {
        0xffff
    }
}

fn read_payload<R: Read>(stream: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0; len];
    stream.read_exact(&mut buf)?;
    Ok(buf)
}

impl IpcDataUnit {
    /// Reads one tagged unit from the stream
    pub fn deserialize<R: Read>(stream: &mut R) -> Result<IpcDataUnit> {
        let raw_tag = stream.read_u8()?;
        let tag = IpcUnitTag::from_u8(raw_tag)
            .ok_or_else(|| Error::Decode(format!("unknown unit tag {}", raw_tag)))?;
        Ok(match tag {
            IpcUnitTag::Uint8 => IpcDataUnit::Uint8(stream.read_u8()?),
            IpcUnitTag::Uint16 => IpcDataUnit::Uint16(stream.read_u16::<NetworkEndian>()?),
            IpcUnitTag::Uint32 => IpcDataUnit::Uint32(stream.read_u32::<NetworkEndian>()?),
            IpcUnitTag::Uint64 => IpcDataUnit::Uint64(stream.read_u64::<NetworkEndian>()?),
            IpcUnitTag::Ipv4 => IpcDataUnit::Ipv4(Ipv4Addr::deserialize(read_payload(stream, 4)?)?),
            IpcUnitTag::Ipv6 => {
                IpcDataUnit::Ipv6(Ipv6Addr::deserialize(read_payload(stream, 16)?)?)
            }
            IpcUnitTag::String => {
                let len = stream.read_u16::<NetworkEndian>()? as usize;
                IpcDataUnit::String(String::deserialize(read_payload(stream, len)?)?)
            }
            IpcUnitTag::Mac => IpcDataUnit::Mac(MacPayload::deserialize(read_payload(stream, 6)?)?),
            IpcUnitTag::Null => IpcDataUnit::Null,
            IpcUnitTag::Struct => {
                let name_len = stream.read_u8()? as usize;
                let name = String::deserialize(read_payload(stream, name_len)?)?;
                let len = stream.read_u16::<NetworkEndian>()? as usize;
                let body = read_payload(stream, len)?;
                let decoded = IpcStruct::decode(&name, &body)
                    .map_err(|e| Error::Decode(format!("struct {}: {}", name, e)))?;
                IpcDataUnit::Struct(decoded)
            }
        })
    }
}

fn deserialize_units<R: Read>(stream: &mut R) -> Result<Vec<IpcDataUnit>> {
    let count = stream.read_u32::<NetworkEndian>()?;
    let mut units = vec![];
    for _ in 0..count {
        units.push(IpcDataUnit::deserialize(stream)?);
    }
    Ok(units)
}

impl IpcResponseFrame {
    /// Reads a complete response frame
    pub fn deserialize<R: Read>(stream: &mut R) -> Result<IpcResponseFrame> {
        let status = stream.read_i32::<NetworkEndian>()?;
        let units = deserialize_units(stream)?;
        debug!("Incoming response with status {} and {} units", status, units.len());
        Ok(IpcResponseFrame {
            status: status,
            units: units,
        })
    }
}

impl IpcRequestFrame {
    /// Reads a complete request frame
    pub fn deserialize<R: Read>(stream: &mut R) -> Result<IpcRequestFrame> {
        let version = stream.read_u8()?;
        if version != IPC_FRAME_VERSION {
            return Err(Error::Decode(format!("unsupported frame version {}", version)));
        }
        let name_len = stream.read_u16::<NetworkEndian>()? as usize;
        let service_name = String::deserialize(read_payload(stream, name_len)?)?;
        let service_id = stream.read_u32::<NetworkEndian>()?;
        Ok(IpcRequestFrame {
            service_name: service_name,
            service_id: service_id,
            units: deserialize_units(stream)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use structs::{KeyCtr, ValCtr};

    #[test]
    fn lengths() {
        assert_eq!(4, Ipv4Addr::min_length());
        assert_eq!(4, Ipv4Addr::max_length());
        assert_eq!(16, Ipv6Addr::max_length());
        assert_eq!(0xffff, String::max_length());
        assert!(Ipv4Addr::deserialize(vec![1, 2, 3]).is_err());
        assert!(MacPayload::deserialize(vec![0; 7]).is_err());
    }

    #[test]
    fn unknown_tag() {
        let err = IpcDataUnit::deserialize(&mut Cursor::new(vec![99])).unwrap_err();
        assert_eq!("IPC_OP_ERROR", err.code());
    }

    #[test]
    fn truncated_unit() {
        let res = IpcDataUnit::deserialize(&mut Cursor::new(vec![5, 0, 0]));
        assert!(res.is_err());
    }

    #[test]
    fn response_frame() {
        let frame = IpcResponseFrame {
            status: 0,
            units: vec![
                IpcDataUnit::Uint32(0),
                IpcDataUnit::Uint32(0x200),
                IpcDataUnit::Struct(
                    KeyCtr {
                        controller_name: "odc1".to_owned(),
                    }.into(),
                ),
                IpcDataUnit::Struct(
                    ValCtr {
                        type_: Some(4),
                        ..ValCtr::default()
                    }.into(),
                ),
                IpcDataUnit::Mac([0, 1, 2, 3, 4, 5]),
            ],
        };
        let mut ser = vec![];
        frame.serialize(&mut ser).unwrap();
        let back = IpcResponseFrame::deserialize(&mut Cursor::new(ser)).unwrap();
        assert_eq!(frame, back);
    }

    #[test]
    fn request_frame_version() {
        let res = IpcRequestFrame::deserialize(&mut Cursor::new(vec![2, 0, 0]));
        assert!(res.is_err());
    }
}

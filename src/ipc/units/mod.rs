/*!
The typed data units that travel over a UNC IPC client session

A request is an ordered list of data units pushed onto the session,
a response is an ordered list of data units read back from it.
Scalars are carried in network byte order, structs as their
fixed-layout binary record prefixed by the struct's name.
*/

pub mod deserialize;
pub mod serialize;

use serde_json::{Map, Value};
use std::convert::TryFrom;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use structs::IpcStruct;

/// Version of the session framing
pub const IPC_FRAME_VERSION: u8 = 0x01;

/// A data unit's tag as it precedes its payload on the wire
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IpcUnitTag {
    Uint8 = 1,
    Uint16 = 3,
    Uint32 = 5,
    Uint64 = 7,
    Ipv4 = 10,
    Ipv6 = 11,
    String = 12,
    Mac = 13,
    Null = 14,
    Struct = 15,
}

impl IpcUnitTag {
    pub fn from_u8(tag: u8) -> Option<IpcUnitTag> {
        Some(match tag {
            1 => IpcUnitTag::Uint8,
            3 => IpcUnitTag::Uint16,
            5 => IpcUnitTag::Uint32,
            7 => IpcUnitTag::Uint64,
            10 => IpcUnitTag::Ipv4,
            11 => IpcUnitTag::Ipv6,
            12 => IpcUnitTag::String,
            13 => IpcUnitTag::Mac,
            14 => IpcUnitTag::Null,
            15 => IpcUnitTag::Struct,
            _ => return None,
        })
    }
}

/// One typed value on a client session
#[derive(Debug, Clone, PartialEq)]
pub enum IpcDataUnit {
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    String(String),
    Mac([u8; 6]),
    Null,
    Struct(IpcStruct),
}

impl IpcDataUnit {
    /// Gets this unit's wire tag
    pub fn tag(&self) -> IpcUnitTag {
        match *self {
            IpcDataUnit::Uint8(_) => IpcUnitTag::Uint8,
            IpcDataUnit::Uint16(_) => IpcUnitTag::Uint16,
            IpcDataUnit::Uint32(_) => IpcUnitTag::Uint32,
            IpcDataUnit::Uint64(_) => IpcUnitTag::Uint64,
            IpcDataUnit::Ipv4(_) => IpcUnitTag::Ipv4,
            IpcDataUnit::Ipv6(_) => IpcUnitTag::Ipv6,
            IpcDataUnit::String(_) => IpcUnitTag::String,
            IpcDataUnit::Mac(_) => IpcUnitTag::Mac,
            IpcDataUnit::Null => IpcUnitTag::Null,
            IpcDataUnit::Struct(_) => IpcUnitTag::Struct,
        }
    }

    /// Reads any of the unsigned integer units as u64
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            IpcDataUnit::Uint8(v) => Some(u64::from(v)),
            IpcDataUnit::Uint16(v) => Some(u64::from(v)),
            IpcDataUnit::Uint32(v) => Some(u64::from(v)),
            IpcDataUnit::Uint64(v) => Some(v),
            IpcDataUnit::String(ref s) => u64::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    /// Reads a unit written as `{"<type>": <value>}`, like `{"uint32": 5}`.
    /// Structs can not be written this way.
    pub fn from_json(value: &Value) -> Option<IpcDataUnit> {
        let obj = value.as_object()?;
        if obj.len() != 1 {
            return None;
        }
        let (kind, v) = obj.iter().next()?;
        let number = || match *v {
            Value::Number(ref n) => n.as_u64(),
            Value::String(ref s) => u64::from_str(s.trim()).ok(),
            _ => None,
        };
        let unit = match kind.as_str() {
            "uint8" => IpcDataUnit::Uint8(u8::try_from(number()?).ok()?),
            "uint16" => IpcDataUnit::Uint16(u16::try_from(number()?).ok()?),
            "uint32" => IpcDataUnit::Uint32(u32::try_from(number()?).ok()?),
            "uint64" => IpcDataUnit::Uint64(number()?),
            "ipv4" => IpcDataUnit::Ipv4(Ipv4Addr::from_str(v.as_str()?).ok()?),
            "ipv6" => IpcDataUnit::Ipv6(Ipv6Addr::from_str(v.as_str()?).ok()?),
            "string" => IpcDataUnit::String(v.as_str()?.to_owned()),
            "mac" => IpcDataUnit::Mac(parse_mac(v.as_str()?)?),
            "null" => IpcDataUnit::Null,
            _ => return None,
        };
        Some(unit)
    }

    /// Renders this unit for a JSON response body
    pub fn to_json(&self) -> Value {
        match *self {
            IpcDataUnit::Uint8(v) => json!(v),
            IpcDataUnit::Uint16(v) => json!(v),
            IpcDataUnit::Uint32(v) => json!(v),
            IpcDataUnit::Uint64(v) => json!(v),
            IpcDataUnit::Ipv4(ref a) => json!(a.to_string()),
            IpcDataUnit::Ipv6(ref a) => json!(a.to_string()),
            IpcDataUnit::String(ref s) => json!(s),
            IpcDataUnit::Mac(ref m) => json!(format_mac(m)),
            IpcDataUnit::Null => Value::Null,
            IpcDataUnit::Struct(ref s) => {
                let mut obj = Map::new();
                obj.insert(s.name().to_owned(), s.to_json());
                Value::Object(obj)
            }
        }
    }
}

impl fmt::Display for IpcDataUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            IpcDataUnit::Struct(ref s) => write!(f, "struct {}", s.name()),
            _ => write!(f, "{}", self.to_json()),
        }
    }
}

/// Formats a MAC address the way the VTN API writes it: `xxxx.xxxx.xxxx`
pub fn format_mac(mac: &[u8; 6]) -> String {
    format!(
        "{:02x}{:02x}.{:02x}{:02x}.{:02x}{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

/// Parses a MAC address in `xxxx.xxxx.xxxx` or `xx:xx:xx:xx:xx:xx` notation
pub fn parse_mac(s: &str) -> Option<[u8; 6]> {
    let hex: String = if s.len() == 14 && s.matches('.').count() == 2 {
        s.split('.').collect()
    }
    else if s.len() == 17 && s.matches(':').count() == 5 {
        s.split(':').collect()
    }
    else {
        return None;
    };
    if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let mut mac = [0; 6];
    for (i, byte) in mac.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).ok()?;
    }
    Some(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_notations() {
        let expected = Some([0, 0x0a, 0xbc, 0xde, 0xf0, 0x01]);
        assert_eq!(expected, parse_mac("000a.bcde.f001"));
        assert_eq!(expected, parse_mac("00:0a:bc:de:f0:01"));
        assert_eq!(None, parse_mac("000a.bcde.f0g1"));
        assert_eq!(None, parse_mac("000abcdef001"));
        assert_eq!("000a.bcde.f001", format_mac(&[0, 0x0a, 0xbc, 0xde, 0xf0, 0x01]));
    }

    #[test]
    fn integer_units() {
        assert_eq!(Some(11), IpcDataUnit::Uint32(11).as_u64());
        assert_eq!(Some(16), IpcDataUnit::String(" 16".to_owned()).as_u64());
        assert_eq!(None, IpcDataUnit::Null.as_u64());
    }

    #[test]
    fn units_from_json() {
        assert_eq!(Some(IpcDataUnit::Uint32(5)), IpcDataUnit::from_json(&json!({"uint32": 5})));
        assert_eq!(Some(IpcDataUnit::Uint8(7)), IpcDataUnit::from_json(&json!({"uint8": "7"})));
        assert_eq!(
            Some(IpcDataUnit::Mac([0, 0, 0, 0, 0, 1])),
            IpcDataUnit::from_json(&json!({"mac": "0000.0000.0001"}))
        );
        assert_eq!(Some(IpcDataUnit::Null), IpcDataUnit::from_json(&json!({"null": null})));
        assert_eq!(None, IpcDataUnit::from_json(&json!({"uint8": 256})));
        assert_eq!(None, IpcDataUnit::from_json(&json!({"struct": {}})));
        assert_eq!(None, IpcDataUnit::from_json(&json!({"uint8": 1, "uint16": 2})));
        assert_eq!(None, IpcDataUnit::from_json(&json!(5)));
    }

    #[test]
    fn unit_json() {
        assert_eq!(json!("10.0.0.1"), IpcDataUnit::Ipv4(Ipv4Addr::new(10, 0, 0, 1)).to_json());
        assert_eq!(json!(7), IpcDataUnit::Uint16(7).to_json());
    }
}

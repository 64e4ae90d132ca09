/*!
Key and value structs of the UNC IPC protocol

A key struct identifies one managed object instance and embeds the
key struct of its structural parent. A value struct describes the
instance: it starts with a `valid` array holding one `ValidFlag` per
attribute, followed (for the logical service) by the configuration
status bytes and then by the attributes themselves.

Here every optional attribute is an `Option`. The `valid` array is
derived from the options on encoding and turned back into options
on decoding, so it never has to be kept in sync by hand.
*/

pub mod logical;
pub mod physical;

pub use self::logical::*;
pub use self::physical::*;

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use serde::{Serialize, Serializer};
use serde_json;
use serde_json::Value;
use std::io;
use std::io::{Cursor, Read, Write};
use std::net::{Ipv4Addr, Ipv6Addr};
use unc::ValidFlag;

/* Field widths of the fixed-size character arrays */

/// vtn, vbridge, vrouter, interface, controller and domain names
pub const NAME_LEN: usize = 32;
/// flowlist and policing profile names
pub const FL_NAME_LEN: usize = 33;
/// free-text descriptions
pub const DESCRIPTION_LEN: usize = 128;
/// OpenFlow switch ids
pub const SWITCH_ID_LEN: usize = 256;
/// logical port ids
pub const LOGICAL_PORT_ID_LEN: usize = 320;
/// controller passwords
pub const PASSWORD_LEN: usize = 257;

/// A struct type with a fixed binary layout
pub trait IpcStructType: Sized {
    /// The struct's name as announced on the wire
    const NAME: &'static str;

    /// Writes the fixed-layout record
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()>;

    /// Reads the fixed-layout record
    fn decode<R: Read>(r: &mut R) -> io::Result<Self>;
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

macro_rules! ipc_struct_catalogue {
    ($($variant:ident($ty:ty)),* $(,)*) => {
        /// Any struct that can be carried by a data unit
        #[derive(Debug, Clone, PartialEq)]
        pub enum IpcStruct {
            $($variant($ty)),*
        }

        /// The type of an `IpcStruct`, used where a struct is named
        /// before it is built
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StructKind {
            $($variant),*
        }

        impl StructKind {
            /// Gets the struct's wire name
            pub fn name(&self) -> &'static str {
                match *self {
                    $(StructKind::$variant => <$ty as IpcStructType>::NAME),*
                }
            }
        }

        impl IpcStruct {
            /// Gets the struct's type
            pub fn kind(&self) -> StructKind {
                match *self {
                    $(IpcStruct::$variant(_) => StructKind::$variant),*
                }
            }

            /// Writes the fixed-layout record of the contained struct
            pub fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
                match *self {
                    $(IpcStruct::$variant(ref s) => s.encode(w)),*
                }
            }

            /// Renders the contained struct with its valid attributes only
            pub fn to_json(&self) -> Value {
                match *self {
                    $(IpcStruct::$variant(ref s) => {
                        serde_json::to_value(s).unwrap_or(Value::Null)
                    }),*
                }
            }

            /// Decodes the record of the struct type called `name`.
            /// Fails on unknown names and on records with a wrong size.
            pub fn decode(name: &str, bytes: &[u8]) -> io::Result<IpcStruct> {
                let mut cursor = Cursor::new(bytes);
                let decoded = $(if name == <$ty as IpcStructType>::NAME {
                    IpcStruct::$variant(<$ty as IpcStructType>::decode(&mut cursor)?)
                } else)* {
                    return Err(invalid_data(format!("unknown struct type {}", name)));
                };
                if cursor.position() as usize != bytes.len() {
                    return Err(invalid_data(format!(
                        "{} trailing bytes after struct {}",
                        bytes.len() - cursor.position() as usize,
                        name
                    )));
                }
                Ok(decoded)
            }
        }

        $(impl From<$ty> for IpcStruct {
            fn from(s: $ty) -> Self {
                IpcStruct::$variant(s)
            }
        })*
    };
}

ipc_struct_catalogue! {
    KeyVtn(KeyVtn),
    ValVtn(ValVtn),
    ValVtnSt(ValVtnSt),
    KeyVbr(KeyVbr),
    ValVbr(ValVbr),
    KeyVbrIf(KeyVbrIf),
    ValVbrIf(ValVbrIf),
    KeyVlanMap(KeyVlanMap),
    ValVlanMap(ValVlanMap),
    KeyVrt(KeyVrt),
    ValVrt(ValVrt),
    KeyVrtIf(KeyVrtIf),
    ValVrtIf(ValVrtIf),
    KeyStaticIpRoute(KeyStaticIpRoute),
    ValStaticIpRoute(ValStaticIpRoute),
    KeyFlowlist(KeyFlowlist),
    ValFlowlist(ValFlowlist),
    KeyFlowlistEntry(KeyFlowlistEntry),
    ValFlowlistEntry(ValFlowlistEntry),
    KeyPolicingProfile(KeyPolicingProfile),
    KeyPolicingProfileEntry(KeyPolicingProfileEntry),
    ValPolicingProfileEntry(ValPolicingProfileEntry),
    KeyVtnFlowfilter(KeyVtnFlowfilter),
    KeyVtnFlowfilterEntry(KeyVtnFlowfilterEntry),
    ValVtnFlowfilterEntry(ValVtnFlowfilterEntry),
    KeyVtnPathmapEntry(KeyVtnPathmapEntry),
    ValVtnPathmapEntry(ValVtnPathmapEntry),
    KeyVtnstationController(KeyVtnstationController),
    KeyCtr(KeyCtr),
    ValCtr(ValCtr),
    ValCtrSt(ValCtrSt),
    KeyCtrDomain(KeyCtrDomain),
    ValCtrDomain(ValCtrDomain),
    KeySwitch(KeySwitch),
    KeyPort(KeyPort),
    KeyLink(KeyLink),
    KeyLogicalPort(KeyLogicalPort),
    KeyBoundary(KeyBoundary),
    ValBoundary(ValBoundary),
}

impl IpcStruct {
    /// Gets the struct's wire name
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// A MAC address, rendered as `xxxx.xxxx.xxxx`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr(pub [u8; 6]);

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&::ipc::units::format_mac(&self.0))
    }
}

/* Encoding helpers for the fixed-layout records */

/// Writes `value` into a NUL-padded array of `width` bytes.
/// The last byte always stays NUL.
pub fn write_name<W: Write>(w: &mut W, value: &str, width: usize) -> io::Result<()> {
    let bytes = value.as_bytes();
    let len = bytes.len().min(width - 1);
    w.write_all(&bytes[..len])?;
    w.write_all(&vec![0; width - len])
}

/// Writes an optional string attribute; an absent one is all NUL
pub fn write_opt_name<W: Write>(w: &mut W, value: &Option<String>, width: usize) -> io::Result<()> {
    write_name(w, value.as_ref().map_or("", |s| s.as_str()), width)
}

/// Reads a NUL-padded array of `width` bytes
pub fn read_name<R: Read>(r: &mut R, width: usize) -> io::Result<String> {
    let mut buf = vec![0; width];
    r.read_exact(&mut buf)?;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(width);
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

/// Writes the `valid` array, then `cs_row_status` and `cs_attr`
/// if the struct carries configuration status
pub fn write_valid<W: Write>(w: &mut W, flags: &[ValidFlag], with_cs: bool) -> io::Result<()> {
    for flag in flags {
        w.write_u8(*flag as u8)?;
    }
    if with_cs {
        // cs_row_status and cs_attr are only filled in by the southbound service
        w.write_all(&vec![0; flags.len() + 1])?;
    }
    Ok(())
}

/// Reads `n` valid flags and skips the configuration status if present
pub fn read_valid<R: Read>(r: &mut R, n: usize, with_cs: bool) -> io::Result<Vec<ValidFlag>> {
    let mut buf = vec![0; n];
    r.read_exact(&mut buf)?;
    if with_cs {
        let mut cs = vec![0; n + 1];
        r.read_exact(&mut cs)?;
    }
    Ok(buf.into_iter().map(ValidFlag::from_u8).collect())
}

/// Keeps a decoded attribute only if its flag says it carries a value
pub fn valid_attr<T>(flag: ValidFlag, value: T) -> Option<T> {
    if flag == ValidFlag::Valid {
        Some(value)
    }
    else {
        None
    }
}

pub fn write_opt_u8<W: Write>(w: &mut W, v: Option<u8>) -> io::Result<()> {
    w.write_u8(v.unwrap_or(0))
}

pub fn write_opt_u16<W: Write>(w: &mut W, v: Option<u16>) -> io::Result<()> {
    w.write_u16::<NetworkEndian>(v.unwrap_or(0))
}

pub fn write_opt_u32<W: Write>(w: &mut W, v: Option<u32>) -> io::Result<()> {
    w.write_u32::<NetworkEndian>(v.unwrap_or(0))
}

pub fn write_opt_u64<W: Write>(w: &mut W, v: Option<u64>) -> io::Result<()> {
    w.write_u64::<NetworkEndian>(v.unwrap_or(0))
}

pub fn write_ipv4<W: Write>(w: &mut W, v: Option<Ipv4Addr>) -> io::Result<()> {
    w.write_all(&v.unwrap_or(Ipv4Addr::new(0, 0, 0, 0)).octets())
}

pub fn read_ipv4<R: Read>(r: &mut R) -> io::Result<Ipv4Addr> {
    let mut octets = [0; 4];
    r.read_exact(&mut octets)?;
    Ok(Ipv4Addr::from(octets))
}

pub fn write_ipv6<W: Write>(w: &mut W, v: Option<Ipv6Addr>) -> io::Result<()> {
    w.write_all(&v.unwrap_or(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0)).octets())
}

pub fn read_ipv6<R: Read>(r: &mut R) -> io::Result<Ipv6Addr> {
    let mut octets = [0; 16];
    r.read_exact(&mut octets)?;
    Ok(Ipv6Addr::from(octets))
}

pub fn write_mac<W: Write>(w: &mut W, v: Option<MacAddr>) -> io::Result<()> {
    w.write_all(&v.map_or([0; 6], |m| m.0))
}

pub fn read_mac<R: Read>(r: &mut R) -> io::Result<MacAddr> {
    let mut mac = [0; 6];
    r.read_exact(&mut mac)?;
    Ok(MacAddr(mac))
}

pub fn read_u8<R: Read>(r: &mut R) -> io::Result<u8> {
    r.read_u8()
}

pub fn read_u16<R: Read>(r: &mut R) -> io::Result<u16> {
    r.read_u16::<NetworkEndian>()
}

pub fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    r.read_u32::<NetworkEndian>()
}

pub fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    r.read_u64::<NetworkEndian>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(s: &IpcStruct) -> Vec<u8> {
        let mut buf = vec![];
        s.encode(&mut buf).unwrap();
        buf
    }

    #[test]
    fn name_is_nul_padded() {
        let mut buf = vec![];
        write_name(&mut buf, "vtn1", NAME_LEN).unwrap();
        assert_eq!(NAME_LEN, buf.len());
        assert_eq!(b"vtn1", &buf[..4]);
        assert!(buf[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn overlong_name_keeps_terminator() {
        let mut buf = vec![];
        write_name(&mut buf, &"x".repeat(40), NAME_LEN).unwrap();
        assert_eq!(NAME_LEN, buf.len());
        assert_eq!(0, buf[NAME_LEN - 1]);
        let back = read_name(&mut Cursor::new(buf), NAME_LEN).unwrap();
        assert_eq!(NAME_LEN - 1, back.len());
    }

    #[test]
    fn valid_array_follows_options() {
        let val = IpcStruct::from(ValVbr {
            controller_id: Some("ctr1".to_owned()),
            domain_id: None,
            vbr_description: None,
            host_addr: Some(Ipv4Addr::new(192, 0, 2, 1)),
            host_addr_prefixlen: Some(24),
        });
        let buf = encoded(&val);
        assert_eq!(&[1, 0, 0, 1, 1], &buf[..5]);
        // cs_row_status and cs_attr
        assert_eq!(&[0; 6], &buf[5..11]);
    }

    #[test]
    fn decode_restores_struct() {
        let key = IpcStruct::from(KeyVbrIf {
            vbr_key: KeyVbr {
                vtn_key: KeyVtn {
                    vtn_name: "vtn1".to_owned(),
                },
                vbridge_name: "vbr1".to_owned(),
            },
            if_name: "if1".to_owned(),
        });
        let buf = encoded(&key);
        assert_eq!(3 * NAME_LEN, buf.len());
        assert_eq!(key, IpcStruct::decode("key_vbr_if", &buf).unwrap());
    }

    #[test]
    fn decode_rejects_bad_records() {
        let key = IpcStruct::from(KeyVtn {
            vtn_name: "vtn1".to_owned(),
        });
        let mut buf = encoded(&key);
        assert!(IpcStruct::decode("key_nothing", &buf).is_err());
        buf.push(0);
        assert!(IpcStruct::decode("key_vtn", &buf).is_err());
        buf.truncate(10);
        assert!(IpcStruct::decode("key_vtn", &buf).is_err());
    }

    #[test]
    fn json_skips_invalid_attributes() {
        let val = IpcStruct::from(ValVtn { description: None });
        assert_eq!(json!({}), val.to_json());
        let val = IpcStruct::from(ValVrtIf {
            description: None,
            ip_addr: None,
            prefixlen: None,
            macaddr: Some(MacAddr([0, 0, 0, 0, 0, 1])),
            admin_status: None,
        });
        assert_eq!(json!({"macaddr": "0000.0000.0001"}), val.to_json());
    }
}

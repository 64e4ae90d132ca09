/*!
Builds key and value structs from a request body and its URI segments

Builders are plain functions, one per struct type, picked by a `match`
on the `StructKind`. They never fail: input that cannot be converted
is logged and leaves the attribute (or key field) unset.

Key fields are looked up in this order:

1. the nested body object, e.g. `body.vbridge.vbr_name`
2. `body.index`, only for the leaf field of the requested key
3. the URI segment of the key's level
*/

mod logical;
mod physical;

use conf::GatewayConf;
use ipc::error::{Error, Result};
use ipc::units::parse_mac;
use ipnetwork::{Ipv4Network, Ipv6Network};
use serde_json::{Map, Value};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use structs::{IpcStruct, MacAddr, StructKind};

/// Name of the body field carrying the start key of a list read
pub const INDEX: &str = "index";

/// Builds the structs of request packets
pub struct StructFactory<'a> {
    conf: &'a GatewayConf,
}

impl<'a> StructFactory<'a> {
    pub fn new(conf: &'a GatewayConf) -> StructFactory<'a> {
        StructFactory { conf: conf }
    }

    /// Builds the struct of type `kind`.
    /// Fails only for types that are never sent, like operational state.
    pub fn build(&self, kind: StructKind, body: &Value, uri: &[String]) -> Result<IpcStruct> {
        let src = Source::new(body, uri);
        let built: IpcStruct = match kind {
            StructKind::KeyVtn => logical::key_vtn(&src, true).into(),
            StructKind::ValVtn => logical::val_vtn(&src).into(),
            StructKind::KeyVbr => logical::key_vbr(&src, true).into(),
            StructKind::ValVbr => logical::val_vbr(&src).into(),
            StructKind::KeyVbrIf => logical::key_vbr_if(&src, true).into(),
            StructKind::ValVbrIf => logical::val_vbr_if(&src).into(),
            StructKind::KeyVlanMap => logical::key_vlan_map(&src).into(),
            StructKind::ValVlanMap => logical::val_vlan_map(&src).into(),
            StructKind::KeyVrt => logical::key_vrt(&src, true).into(),
            StructKind::ValVrt => logical::val_vrt(&src).into(),
            StructKind::KeyVrtIf => logical::key_vrt_if(&src, true).into(),
            StructKind::ValVrtIf => logical::val_vrt_if(&src).into(),
            StructKind::KeyStaticIpRoute => logical::key_static_ip_route(&src).into(),
            StructKind::ValStaticIpRoute => logical::val_static_ip_route(&src).into(),
            StructKind::KeyFlowlist => logical::key_flowlist(&src, true).into(),
            StructKind::ValFlowlist => logical::val_flowlist(&src).into(),
            StructKind::KeyFlowlistEntry => logical::key_flowlist_entry(&src, true).into(),
            StructKind::ValFlowlistEntry => logical::val_flowlist_entry(&src).into(),
            StructKind::KeyPolicingProfile => logical::key_policingprofile(&src, true).into(),
            StructKind::KeyPolicingProfileEntry => {
                logical::key_policingprofile_entry(&src, true).into()
            }
            StructKind::ValPolicingProfileEntry => logical::val_policingprofile_entry(&src).into(),
            StructKind::KeyVtnFlowfilter => logical::key_vtn_flowfilter(&src, true).into(),
            StructKind::KeyVtnFlowfilterEntry => {
                logical::key_vtn_flowfilter_entry(&src, true).into()
            }
            StructKind::ValVtnFlowfilterEntry => logical::val_vtn_flowfilter_entry(&src).into(),
            StructKind::KeyVtnPathmapEntry => logical::key_vtn_pathmap_entry(&src, true).into(),
            StructKind::ValVtnPathmapEntry => logical::val_vtn_pathmap_entry(&src).into(),
            StructKind::KeyVtnstationController => {
                logical::key_vtnstation_controller(&src, true).into()
            }
            StructKind::KeyCtr => physical::key_ctr(&src, true).into(),
            StructKind::ValCtr => physical::val_ctr(&src, &self.conf.controllers).into(),
            StructKind::KeyCtrDomain => physical::key_ctr_domain(&src, true).into(),
            StructKind::ValCtrDomain => physical::val_ctr_domain(&src).into(),
            StructKind::KeySwitch => physical::key_switch(&src, true).into(),
            StructKind::KeyPort => physical::key_port(&src, true).into(),
            StructKind::KeyLink => physical::key_link(&src, true).into(),
            StructKind::KeyLogicalPort => physical::key_logical_port(&src, true).into(),
            StructKind::KeyBoundary => physical::key_boundary(&src, true).into(),
            StructKind::ValBoundary => physical::val_boundary(&src).into(),
            StructKind::ValVtnSt | StructKind::ValCtrSt => {
                return Err(Error::Internal(format!("no builder for struct {}", kind.name())));
            }
        };
        debug!("Built {:?}", built);
        Ok(built)
    }
}

/// Renders a scalar JSON value as the string the API meant
fn scalar_string(value: &Value) -> Option<String> {
    match *value {
        Value::String(ref s) => Some(s.clone()),
        Value::Number(ref n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Truncates `s` so it fits a NUL-terminated array of `width` bytes
fn fit(mut s: String, width: usize, what: &str) -> String {
    if s.len() >= width {
        warn!("Truncating {} of {} bytes to {}", what, s.len(), width - 1);
        let mut end = width - 1;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}

/// The request body and URI segments a struct is built from
pub struct Source<'a> {
    body: &'a Value,
    uri: &'a [String],
}

impl<'a> Source<'a> {
    pub fn new(body: &'a Value, uri: &'a [String]) -> Source<'a> {
        Source {
            body: body,
            uri: uri,
        }
    }

    /// Looks up an identifying field, see the module docs for the order
    fn lookup(&self, object: &str, field: &str, level: usize, leaf: bool) -> Option<String> {
        if let Some(s) = self
            .body
            .get(object)
            .and_then(|o| o.get(field))
            .and_then(scalar_string)
        {
            return Some(s);
        }
        if leaf {
            if let Some(s) = self.body.get(INDEX).and_then(scalar_string) {
                return Some(s);
            }
        }
        self.uri.get(level).cloned()
    }

    /// An identifying name, empty if nothing carries it
    pub fn key_name(&self, object: &str, field: &str, level: usize, leaf: bool, width: usize) -> String {
        match self.lookup(object, field, level, leaf) {
            Some(s) => fit(s, width, field),
            None => {
                debug!("No {}.{} in body or URI", object, field);
                String::new()
            }
        }
    }

    /// An identifying name that a key may leave out
    pub fn opt_key_name(&self, object: &str, field: &str, level: usize, leaf: bool, width: usize) -> Option<String> {
        self.lookup(object, field, level, leaf).map(|s| fit(s, width, field))
    }

    /// An identifying number, zero if nothing carries a valid one
    pub fn key_number(&self, object: &str, field: &str, level: usize, leaf: bool, max: u64) -> u64 {
        match self.lookup(object, field, level, leaf) {
            Some(s) => match u64::from_str(s.trim()) {
                Ok(n) if n <= max => n,
                _ => {
                    warn!("Ignoring {} {}, expected a number up to {}", field, s, max);
                    0
                }
            },
            None => {
                debug!("No {}.{} in body or URI", object, field);
                0
            }
        }
    }

    /// Gets the raw identifying string without any conversion
    pub fn key_raw(&self, object: &str, field: &str, level: usize, leaf: bool) -> Option<String> {
        self.lookup(object, field, level, leaf)
    }

    /// The attributes of the nested body object `object`
    pub fn attrs(&self, object: &'a str) -> Attrs<'a> {
        Attrs {
            object: object,
            map: self.body.get(object).and_then(Value::as_object),
        }
    }
}

/// The attributes of one nested body object.
/// Every getter yields `None` for absent or unusable attributes.
pub struct Attrs<'a> {
    object: &'a str,
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Attrs<'a> {
    /// Checks whether the body carries the object at all
    pub fn present(&self) -> bool {
        self.map.is_some()
    }

    /// The attributes of an object nested in this one
    pub fn nested(&self, key: &'a str) -> Attrs<'a> {
        Attrs {
            object: key,
            map: self.map.and_then(|m| m.get(key)).and_then(Value::as_object),
        }
    }

    fn scalar(&self, key: &str) -> Option<String> {
        let value = self.map?.get(key)?;
        let s = scalar_string(value);
        if s.is_none() {
            warn!("Ignoring {}.{}, {} is not a scalar", self.object, key, value);
        }
        s
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.map_or(false, |m| m.contains_key(key))
    }

    pub fn string(&self, key: &str, width: usize) -> Option<String> {
        self.scalar(key).map(|s| fit(s, width, key))
    }

    /// A number given as JSON number or numeric string, up to `max`
    pub fn number(&self, key: &str, max: u64) -> Option<u64> {
        let s = self.scalar(key)?;
        match u64::from_str(s.trim()) {
            Ok(n) if n <= max => Some(n),
            _ => {
                warn!("Ignoring {}.{} {}, expected a number up to {}", self.object, key, s, max);
                None
            }
        }
    }

    pub fn uint8(&self, key: &str) -> Option<u8> {
        self.number(key, u64::from(u8::max_value())).map(|n| n as u8)
    }

    pub fn uint16(&self, key: &str) -> Option<u16> {
        self.number(key, u64::from(u16::max_value())).map(|n| n as u16)
    }

    pub fn uint32(&self, key: &str) -> Option<u32> {
        self.number(key, u64::from(u32::max_value())).map(|n| n as u32)
    }

    /// An enumerated attribute, mapped through `table`
    pub fn mapped(&self, key: &str, table: &[(&str, u8)]) -> Option<u8> {
        let s = self.scalar(key)?;
        match table.iter().find(|&&(name, _)| name == s) {
            Some(&(_, code)) => Some(code),
            None => {
                warn!("Ignoring {}.{}, unknown value {}", self.object, key, s);
                None
            }
        }
    }

    pub fn mac(&self, key: &str) -> Option<MacAddr> {
        let s = self.scalar(key)?;
        match parse_mac(&s) {
            Some(mac) => Some(MacAddr(mac)),
            None => {
                warn!("Ignoring {}.{}, {} is no MAC address", self.object, key, s);
                None
            }
        }
    }

    pub fn ipv4(&self, key: &str) -> Option<Ipv4Addr> {
        let s = self.scalar(key)?;
        match Ipv4Addr::from_str(&s) {
            Ok(addr) => Some(addr),
            Err(e) => {
                warn!("Ignoring {}.{} {}: {}", self.object, key, s, e);
                None
            }
        }
    }

    pub fn ipv6(&self, key: &str) -> Option<Ipv6Addr> {
        let s = self.scalar(key)?;
        match Ipv6Addr::from_str(&s) {
            Ok(addr) => Some(addr),
            Err(e) => {
                warn!("Ignoring {}.{} {}: {}", self.object, key, s, e);
                None
            }
        }
    }

    /// An IPv4 address with its prefix length.
    /// An invalid prefix invalidates the address as well.
    pub fn ipv4_prefix(&self, addr_key: &str, prefix_key: &str) -> (Option<Ipv4Addr>, Option<u8>) {
        let addr = self.ipv4(addr_key);
        if !self.has(prefix_key) {
            return (addr, None);
        }
        let prefix = self.uint8(prefix_key);
        match (addr, prefix) {
            (Some(a), Some(p)) => match Ipv4Network::new(a, p) {
                Ok(net) => (Some(net.ip()), Some(net.prefix())),
                Err(e) => {
                    warn!("Ignoring {}.{}/{}: {:?}", self.object, addr_key, prefix_key, e);
                    (None, None)
                }
            },
            (None, p) => (None, p),
            (Some(_), None) => (None, None),
        }
    }

    /// An IPv6 address with its prefix length, validated like `ipv4_prefix`
    pub fn ipv6_prefix(&self, addr_key: &str, prefix_key: &str) -> (Option<Ipv6Addr>, Option<u8>) {
        let addr = self.ipv6(addr_key);
        if !self.has(prefix_key) {
            return (addr, None);
        }
        let prefix = self.uint8(prefix_key);
        match (addr, prefix) {
            (Some(a), Some(p)) => match Ipv6Network::new(a, p) {
                Ok(net) => (Some(net.ip()), Some(net.prefix())),
                Err(e) => {
                    warn!("Ignoring {}.{}/{}: {:?}", self.object, addr_key, prefix_key, e);
                    (None, None)
                }
            },
            (None, p) => (None, p),
            (Some(_), None) => (None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use structs::*;

    fn uri(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn key_fields_prefer_body_then_index_then_uri() {
        let conf = GatewayConf::default();
        let factory = StructFactory::new(&conf);
        let body = json!({"vbridge": {"vbr_name": "vbr_body"}, "index": "vbr_index"});
        let built = factory.build(StructKind::KeyVbr, &body, &uri(&["vtn1", "vbr_uri"])).unwrap();
        let expected = KeyVbr {
            vtn_key: KeyVtn {
                vtn_name: "vtn1".to_owned(),
            },
            vbridge_name: "vbr_body".to_owned(),
        };
        assert_eq!(IpcStruct::from(expected.clone()), built);

        let body = json!({"index": "vbr_index"});
        let built = factory.build(StructKind::KeyVbr, &body, &uri(&["vtn1"])).unwrap();
        let expected = KeyVbr {
            vbridge_name: "vbr_index".to_owned(),
            ..expected
        };
        assert_eq!(IpcStruct::from(expected), built);
    }

    #[test]
    fn index_applies_to_leaf_only() {
        let conf = GatewayConf::default();
        let factory = StructFactory::new(&conf);
        let body = json!({"index": "if9"});
        let built = factory.build(StructKind::KeyVbrIf, &body, &uri(&["vtn1", "vbr1"])).unwrap();
        match built {
            IpcStruct::KeyVbrIf(key) => {
                assert_eq!("vtn1", key.vbr_key.vtn_key.vtn_name);
                assert_eq!("vbr1", key.vbr_key.vbridge_name);
                assert_eq!("if9", key.if_name);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_key_field_stays_empty() {
        let conf = GatewayConf::default();
        let factory = StructFactory::new(&conf);
        let built = factory.build(StructKind::KeyVtn, &json!({}), &[]).unwrap();
        assert_eq!(IpcStruct::from(KeyVtn::default()), built);
    }

    #[test]
    fn response_only_structs_have_no_builder() {
        let conf = GatewayConf::default();
        let factory = StructFactory::new(&conf);
        let err = factory.build(StructKind::ValCtrSt, &json!({}), &[]).unwrap_err();
        assert_eq!("INTERNAL_ERROR", err.code());
    }

    #[test]
    fn lenient_numbers() {
        let body = json!({"o": {"a": "17", "b": 17, "c": "x17", "d": 300, "e": [1]}});
        let src = Source::new(&body, &[]);
        let attrs = src.attrs("o");
        assert_eq!(Some(17), attrs.uint8("a"));
        assert_eq!(Some(17), attrs.uint8("b"));
        assert_eq!(None, attrs.uint8("c"));
        assert_eq!(None, attrs.uint8("d"));
        assert_eq!(Some(300), attrs.uint16("d"));
        assert_eq!(None, attrs.uint32("e"));
        assert_eq!(None, attrs.uint32("missing"));
    }

    #[test]
    fn overlong_strings_are_truncated() {
        let body = json!({"o": {"s": "é".repeat(20)}});
        let src = Source::new(&body, &[]);
        let s = src.attrs("o").string("s", 8).unwrap();
        assert_eq!("ééé", s);
    }

    #[test]
    fn address_with_prefix() {
        let body = json!({"o": {
            "a": "192.0.2.1", "ap": 24,
            "b": "192.0.2.1", "bp": 33,
            "c": "2001:db8::1", "cp": "64",
            "d": "not an address"
        }});
        let src = Source::new(&body, &[]);
        let attrs = src.attrs("o");
        assert_eq!((Some(Ipv4Addr::new(192, 0, 2, 1)), Some(24)), attrs.ipv4_prefix("a", "ap"));
        assert_eq!((None, None), attrs.ipv4_prefix("b", "bp"));
        assert_eq!((Some(Ipv4Addr::new(192, 0, 2, 1)), None), attrs.ipv4_prefix("a", "missing"));
        let (v6, p) = attrs.ipv6_prefix("c", "cp");
        assert_eq!(Some(64), p);
        assert!(v6.is_some());
        assert_eq!(None, attrs.ipv4("d"));
    }

    #[test]
    fn mapped_values() {
        let body = json!({"o": {"t": true, "s": "enable", "u": "maybe"}});
        let src = Source::new(&body, &[]);
        let attrs = src.attrs("o");
        assert_eq!(Some(1), attrs.mapped("t", &[("true", 1), ("false", 0)]));
        assert_eq!(Some(1), attrs.mapped("s", &[("enable", 1), ("disable", 2)]));
        assert_eq!(None, attrs.mapped("u", &[("enable", 1), ("disable", 2)]));
    }
}

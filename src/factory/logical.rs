//! Builders for the structs of the logical service

use factory::Source;
use std::net::Ipv4Addr;
use std::str::FromStr;
use structs::*;
use unc::NO_VLAN_ID;

const ADMIN_STATUS: [(&str, u8); 2] = [("enable", 1), ("disable", 2)];
const TAGGED: [(&str, u8); 2] = [("true", 1), ("false", 0)];
const IP_TYPE: [(&str, u8); 2] = [("ip", 0), ("ipv6", 1)];
const DIRECTION: [(&str, u8); 2] = [("in", 0), ("out", 1)];
const RATE_UNIT: [(&str, u8); 2] = [("kbps", 0), ("pps", 1)];
const POLICING_ACTION: [(&str, u8); 3] = [("pass", 1), ("drop", 2), ("penalty", 3)];
const FLOWFILTER_ACTION: [(&str, u8); 3] = [("pass", 0), ("drop", 1), ("redirect", 2)];

/// `tagged` of a port map that has a vlan id but no explicit tagging
const PORT_MAP_TAGGED: u8 = 1;

/// Vlan map URI segment standing for "any logical port"
const ANY_PORT: &str = "ANY";

/* VTN */

pub fn key_vtn(src: &Source, leaf: bool) -> KeyVtn {
    KeyVtn {
        vtn_name: src.key_name("vtn", "vtn_name", 0, leaf, NAME_LEN),
    }
}

pub fn val_vtn(src: &Source) -> ValVtn {
    ValVtn {
        description: src.attrs("vtn").string("description", DESCRIPTION_LEN),
    }
}

/* vBridge */

pub fn key_vbr(src: &Source, leaf: bool) -> KeyVbr {
    KeyVbr {
        vtn_key: key_vtn(src, false),
        vbridge_name: src.key_name("vbridge", "vbr_name", 1, leaf, NAME_LEN),
    }
}

pub fn val_vbr(src: &Source) -> ValVbr {
    let attrs = src.attrs("vbridge");
    let (host_addr, host_addr_prefixlen) = attrs.ipv4_prefix("ipaddr", "prefix");
    ValVbr {
        controller_id: attrs.string("controller_id", NAME_LEN),
        domain_id: attrs.string("domain_id", NAME_LEN),
        vbr_description: attrs.string("description", DESCRIPTION_LEN),
        host_addr: host_addr,
        host_addr_prefixlen: host_addr_prefixlen,
    }
}

pub fn key_vbr_if(src: &Source, leaf: bool) -> KeyVbrIf {
    KeyVbrIf {
        vbr_key: key_vbr(src, false),
        if_name: src.key_name("interface", "if_name", 2, leaf, NAME_LEN),
    }
}

/// The interface attributes come from `body.interface`,
/// the port map from `body.portmap`
pub fn val_vbr_if(src: &Source) -> ValVbrIf {
    let attrs = src.attrs("interface");
    let portmap = src.attrs("portmap");
    ValVbrIf {
        admin_status: attrs.mapped("adminstatus", &ADMIN_STATUS),
        description: attrs.string("description", DESCRIPTION_LEN),
        portmap: if portmap.present() {
            let vlan_id = portmap.uint16("vlan_id");
            let tagged = match portmap.mapped("tagged", &TAGGED) {
                None if !portmap.has("tagged") && vlan_id.is_some() => Some(PORT_MAP_TAGGED),
                t => t,
            };
            Some(ValPortMap {
                logical_port_id: portmap.string("logical_port_id", LOGICAL_PORT_ID_LEN),
                vlan_id: vlan_id,
                tagged: tagged,
            })
        }
        else {
            None
        },
    }
}

/// The port may come from `body.vlanmap` or the URI,
/// where `ANY` stands for no particular port
pub fn key_vlan_map(src: &Source) -> KeyVlanMap {
    let port = src
        .opt_key_name("vlanmap", "logical_port_id", 2, true, LOGICAL_PORT_ID_LEN)
        .and_then(|p| if p.is_empty() || p == ANY_PORT { None } else { Some(p) });
    KeyVlanMap {
        vbr_key: key_vbr(src, false),
        logical_port_id: port,
    }
}

pub fn val_vlan_map(src: &Source) -> ValVlanMap {
    let attrs = src.attrs("vlanmap");
    let vlan_id = if attrs.has("vlan_id") {
        attrs.uint16("vlan_id")
    }
    else if attrs.string("no_vlan_id", NAME_LEN).map_or(false, |s| s == "true") {
        Some(NO_VLAN_ID)
    }
    else {
        None
    };
    ValVlanMap { vlan_id: vlan_id }
}

/* vRouter */

pub fn key_vrt(src: &Source, leaf: bool) -> KeyVrt {
    KeyVrt {
        vtn_key: key_vtn(src, false),
        vrouter_name: src.key_name("vrouter", "vrt_name", 1, leaf, NAME_LEN),
    }
}

pub fn val_vrt(src: &Source) -> ValVrt {
    let attrs = src.attrs("vrouter");
    ValVrt {
        controller_id: attrs.string("controller_id", NAME_LEN),
        domain_id: attrs.string("domain_id", NAME_LEN),
        vrt_description: attrs.string("description", DESCRIPTION_LEN),
        dhcp_relay_admin_status: attrs.mapped("dhcprelay_adminstatus", &ADMIN_STATUS),
    }
}

pub fn key_vrt_if(src: &Source, leaf: bool) -> KeyVrtIf {
    KeyVrtIf {
        vrt_key: key_vrt(src, false),
        if_name: src.key_name("interface", "if_name", 2, leaf, NAME_LEN),
    }
}

pub fn val_vrt_if(src: &Source) -> ValVrtIf {
    let attrs = src.attrs("interface");
    let (ip_addr, prefixlen) = attrs.ipv4_prefix("ipaddr", "prefix");
    ValVrtIf {
        description: attrs.string("description", DESCRIPTION_LEN),
        ip_addr: ip_addr,
        prefixlen: prefixlen,
        macaddr: attrs.mac("macaddr"),
        admin_status: attrs.mapped("adminstatus", &ADMIN_STATUS),
    }
}

/// Parses `<ipaddr>-<nexthopaddr>-<prefix>`
fn parse_route_id(id: &str) -> Option<(Ipv4Addr, Ipv4Addr, u8)> {
    let parts: Vec<_> = id.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    Some((
        Ipv4Addr::from_str(parts[0]).ok()?,
        Ipv4Addr::from_str(parts[1]).ok()?,
        u8::from_str(parts[2]).ok()?,
    ))
}

/// The route is identified by a route id in the URI or the index.
/// Fields carried by `body.static_iproute` override the parsed id.
pub fn key_static_ip_route(src: &Source) -> KeyStaticIpRoute {
    let attrs = src.attrs("static_iproute");
    let mut key = KeyStaticIpRoute {
        vrt_key: key_vrt(src, false),
        ..KeyStaticIpRoute::default()
    };
    if let Some(id) = src.key_raw("static_iproute", "static_iproute_id", 2, true) {
        match parse_route_id(&id) {
            Some((dst, next_hop, prefix)) => {
                key.dst_addr = dst;
                key.next_hop_addr = next_hop;
                key.dst_addr_prefixlen = prefix;
            }
            None => warn!("Ignoring static route id {}", id),
        }
    }
    let (dst, prefix) = attrs.ipv4_prefix("ipaddr", "prefix");
    if let Some(dst) = dst {
        key.dst_addr = dst;
    }
    if let Some(prefix) = prefix {
        key.dst_addr_prefixlen = prefix;
    }
    if let Some(next_hop) = attrs.ipv4("nexthopaddr") {
        key.next_hop_addr = next_hop;
    }
    if let Some(nwm_name) = attrs.string("nmg_name", NAME_LEN) {
        key.nwm_name = nwm_name;
    }
    key
}

pub fn val_static_ip_route(src: &Source) -> ValStaticIpRoute {
    ValStaticIpRoute {
        group_metric: src.attrs("static_iproute").uint16("groupmetric"),
    }
}

/* Flowlist */

pub fn key_flowlist(src: &Source, leaf: bool) -> KeyFlowlist {
    KeyFlowlist {
        flowlist_name: src.key_name("flowlist", "fl_name", 0, leaf, FL_NAME_LEN),
    }
}

pub fn val_flowlist(src: &Source) -> ValFlowlist {
    ValFlowlist {
        ip_type: src.attrs("flowlist").mapped("ip_version", &IP_TYPE),
    }
}

pub fn key_flowlist_entry(src: &Source, leaf: bool) -> KeyFlowlistEntry {
    KeyFlowlistEntry {
        flowlist_key: key_flowlist(src, false),
        sequence_num: src.key_number("flowlistentry", "seqnum", 1, leaf, 0xffff) as u16,
    }
}

pub fn val_flowlist_entry(src: &Source) -> ValFlowlistEntry {
    let attrs = src.attrs("flowlistentry");
    let (dst_ip, dst_ip_prefixlen) = attrs.ipv4_prefix("dstip", "dstipprefix");
    let (src_ip, src_ip_prefixlen) = attrs.ipv4_prefix("srcip", "srcipprefix");
    let (dst_ipv6, dst_ipv6_prefixlen) = attrs.ipv6_prefix("dstipv6", "dstipv6prefix");
    let (src_ipv6, src_ipv6_prefixlen) = attrs.ipv6_prefix("srcipv6", "srcipv6prefix");
    ValFlowlistEntry {
        mac_dst: attrs.mac("macdstaddr"),
        mac_src: attrs.mac("macsrcaddr"),
        mac_eth_type: attrs.uint16("macethertype"),
        dst_ip: dst_ip,
        dst_ip_prefixlen: dst_ip_prefixlen,
        src_ip: src_ip,
        src_ip_prefixlen: src_ip_prefixlen,
        vlan_priority: attrs.uint8("macvlanpriority"),
        dst_ipv6: dst_ipv6,
        dst_ipv6_prefixlen: dst_ipv6_prefixlen,
        src_ipv6: src_ipv6,
        src_ipv6_prefixlen: src_ipv6_prefixlen,
        ip_proto: attrs.uint8("ipproto"),
        ip_dscp: attrs.uint8("ipdscp"),
        l4_dst_port: attrs.uint16("l4dstport"),
        l4_src_port: attrs.uint16("l4srcport"),
        icmp_type: attrs.uint8("icmptypenum"),
        icmp_code: attrs.uint8("icmpcodenum"),
    }
}

/* Policing profile */

pub fn key_policingprofile(src: &Source, leaf: bool) -> KeyPolicingProfile {
    KeyPolicingProfile {
        policingprofile_name: src.key_name("profile", "prf_name", 0, leaf, FL_NAME_LEN),
    }
}

pub fn key_policingprofile_entry(src: &Source, leaf: bool) -> KeyPolicingProfileEntry {
    KeyPolicingProfileEntry {
        policingprofile_key: key_policingprofile(src, false),
        sequence_num: src.key_number("profileentry", "seqnum", 1, leaf, 0xff) as u8,
    }
}

pub fn val_policingprofile_entry(src: &Source) -> ValPolicingProfileEntry {
    let attrs = src.attrs("profileentry");
    ValPolicingProfileEntry {
        flowlist: attrs.string("fl_name", FL_NAME_LEN),
        rate: attrs.mapped("rateunit", &RATE_UNIT),
        cir: attrs.uint32("cir"),
        cbs: attrs.uint32("cbs"),
        pir: attrs.uint32("pir"),
        pbs: attrs.uint32("pbs"),
        green_action: attrs.mapped("ga_action", &POLICING_ACTION),
        yellow_action: attrs.mapped("ya_action", &POLICING_ACTION),
        red_action: attrs.mapped("ra_action", &POLICING_ACTION),
    }
}

/* VTN flow filters */

pub fn key_vtn_flowfilter(src: &Source, leaf: bool) -> KeyVtnFlowfilter {
    let direction = src.key_raw("flowfilter", "ff_type", 1, leaf);
    let input_direction = match direction {
        Some(ref d) => match DIRECTION.iter().find(|&&(name, _)| name == d.as_str()) {
            Some(&(_, code)) => code,
            None => {
                warn!("Ignoring flow filter direction {}", d);
                0
            }
        },
        None => 0,
    };
    KeyVtnFlowfilter {
        vtn_key: key_vtn(src, false),
        input_direction: input_direction,
    }
}

pub fn key_vtn_flowfilter_entry(src: &Source, leaf: bool) -> KeyVtnFlowfilterEntry {
    KeyVtnFlowfilterEntry {
        flowfilter_key: key_vtn_flowfilter(src, false),
        sequence_num: src.key_number("flowfilterentry", "seqnum", 2, leaf, 0xffff) as u16,
    }
}

pub fn val_vtn_flowfilter_entry(src: &Source) -> ValVtnFlowfilterEntry {
    let attrs = src.attrs("flowfilterentry");
    ValVtnFlowfilterEntry {
        flowlist_name: attrs.string("fl_name", FL_NAME_LEN),
        action: attrs.mapped("action_type", &FLOWFILTER_ACTION),
        nwm_name: attrs.string("nmg_name", NAME_LEN),
        dscp: attrs.number("dscp", 63).map(|n| n as u8),
        priority: attrs.number("priority", 7).map(|n| n as u8),
    }
}

/* VTN path maps */

pub fn key_vtn_pathmap_entry(src: &Source, leaf: bool) -> KeyVtnPathmapEntry {
    KeyVtnPathmapEntry {
        vtn_key: key_vtn(src, false),
        sequence_num: src.key_number("pathmapentry", "seqnum", 1, leaf, 0xffff) as u16,
    }
}

pub fn val_vtn_pathmap_entry(src: &Source) -> ValVtnPathmapEntry {
    let attrs = src.attrs("pathmapentry");
    ValVtnPathmapEntry {
        flowlist_name: attrs.string("fl_name", FL_NAME_LEN),
        policy_id: attrs.uint8("policy_id"),
        idle_timeout: attrs.uint16("idle_timeout"),
        hard_timeout: attrs.uint16("hard_timeout"),
    }
}

/* VTN stations */

pub fn key_vtnstation_controller(src: &Source, leaf: bool) -> KeyVtnstationController {
    KeyVtnstationController {
        controller_name: src.key_name("vtnstation", "controller_id", 0, leaf, NAME_LEN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn segments(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn vtn_description() {
        let body = json!({"vtn": {"vtn_name": "vtn1", "description": "tenant"}});
        let src = Source::new(&body, &[]);
        assert_eq!("vtn1", key_vtn(&src, true).vtn_name);
        assert_eq!(Some("tenant".to_owned()), val_vtn(&src).description);
        let empty = json!({});
        assert_eq!(None, val_vtn(&Source::new(&empty, &[])).description);
    }

    #[test]
    fn vlan_map_ids() {
        let body = json!({"vlanmap": {"vlan_id": 100, "no_vlan_id": "true"}});
        assert_eq!(Some(100), val_vlan_map(&Source::new(&body, &[])).vlan_id);

        let body = json!({"vlanmap": {"no_vlan_id": "true"}});
        assert_eq!(Some(NO_VLAN_ID), val_vlan_map(&Source::new(&body, &[])).vlan_id);

        let body = json!({"vlanmap": {"no_vlan_id": "false"}});
        assert_eq!(None, val_vlan_map(&Source::new(&body, &[])).vlan_id);
    }

    #[test]
    fn vlan_map_key_port() {
        let body = json!({});
        let uri = segments(&["vtn1", "vbr1", "ANY"]);
        assert_eq!(None, key_vlan_map(&Source::new(&body, &uri)).logical_port_id);
        let uri = segments(&["vtn1", "vbr1", "PP-1"]);
        let key = key_vlan_map(&Source::new(&body, &uri));
        assert_eq!(Some("PP-1".to_owned()), key.logical_port_id);
        assert_eq!("vbr1", key.vbr_key.vbridge_name);
    }

    #[test]
    fn port_map_tagging() {
        let body = json!({"portmap": {"logical_port_id": "PP-1", "vlan_id": "10"}});
        let pm = val_vbr_if(&Source::new(&body, &[])).portmap.unwrap();
        assert_eq!(Some(10), pm.vlan_id);
        assert_eq!(Some(PORT_MAP_TAGGED), pm.tagged);

        let body = json!({"portmap": {"vlan_id": 10, "tagged": "false"}});
        let pm = val_vbr_if(&Source::new(&body, &[])).portmap.unwrap();
        assert_eq!(Some(0), pm.tagged);

        let body = json!({"portmap": {"logical_port_id": "PP-1"}});
        let pm = val_vbr_if(&Source::new(&body, &[])).portmap.unwrap();
        assert_eq!(None, pm.tagged);

        let body = json!({"interface": {"adminstatus": "disable"}});
        let val = val_vbr_if(&Source::new(&body, &[]));
        assert_eq!(Some(2), val.admin_status);
        assert_eq!(None, val.portmap);
    }

    #[test]
    fn vrt_if_invalid_prefix_drops_address() {
        let body = json!({"interface": {
            "ipaddr": "10.0.0.1", "prefix": 40, "macaddr": "00:11:22:33:44:55"
        }});
        let val = val_vrt_if(&Source::new(&body, &[]));
        assert_eq!(None, val.ip_addr);
        assert_eq!(None, val.prefixlen);
        assert_eq!(Some(MacAddr([0, 0x11, 0x22, 0x33, 0x44, 0x55])), val.macaddr);
    }

    #[test]
    fn static_route_from_uri() {
        let body = json!({});
        let uri = segments(&["vtn1", "vrt1", "10.1.0.0-192.0.2.1-16"]);
        let key = key_static_ip_route(&Source::new(&body, &uri));
        assert_eq!("vrt1", key.vrt_key.vrouter_name);
        assert_eq!(Ipv4Addr::new(10, 1, 0, 0), key.dst_addr);
        assert_eq!(Ipv4Addr::new(192, 0, 2, 1), key.next_hop_addr);
        assert_eq!(16, key.dst_addr_prefixlen);
    }

    #[test]
    fn static_route_from_body() {
        let body = json!({"static_iproute": {
            "ipaddr": "10.1.0.0", "prefix": 16, "nexthopaddr": "192.0.2.1",
            "nmg_name": "nmg1", "groupmetric": 3
        }});
        let uri = segments(&["vtn1", "vrt1"]);
        let src = Source::new(&body, &uri);
        let key = key_static_ip_route(&src);
        assert_eq!(16, key.dst_addr_prefixlen);
        assert_eq!("nmg1", key.nwm_name);
        assert_eq!(Some(3), val_static_ip_route(&src).group_metric);
    }

    #[test]
    fn static_route_update_keeps_uri_id() {
        let body = json!({"static_iproute": {"groupmetric": 3}});
        let uri = segments(&["vtn1", "vrt1", "10.1.0.0-192.0.2.1-16"]);
        let src = Source::new(&body, &uri);
        let key = key_static_ip_route(&src);
        assert_eq!(Ipv4Addr::new(10, 1, 0, 0), key.dst_addr);
        assert_eq!(Ipv4Addr::new(192, 0, 2, 1), key.next_hop_addr);
        assert_eq!(16, key.dst_addr_prefixlen);
        assert_eq!(Some(3), val_static_ip_route(&src).group_metric);
    }

    #[test]
    fn static_route_body_overrides_uri_id() {
        let body = json!({"static_iproute": {"nexthopaddr": "192.0.2.9", "nmg_name": "nmg1"}});
        let uri = segments(&["vtn1", "vrt1", "10.1.0.0-192.0.2.1-16"]);
        let key = key_static_ip_route(&Source::new(&body, &uri));
        assert_eq!(Ipv4Addr::new(10, 1, 0, 0), key.dst_addr);
        assert_eq!(Ipv4Addr::new(192, 0, 2, 9), key.next_hop_addr);
        assert_eq!("nmg1", key.nwm_name);
    }

    #[test]
    fn flowlist_entry() {
        let body = json!({"flowlistentry": {
            "seqnum": "7",
            "macdstaddr": "0000.0000.0001",
            "dstip": "192.0.2.0", "dstipprefix": 24,
            "srcipv6": "2001:db8::", "srcipv6prefix": 32,
            "l4dstport": 80,
            "ipproto": 300
        }});
        let uri = segments(&["fl1"]);
        let src = Source::new(&body, &uri);
        let key = key_flowlist_entry(&src, true);
        assert_eq!("fl1", key.flowlist_key.flowlist_name);
        assert_eq!(7, key.sequence_num);
        let val = val_flowlist_entry(&src);
        assert_eq!(Some(MacAddr([0, 0, 0, 0, 0, 1])), val.mac_dst);
        assert_eq!(Some(24), val.dst_ip_prefixlen);
        assert_eq!(Some(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0)), val.src_ipv6);
        assert_eq!(Some(80), val.l4_dst_port);
        assert_eq!(None, val.ip_proto);
        assert_eq!(None, val.mac_src);
    }

    #[test]
    fn policing_actions() {
        let body = json!({"profileentry": {
            "seqnum": 1, "fl_name": "fl1", "rateunit": "pps",
            "cir": 1000, "ga_action": "pass", "ra_action": "penalty", "ya_action": "shout"
        }});
        let uri = segments(&["prf1"]);
        let src = Source::new(&body, &uri);
        assert_eq!(1, key_policingprofile_entry(&src, true).sequence_num);
        let val = val_policingprofile_entry(&src);
        assert_eq!(Some(1), val.rate);
        assert_eq!(Some(1000), val.cir);
        assert_eq!(Some(1), val.green_action);
        assert_eq!(None, val.yellow_action);
        assert_eq!(Some(3), val.red_action);
    }

    #[test]
    fn flowfilter_direction() {
        let body = json!({});
        let uri = segments(&["vtn1", "out"]);
        assert_eq!(1, key_vtn_flowfilter(&Source::new(&body, &uri), true).input_direction);
        let uri = segments(&["vtn1", "in"]);
        assert_eq!(0, key_vtn_flowfilter(&Source::new(&body, &uri), true).input_direction);
    }

    #[test]
    fn flowfilter_entry() {
        let body = json!({"flowfilterentry": {
            "fl_name": "fl1", "action_type": "redirect", "dscp": 64, "priority": "5"
        }});
        let uri = segments(&["vtn1", "in", "10"]);
        let src = Source::new(&body, &uri);
        let key = key_vtn_flowfilter_entry(&src, true);
        assert_eq!("vtn1", key.flowfilter_key.vtn_key.vtn_name);
        assert_eq!(0, key.flowfilter_key.input_direction);
        assert_eq!(10, key.sequence_num);
        let val = val_vtn_flowfilter_entry(&src);
        assert_eq!(Some("fl1".to_owned()), val.flowlist_name);
        assert_eq!(Some(2), val.action);
        assert_eq!(None, val.dscp);
        assert_eq!(Some(5), val.priority);
        assert_eq!(None, val.nwm_name);
    }

    #[test]
    fn pathmap_entry() {
        let body = json!({"pathmapentry": {"policy_id": 2, "idle_timeout": 300}});
        let uri = segments(&["vtn1", "4"]);
        let src = Source::new(&body, &uri);
        let key = key_vtn_pathmap_entry(&src, true);
        assert_eq!("vtn1", key.vtn_key.vtn_name);
        assert_eq!(4, key.sequence_num);
        let val = val_vtn_pathmap_entry(&src);
        assert_eq!(Some(2), val.policy_id);
        assert_eq!(Some(300), val.idle_timeout);
        assert_eq!(None, val.hard_timeout);
        assert_eq!(None, val.flowlist_name);
    }
}

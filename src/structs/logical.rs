/*!
Key and value structs of the logical service (UPLL)

Value structs of this service carry `cs_row_status` and `cs_attr`
after their `valid` array.
*/

use std::io;
use std::io::{Read, Write};
use std::net::{Ipv4Addr, Ipv6Addr};

use byteorder::{NetworkEndian, WriteBytesExt};
use structs::*;
use unc::ValidFlag;

/* ## --- ## */
/* ## VTN ## */
/* ## --- ## */

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyVtn {
    pub vtn_name: String,
}

impl IpcStructType for KeyVtn {
    const NAME: &'static str = "key_vtn";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name(w, &self.vtn_name, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyVtn {
            vtn_name: read_name(r, NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValVtn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IpcStructType for ValVtn {
    const NAME: &'static str = "val_vtn";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_valid(w, &[ValidFlag::of(&self.description)], true)?;
        write_opt_name(w, &self.description, DESCRIPTION_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let valid = read_valid(r, 1, true)?;
        Ok(ValVtn {
            description: valid_attr(valid[0], read_name(r, DESCRIPTION_LEN)?),
        })
    }
}

/// Operational state of a VTN, only sent by the southbound service
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValVtnSt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oper_status: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_status: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_time: Option<u64>,
}

impl IpcStructType for ValVtnSt {
    const NAME: &'static str = "val_vtn_st";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.oper_status),
            ValidFlag::of(&self.alarm_status),
            ValidFlag::of(&self.creation_time),
            ValidFlag::of(&self.last_updated_time),
        ];
        write_valid(w, &flags, false)?;
        write_opt_u8(w, self.oper_status)?;
        write_opt_u8(w, self.alarm_status)?;
        write_opt_u64(w, self.creation_time)?;
        write_opt_u64(w, self.last_updated_time)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let valid = read_valid(r, 4, false)?;
        Ok(ValVtnSt {
            oper_status: valid_attr(valid[0], read_u8(r)?),
            alarm_status: valid_attr(valid[1], read_u8(r)?),
            creation_time: valid_attr(valid[2], read_u64(r)?),
            last_updated_time: valid_attr(valid[3], read_u64(r)?),
        })
    }
}

/* ## ------- ## */
/* ## vBridge ## */
/* ## ------- ## */

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyVbr {
    pub vtn_key: KeyVtn,
    pub vbridge_name: String,
}

impl IpcStructType for KeyVbr {
    const NAME: &'static str = "key_vbr";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.vtn_key.encode(w)?;
        write_name(w, &self.vbridge_name, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyVbr {
            vtn_key: KeyVtn::decode(r)?,
            vbridge_name: read_name(r, NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValVbr {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vbr_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_addr: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_addr_prefixlen: Option<u8>,
}

impl IpcStructType for ValVbr {
    const NAME: &'static str = "val_vbr";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.controller_id),
            ValidFlag::of(&self.domain_id),
            ValidFlag::of(&self.vbr_description),
            ValidFlag::of(&self.host_addr),
            ValidFlag::of(&self.host_addr_prefixlen),
        ];
        write_valid(w, &flags, true)?;
        write_opt_name(w, &self.controller_id, NAME_LEN)?;
        write_opt_name(w, &self.domain_id, NAME_LEN)?;
        write_opt_name(w, &self.vbr_description, DESCRIPTION_LEN)?;
        write_ipv4(w, self.host_addr)?;
        write_opt_u8(w, self.host_addr_prefixlen)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let valid = read_valid(r, 5, true)?;
        Ok(ValVbr {
            controller_id: valid_attr(valid[0], read_name(r, NAME_LEN)?),
            domain_id: valid_attr(valid[1], read_name(r, NAME_LEN)?),
            vbr_description: valid_attr(valid[2], read_name(r, DESCRIPTION_LEN)?),
            host_addr: valid_attr(valid[3], read_ipv4(r)?),
            host_addr_prefixlen: valid_attr(valid[4], read_u8(r)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyVbrIf {
    pub vbr_key: KeyVbr,
    pub if_name: String,
}

impl IpcStructType for KeyVbrIf {
    const NAME: &'static str = "key_vbr_if";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.vbr_key.encode(w)?;
        write_name(w, &self.if_name, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyVbrIf {
            vbr_key: KeyVbr::decode(r)?,
            if_name: read_name(r, NAME_LEN)?,
        })
    }
}

/// Port map of a vBridge interface, embedded in `ValVbrIf`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValPortMap {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_port_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagged: Option<u8>,
}

impl ValPortMap {
    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.logical_port_id),
            ValidFlag::of(&self.vlan_id),
            ValidFlag::of(&self.tagged),
        ];
        write_valid(w, &flags, false)?;
        write_opt_name(w, &self.logical_port_id, LOGICAL_PORT_ID_LEN)?;
        write_opt_u16(w, self.vlan_id)?;
        write_opt_u8(w, self.tagged)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let valid = read_valid(r, 3, false)?;
        Ok(ValPortMap {
            logical_port_id: valid_attr(valid[0], read_name(r, LOGICAL_PORT_ID_LEN)?),
            vlan_id: valid_attr(valid[1], read_u16(r)?),
            tagged: valid_attr(valid[2], read_u8(r)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValVbrIf {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_status: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portmap: Option<ValPortMap>,
}

impl IpcStructType for ValVbrIf {
    const NAME: &'static str = "val_vbr_if";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.admin_status),
            ValidFlag::of(&self.description),
            ValidFlag::of(&self.portmap),
        ];
        write_valid(w, &flags, true)?;
        write_opt_u8(w, self.admin_status)?;
        write_opt_name(w, &self.description, DESCRIPTION_LEN)?;
        match self.portmap {
            Some(ref pm) => pm.encode(w),
            None => ValPortMap::default().encode(w),
        }
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let valid = read_valid(r, 3, true)?;
        Ok(ValVbrIf {
            admin_status: valid_attr(valid[0], read_u8(r)?),
            description: valid_attr(valid[1], read_name(r, DESCRIPTION_LEN)?),
            portmap: valid_attr(valid[2], ValPortMap::decode(r)?),
        })
    }
}

/// Key of a vlan map. The logical port id is optional and carries
/// its own valid byte inside the key.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyVlanMap {
    pub vbr_key: KeyVbr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_port_id: Option<String>,
}

impl IpcStructType for KeyVlanMap {
    const NAME: &'static str = "key_vlan_map";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.vbr_key.encode(w)?;
        write_opt_name(w, &self.logical_port_id, LOGICAL_PORT_ID_LEN)?;
        w.write_u8(ValidFlag::of(&self.logical_port_id) as u8)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let vbr_key = KeyVbr::decode(r)?;
        let port = read_name(r, LOGICAL_PORT_ID_LEN)?;
        let flag = ValidFlag::from_u8(read_u8(r)?);
        Ok(KeyVlanMap {
            vbr_key: vbr_key,
            logical_port_id: valid_attr(flag, port),
        })
    }
}

/// Value of a vlan map. `NO_VLAN_ID` maps untagged traffic.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValVlanMap {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
}

impl IpcStructType for ValVlanMap {
    const NAME: &'static str = "val_vlan_map";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_valid(w, &[ValidFlag::of(&self.vlan_id)], true)?;
        write_opt_u16(w, self.vlan_id)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let valid = read_valid(r, 1, true)?;
        Ok(ValVlanMap {
            vlan_id: valid_attr(valid[0], read_u16(r)?),
        })
    }
}

/* ## ------- ## */
/* ## vRouter ## */
/* ## ------- ## */

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyVrt {
    pub vtn_key: KeyVtn,
    pub vrouter_name: String,
}

impl IpcStructType for KeyVrt {
    const NAME: &'static str = "key_vrt";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.vtn_key.encode(w)?;
        write_name(w, &self.vrouter_name, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyVrt {
            vtn_key: KeyVtn::decode(r)?,
            vrouter_name: read_name(r, NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValVrt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vrt_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_relay_admin_status: Option<u8>,
}

impl IpcStructType for ValVrt {
    const NAME: &'static str = "val_vrt";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.controller_id),
            ValidFlag::of(&self.domain_id),
            ValidFlag::of(&self.vrt_description),
            ValidFlag::of(&self.dhcp_relay_admin_status),
        ];
        write_valid(w, &flags, true)?;
        write_opt_name(w, &self.controller_id, NAME_LEN)?;
        write_opt_name(w, &self.domain_id, NAME_LEN)?;
        write_opt_name(w, &self.vrt_description, DESCRIPTION_LEN)?;
        write_opt_u8(w, self.dhcp_relay_admin_status)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let valid = read_valid(r, 4, true)?;
        Ok(ValVrt {
            controller_id: valid_attr(valid[0], read_name(r, NAME_LEN)?),
            domain_id: valid_attr(valid[1], read_name(r, NAME_LEN)?),
            vrt_description: valid_attr(valid[2], read_name(r, DESCRIPTION_LEN)?),
            dhcp_relay_admin_status: valid_attr(valid[3], read_u8(r)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyVrtIf {
    pub vrt_key: KeyVrt,
    pub if_name: String,
}

impl IpcStructType for KeyVrtIf {
    const NAME: &'static str = "key_vrt_if";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.vrt_key.encode(w)?;
        write_name(w, &self.if_name, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyVrtIf {
            vrt_key: KeyVrt::decode(r)?,
            if_name: read_name(r, NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValVrtIf {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_addr: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefixlen: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macaddr: Option<MacAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_status: Option<u8>,
}

impl IpcStructType for ValVrtIf {
    const NAME: &'static str = "val_vrt_if";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.description),
            ValidFlag::of(&self.ip_addr),
            ValidFlag::of(&self.prefixlen),
            ValidFlag::of(&self.macaddr),
            ValidFlag::of(&self.admin_status),
        ];
        write_valid(w, &flags, true)?;
        write_opt_name(w, &self.description, DESCRIPTION_LEN)?;
        write_ipv4(w, self.ip_addr)?;
        write_opt_u8(w, self.prefixlen)?;
        write_mac(w, self.macaddr)?;
        write_opt_u8(w, self.admin_status)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let valid = read_valid(r, 5, true)?;
        Ok(ValVrtIf {
            description: valid_attr(valid[0], read_name(r, DESCRIPTION_LEN)?),
            ip_addr: valid_attr(valid[1], read_ipv4(r)?),
            prefixlen: valid_attr(valid[2], read_u8(r)?),
            macaddr: valid_attr(valid[3], read_mac(r)?),
            admin_status: valid_attr(valid[4], read_u8(r)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyStaticIpRoute {
    pub vrt_key: KeyVrt,
    pub dst_addr: Ipv4Addr,
    pub dst_addr_prefixlen: u8,
    pub next_hop_addr: Ipv4Addr,
    pub nwm_name: String,
}

impl Default for KeyStaticIpRoute {
    fn default() -> Self {
        KeyStaticIpRoute {
            vrt_key: KeyVrt::default(),
            dst_addr: Ipv4Addr::new(0, 0, 0, 0),
            dst_addr_prefixlen: 0,
            next_hop_addr: Ipv4Addr::new(0, 0, 0, 0),
            nwm_name: String::new(),
        }
    }
}

impl IpcStructType for KeyStaticIpRoute {
    const NAME: &'static str = "key_static_ip_route";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.vrt_key.encode(w)?;
        write_ipv4(w, Some(self.dst_addr))?;
        w.write_u8(self.dst_addr_prefixlen)?;
        write_ipv4(w, Some(self.next_hop_addr))?;
        write_name(w, &self.nwm_name, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyStaticIpRoute {
            vrt_key: KeyVrt::decode(r)?,
            dst_addr: read_ipv4(r)?,
            dst_addr_prefixlen: read_u8(r)?,
            next_hop_addr: read_ipv4(r)?,
            nwm_name: read_name(r, NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValStaticIpRoute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_metric: Option<u16>,
}

impl IpcStructType for ValStaticIpRoute {
    const NAME: &'static str = "val_static_ip_route";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_valid(w, &[ValidFlag::of(&self.group_metric)], true)?;
        write_opt_u16(w, self.group_metric)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let valid = read_valid(r, 1, true)?;
        Ok(ValStaticIpRoute {
            group_metric: valid_attr(valid[0], read_u16(r)?),
        })
    }
}

/* ## -------- ## */
/* ## Flowlist ## */
/* ## -------- ## */

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyFlowlist {
    pub flowlist_name: String,
}

impl IpcStructType for KeyFlowlist {
    const NAME: &'static str = "key_flowlist";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name(w, &self.flowlist_name, FL_NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyFlowlist {
            flowlist_name: read_name(r, FL_NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValFlowlist {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_type: Option<u8>,
}

impl IpcStructType for ValFlowlist {
    const NAME: &'static str = "val_flowlist";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_valid(w, &[ValidFlag::of(&self.ip_type)], true)?;
        write_opt_u8(w, self.ip_type)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let valid = read_valid(r, 1, true)?;
        Ok(ValFlowlist {
            ip_type: valid_attr(valid[0], read_u8(r)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyFlowlistEntry {
    pub flowlist_key: KeyFlowlist,
    pub sequence_num: u16,
}

impl IpcStructType for KeyFlowlistEntry {
    const NAME: &'static str = "key_flowlist_entry";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.flowlist_key.encode(w)?;
        w.write_u16::<NetworkEndian>(self.sequence_num)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyFlowlistEntry {
            flowlist_key: KeyFlowlist::decode(r)?,
            sequence_num: read_u16(r)?,
        })
    }
}

/// Match conditions of one flowlist entry
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValFlowlistEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_dst: Option<MacAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_src: Option<MacAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_eth_type: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_ip: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_ip_prefixlen: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_ip_prefixlen: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_ipv6: Option<Ipv6Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_ipv6_prefixlen: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_ipv6: Option<Ipv6Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_ipv6_prefixlen: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_proto: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_dscp: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l4_dst_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l4_src_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp_code: Option<u8>,
}

impl IpcStructType for ValFlowlistEntry {
    const NAME: &'static str = "val_flowlist_entry";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.mac_dst),
            ValidFlag::of(&self.mac_src),
            ValidFlag::of(&self.mac_eth_type),
            ValidFlag::of(&self.dst_ip),
            ValidFlag::of(&self.dst_ip_prefixlen),
            ValidFlag::of(&self.src_ip),
            ValidFlag::of(&self.src_ip_prefixlen),
            ValidFlag::of(&self.vlan_priority),
            ValidFlag::of(&self.dst_ipv6),
            ValidFlag::of(&self.dst_ipv6_prefixlen),
            ValidFlag::of(&self.src_ipv6),
            ValidFlag::of(&self.src_ipv6_prefixlen),
            ValidFlag::of(&self.ip_proto),
            ValidFlag::of(&self.ip_dscp),
            ValidFlag::of(&self.l4_dst_port),
            ValidFlag::of(&self.l4_src_port),
            ValidFlag::of(&self.icmp_type),
            ValidFlag::of(&self.icmp_code),
        ];
        write_valid(w, &flags, true)?;
        write_mac(w, self.mac_dst)?;
        write_mac(w, self.mac_src)?;
        write_opt_u16(w, self.mac_eth_type)?;
        write_ipv4(w, self.dst_ip)?;
        write_opt_u8(w, self.dst_ip_prefixlen)?;
        write_ipv4(w, self.src_ip)?;
        write_opt_u8(w, self.src_ip_prefixlen)?;
        write_opt_u8(w, self.vlan_priority)?;
        write_ipv6(w, self.dst_ipv6)?;
        write_opt_u8(w, self.dst_ipv6_prefixlen)?;
        write_ipv6(w, self.src_ipv6)?;
        write_opt_u8(w, self.src_ipv6_prefixlen)?;
        write_opt_u8(w, self.ip_proto)?;
        write_opt_u8(w, self.ip_dscp)?;
        write_opt_u16(w, self.l4_dst_port)?;
        write_opt_u16(w, self.l4_src_port)?;
        write_opt_u8(w, self.icmp_type)?;
        write_opt_u8(w, self.icmp_code)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let v = read_valid(r, 18, true)?;
        Ok(ValFlowlistEntry {
            mac_dst: valid_attr(v[0], read_mac(r)?),
            mac_src: valid_attr(v[1], read_mac(r)?),
            mac_eth_type: valid_attr(v[2], read_u16(r)?),
            dst_ip: valid_attr(v[3], read_ipv4(r)?),
            dst_ip_prefixlen: valid_attr(v[4], read_u8(r)?),
            src_ip: valid_attr(v[5], read_ipv4(r)?),
            src_ip_prefixlen: valid_attr(v[6], read_u8(r)?),
            vlan_priority: valid_attr(v[7], read_u8(r)?),
            dst_ipv6: valid_attr(v[8], read_ipv6(r)?),
            dst_ipv6_prefixlen: valid_attr(v[9], read_u8(r)?),
            src_ipv6: valid_attr(v[10], read_ipv6(r)?),
            src_ipv6_prefixlen: valid_attr(v[11], read_u8(r)?),
            ip_proto: valid_attr(v[12], read_u8(r)?),
            ip_dscp: valid_attr(v[13], read_u8(r)?),
            l4_dst_port: valid_attr(v[14], read_u16(r)?),
            l4_src_port: valid_attr(v[15], read_u16(r)?),
            icmp_type: valid_attr(v[16], read_u8(r)?),
            icmp_code: valid_attr(v[17], read_u8(r)?),
        })
    }
}

/* ## ---------------- ## */
/* ## Policing profile ## */
/* ## ---------------- ## */

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyPolicingProfile {
    pub policingprofile_name: String,
}

impl IpcStructType for KeyPolicingProfile {
    const NAME: &'static str = "key_policingprofile";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name(w, &self.policingprofile_name, FL_NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyPolicingProfile {
            policingprofile_name: read_name(r, FL_NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyPolicingProfileEntry {
    pub policingprofile_key: KeyPolicingProfile,
    pub sequence_num: u8,
}

impl IpcStructType for KeyPolicingProfileEntry {
    const NAME: &'static str = "key_policingprofile_entry";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.policingprofile_key.encode(w)?;
        w.write_u8(self.sequence_num)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyPolicingProfileEntry {
            policingprofile_key: KeyPolicingProfile::decode(r)?,
            sequence_num: read_u8(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValPolicingProfileEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flowlist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cir: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cbs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pir: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pbs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green_action: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yellow_action: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red_action: Option<u8>,
}

impl IpcStructType for ValPolicingProfileEntry {
    const NAME: &'static str = "val_policingprofile_entry";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.flowlist),
            ValidFlag::of(&self.rate),
            ValidFlag::of(&self.cir),
            ValidFlag::of(&self.cbs),
            ValidFlag::of(&self.pir),
            ValidFlag::of(&self.pbs),
            ValidFlag::of(&self.green_action),
            ValidFlag::of(&self.yellow_action),
            ValidFlag::of(&self.red_action),
        ];
        write_valid(w, &flags, true)?;
        write_opt_name(w, &self.flowlist, FL_NAME_LEN)?;
        write_opt_u8(w, self.rate)?;
        write_opt_u32(w, self.cir)?;
        write_opt_u32(w, self.cbs)?;
        write_opt_u32(w, self.pir)?;
        write_opt_u32(w, self.pbs)?;
        write_opt_u8(w, self.green_action)?;
        write_opt_u8(w, self.yellow_action)?;
        write_opt_u8(w, self.red_action)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let v = read_valid(r, 9, true)?;
        Ok(ValPolicingProfileEntry {
            flowlist: valid_attr(v[0], read_name(r, FL_NAME_LEN)?),
            rate: valid_attr(v[1], read_u8(r)?),
            cir: valid_attr(v[2], read_u32(r)?),
            cbs: valid_attr(v[3], read_u32(r)?),
            pir: valid_attr(v[4], read_u32(r)?),
            pbs: valid_attr(v[5], read_u32(r)?),
            green_action: valid_attr(v[6], read_u8(r)?),
            yellow_action: valid_attr(v[7], read_u8(r)?),
            red_action: valid_attr(v[8], read_u8(r)?),
        })
    }
}

/* ## ---------------- ## */
/* ## VTN flow filters ## */
/* ## ---------------- ## */

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyVtnFlowfilter {
    pub vtn_key: KeyVtn,
    pub input_direction: u8,
}

impl IpcStructType for KeyVtnFlowfilter {
    const NAME: &'static str = "key_vtn_flowfilter";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.vtn_key.encode(w)?;
        w.write_u8(self.input_direction)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyVtnFlowfilter {
            vtn_key: KeyVtn::decode(r)?,
            input_direction: read_u8(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyVtnFlowfilterEntry {
    pub flowfilter_key: KeyVtnFlowfilter,
    pub sequence_num: u16,
}

impl IpcStructType for KeyVtnFlowfilterEntry {
    const NAME: &'static str = "key_vtn_flowfilter_entry";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.flowfilter_key.encode(w)?;
        w.write_u16::<NetworkEndian>(self.sequence_num)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyVtnFlowfilterEntry {
            flowfilter_key: KeyVtnFlowfilter::decode(r)?,
            sequence_num: read_u16(r)?,
        })
    }
}

/// What a VTN flow filter entry does with the packets its flowlist matches
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValVtnFlowfilterEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flowlist_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nwm_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dscp: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

impl IpcStructType for ValVtnFlowfilterEntry {
    const NAME: &'static str = "val_vtn_flowfilter_entry";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.flowlist_name),
            ValidFlag::of(&self.action),
            ValidFlag::of(&self.nwm_name),
            ValidFlag::of(&self.dscp),
            ValidFlag::of(&self.priority),
        ];
        write_valid(w, &flags, true)?;
        write_opt_name(w, &self.flowlist_name, FL_NAME_LEN)?;
        write_opt_u8(w, self.action)?;
        write_opt_name(w, &self.nwm_name, NAME_LEN)?;
        write_opt_u8(w, self.dscp)?;
        write_opt_u8(w, self.priority)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let v = read_valid(r, 5, true)?;
        Ok(ValVtnFlowfilterEntry {
            flowlist_name: valid_attr(v[0], read_name(r, FL_NAME_LEN)?),
            action: valid_attr(v[1], read_u8(r)?),
            nwm_name: valid_attr(v[2], read_name(r, NAME_LEN)?),
            dscp: valid_attr(v[3], read_u8(r)?),
            priority: valid_attr(v[4], read_u8(r)?),
        })
    }
}

/* ## ---------------------------- ## */
/* ## Path policies applied to VTNs ## */
/* ## ---------------------------- ## */

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyVtnPathmapEntry {
    pub vtn_key: KeyVtn,
    pub sequence_num: u16,
}

impl IpcStructType for KeyVtnPathmapEntry {
    const NAME: &'static str = "key_vtn_pathmap_entry";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.vtn_key.encode(w)?;
        w.write_u16::<NetworkEndian>(self.sequence_num)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyVtnPathmapEntry {
            vtn_key: KeyVtn::decode(r)?,
            sequence_num: read_u16(r)?,
        })
    }
}

/// Routes the packets a flowlist matches along a path policy
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValVtnPathmapEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flowlist_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_timeout: Option<u16>,
}

impl IpcStructType for ValVtnPathmapEntry {
    const NAME: &'static str = "val_vtn_pathmap_entry";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.flowlist_name),
            ValidFlag::of(&self.policy_id),
            ValidFlag::of(&self.idle_timeout),
            ValidFlag::of(&self.hard_timeout),
        ];
        write_valid(w, &flags, true)?;
        write_opt_name(w, &self.flowlist_name, FL_NAME_LEN)?;
        write_opt_u8(w, self.policy_id)?;
        write_opt_u16(w, self.idle_timeout)?;
        write_opt_u16(w, self.hard_timeout)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let v = read_valid(r, 4, true)?;
        Ok(ValVtnPathmapEntry {
            flowlist_name: valid_attr(v[0], read_name(r, FL_NAME_LEN)?),
            policy_id: valid_attr(v[1], read_u8(r)?),
            idle_timeout: valid_attr(v[2], read_u16(r)?),
            hard_timeout: valid_attr(v[3], read_u16(r)?),
        })
    }
}

/* ## ------------ ## */
/* ## VTN stations ## */
/* ## ------------ ## */

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyVtnstationController {
    pub controller_name: String,
}

impl IpcStructType for KeyVtnstationController {
    const NAME: &'static str = "key_vtnstation_controller";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name(w, &self.controller_name, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyVtnstationController {
            controller_name: read_name(r, NAME_LEN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn val_vbr_if_nested_port_map() {
        let val = ValVbrIf {
            admin_status: Some(1),
            description: None,
            portmap: Some(ValPortMap {
                logical_port_id: Some("PP-0000-0000-0000-0001-s1-eth1".to_owned()),
                vlan_id: Some(10),
                tagged: Some(1),
            }),
        };
        let mut buf = vec![];
        val.encode(&mut buf).unwrap();
        // valid, cs, admin_status, description, port map
        let expected_len = 3 + 4 + 1 + DESCRIPTION_LEN + 3 + LOGICAL_PORT_ID_LEN + 2 + 1;
        assert_eq!(expected_len, buf.len());
        assert_eq!(&[1, 0, 1], &buf[..3]);
        assert_eq!(val, ValVbrIf::decode(&mut Cursor::new(buf)).unwrap());
    }

    #[test]
    fn key_vlan_map_port_flag() {
        let key = KeyVlanMap {
            vbr_key: KeyVbr::default(),
            logical_port_id: None,
        };
        let mut buf = vec![];
        key.encode(&mut buf).unwrap();
        assert_eq!(Some(&0), buf.last());
        assert_eq!(key, KeyVlanMap::decode(&mut Cursor::new(buf)).unwrap());
    }

    #[test]
    fn valid_no_value_decodes_as_absent() {
        let mut buf = vec![ValidFlag::ValidNoValue as u8, 0, 0];
        buf.extend_from_slice(&[0; DESCRIPTION_LEN]);
        let val = ValVtn::decode(&mut Cursor::new(buf)).unwrap();
        assert_eq!(None, val.description);
    }

    #[test]
    fn flowfilter_entry_layout() {
        let key = KeyVtnFlowfilterEntry {
            flowfilter_key: KeyVtnFlowfilter {
                vtn_key: KeyVtn::default(),
                input_direction: 1,
            },
            sequence_num: 0x0102,
        };
        let mut buf = vec![];
        key.encode(&mut buf).unwrap();
        assert_eq!(&[1, 1, 2], &buf[NAME_LEN..]);

        let val = ValVtnFlowfilterEntry {
            flowlist_name: Some("fl1".to_owned()),
            action: Some(1),
            nwm_name: None,
            dscp: None,
            priority: Some(7),
        };
        let mut buf = vec![];
        val.encode(&mut buf).unwrap();
        assert_eq!(5 + 6 + FL_NAME_LEN + 1 + NAME_LEN + 2, buf.len());
        assert_eq!(&[1, 1, 0, 0, 1], &buf[..5]);
        assert_eq!(val, ValVtnFlowfilterEntry::decode(&mut Cursor::new(buf)).unwrap());
    }

    #[test]
    fn pathmap_entry_layout() {
        let val = ValVtnPathmapEntry {
            flowlist_name: None,
            policy_id: Some(2),
            idle_timeout: Some(300),
            hard_timeout: None,
        };
        let mut buf = vec![];
        val.encode(&mut buf).unwrap();
        assert_eq!(4 + 5 + FL_NAME_LEN + 1 + 2 + 2, buf.len());
        assert_eq!(&[0, 1, 1, 0], &buf[..4]);
        assert_eq!(val, ValVtnPathmapEntry::decode(&mut Cursor::new(buf)).unwrap());
    }

    #[test]
    fn static_route_key_layout() {
        let key = KeyStaticIpRoute {
            vrt_key: KeyVrt::default(),
            dst_addr: Ipv4Addr::new(10, 0, 0, 0),
            dst_addr_prefixlen: 24,
            next_hop_addr: Ipv4Addr::new(192, 0, 2, 1),
            nwm_name: String::new(),
        };
        let mut buf = vec![];
        key.encode(&mut buf).unwrap();
        assert_eq!(2 * NAME_LEN + 4 + 1 + 4 + NAME_LEN, buf.len());
        assert_eq!(&[10, 0, 0, 0, 24, 192, 0, 2, 1], &buf[64..73]);
    }
}

/*!
Key and value structs of the physical service (UPPL)

Value structs of this service have no configuration status bytes.
*/

use std::io;
use std::io::{Read, Write};
use std::net::Ipv4Addr;

use structs::*;
use unc::ValidFlag;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyCtr {
    pub controller_name: String,
}

impl IpcStructType for KeyCtr {
    const NAME: &'static str = "key_ctr";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name(w, &self.controller_name, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyCtr {
            controller_name: read_name(r, NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValCtr {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_audit: Option<u8>,
}

impl IpcStructType for ValCtr {
    const NAME: &'static str = "val_ctr";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.type_),
            ValidFlag::of(&self.version),
            ValidFlag::of(&self.description),
            ValidFlag::of(&self.ip_address),
            ValidFlag::of(&self.user),
            ValidFlag::of(&self.password),
            ValidFlag::of(&self.enable_audit),
        ];
        write_valid(w, &flags, false)?;
        write_opt_u8(w, self.type_)?;
        write_opt_name(w, &self.version, NAME_LEN)?;
        write_opt_name(w, &self.description, DESCRIPTION_LEN)?;
        write_ipv4(w, self.ip_address)?;
        write_opt_name(w, &self.user, NAME_LEN)?;
        write_opt_name(w, &self.password, PASSWORD_LEN)?;
        write_opt_u8(w, self.enable_audit)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let v = read_valid(r, 7, false)?;
        Ok(ValCtr {
            type_: valid_attr(v[0], read_u8(r)?),
            version: valid_attr(v[1], read_name(r, NAME_LEN)?),
            description: valid_attr(v[2], read_name(r, DESCRIPTION_LEN)?),
            ip_address: valid_attr(v[3], read_ipv4(r)?),
            user: valid_attr(v[4], read_name(r, NAME_LEN)?),
            password: valid_attr(v[5], read_name(r, PASSWORD_LEN)?),
            enable_audit: valid_attr(v[6], read_u8(r)?),
        })
    }
}

/// Operational state of a controller, only sent by the southbound service
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValCtrSt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oper_status: Option<u8>,
}

impl IpcStructType for ValCtrSt {
    const NAME: &'static str = "val_ctr_st";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [ValidFlag::of(&self.actual_version), ValidFlag::of(&self.oper_status)];
        write_valid(w, &flags, false)?;
        write_opt_name(w, &self.actual_version, NAME_LEN)?;
        write_opt_u8(w, self.oper_status)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let v = read_valid(r, 2, false)?;
        Ok(ValCtrSt {
            actual_version: valid_attr(v[0], read_name(r, NAME_LEN)?),
            oper_status: valid_attr(v[1], read_u8(r)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyCtrDomain {
    pub ctr_key: KeyCtr,
    pub domain_name: String,
}

impl IpcStructType for KeyCtrDomain {
    const NAME: &'static str = "key_ctr_domain";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.ctr_key.encode(w)?;
        write_name(w, &self.domain_name, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyCtrDomain {
            ctr_key: KeyCtr::decode(r)?,
            domain_name: read_name(r, NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValCtrDomain {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IpcStructType for ValCtrDomain {
    const NAME: &'static str = "val_ctr_domain";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [ValidFlag::of(&self.type_), ValidFlag::of(&self.description)];
        write_valid(w, &flags, false)?;
        write_opt_u8(w, self.type_)?;
        write_opt_name(w, &self.description, DESCRIPTION_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let v = read_valid(r, 2, false)?;
        Ok(ValCtrDomain {
            type_: valid_attr(v[0], read_u8(r)?),
            description: valid_attr(v[1], read_name(r, DESCRIPTION_LEN)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeySwitch {
    pub ctr_key: KeyCtr,
    pub switch_id: String,
}

impl IpcStructType for KeySwitch {
    const NAME: &'static str = "key_switch";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.ctr_key.encode(w)?;
        write_name(w, &self.switch_id, SWITCH_ID_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeySwitch {
            ctr_key: KeyCtr::decode(r)?,
            switch_id: read_name(r, SWITCH_ID_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyPort {
    pub sw_key: KeySwitch,
    pub port_id: String,
}

impl IpcStructType for KeyPort {
    const NAME: &'static str = "key_port";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.sw_key.encode(w)?;
        write_name(w, &self.port_id, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyPort {
            sw_key: KeySwitch::decode(r)?,
            port_id: read_name(r, NAME_LEN)?,
        })
    }
}

/// A link between two switch ports of one controller
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyLink {
    pub ctr_key: KeyCtr,
    pub switch_id1: String,
    pub port_id1: String,
    pub switch_id2: String,
    pub port_id2: String,
}

impl IpcStructType for KeyLink {
    const NAME: &'static str = "key_link";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.ctr_key.encode(w)?;
        write_name(w, &self.switch_id1, SWITCH_ID_LEN)?;
        write_name(w, &self.port_id1, NAME_LEN)?;
        write_name(w, &self.switch_id2, SWITCH_ID_LEN)?;
        write_name(w, &self.port_id2, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyLink {
            ctr_key: KeyCtr::decode(r)?,
            switch_id1: read_name(r, SWITCH_ID_LEN)?,
            port_id1: read_name(r, NAME_LEN)?,
            switch_id2: read_name(r, SWITCH_ID_LEN)?,
            port_id2: read_name(r, NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyLogicalPort {
    pub domain_key: KeyCtrDomain,
    pub port_id: String,
}

impl IpcStructType for KeyLogicalPort {
    const NAME: &'static str = "key_logical_port";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.domain_key.encode(w)?;
        write_name(w, &self.port_id, LOGICAL_PORT_ID_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyLogicalPort {
            domain_key: KeyCtrDomain::decode(r)?,
            port_id: read_name(r, LOGICAL_PORT_ID_LEN)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KeyBoundary {
    pub boundary_id: String,
}

impl IpcStructType for KeyBoundary {
    const NAME: &'static str = "key_boundary";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_name(w, &self.boundary_id, NAME_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(KeyBoundary {
            boundary_id: read_name(r, NAME_LEN)?,
        })
    }
}

/// Both ends of a boundary between two controller domains
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValBoundary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_name1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_port_id1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_name2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_port_id2: Option<String>,
}

impl IpcStructType for ValBoundary {
    const NAME: &'static str = "val_boundary";

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let flags = [
            ValidFlag::of(&self.description),
            ValidFlag::of(&self.controller_name1),
            ValidFlag::of(&self.domain_name1),
            ValidFlag::of(&self.logical_port_id1),
            ValidFlag::of(&self.controller_name2),
            ValidFlag::of(&self.domain_name2),
            ValidFlag::of(&self.logical_port_id2),
        ];
        write_valid(w, &flags, false)?;
        write_opt_name(w, &self.description, DESCRIPTION_LEN)?;
        write_opt_name(w, &self.controller_name1, NAME_LEN)?;
        write_opt_name(w, &self.domain_name1, NAME_LEN)?;
        write_opt_name(w, &self.logical_port_id1, LOGICAL_PORT_ID_LEN)?;
        write_opt_name(w, &self.controller_name2, NAME_LEN)?;
        write_opt_name(w, &self.domain_name2, NAME_LEN)?;
        write_opt_name(w, &self.logical_port_id2, LOGICAL_PORT_ID_LEN)
    }

    fn decode<R: Read>(r: &mut R) -> io::Result<Self> {
        let v = read_valid(r, 7, false)?;
        Ok(ValBoundary {
            description: valid_attr(v[0], read_name(r, DESCRIPTION_LEN)?),
            controller_name1: valid_attr(v[1], read_name(r, NAME_LEN)?),
            domain_name1: valid_attr(v[2], read_name(r, NAME_LEN)?),
            logical_port_id1: valid_attr(v[3], read_name(r, LOGICAL_PORT_ID_LEN)?),
            controller_name2: valid_attr(v[4], read_name(r, NAME_LEN)?),
            domain_name2: valid_attr(v[5], read_name(r, NAME_LEN)?),
            logical_port_id2: valid_attr(v[6], read_name(r, LOGICAL_PORT_ID_LEN)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn val_ctr_hides_password() {
        let val = IpcStruct::from(ValCtr {
            type_: Some(4),
            password: Some("s3cr3t".to_owned()),
            ..ValCtr::default()
        });
        assert_eq!(json!({"type": 4}), val.to_json());
    }

    #[test]
    fn key_port_embeds_switch() {
        let key = IpcStruct::from(KeyPort {
            sw_key: KeySwitch {
                ctr_key: KeyCtr {
                    controller_name: "odc1".to_owned(),
                },
                switch_id: "00:00:00:00:00:00:00:01".to_owned(),
            },
            port_id: "s1-eth1".to_owned(),
        });
        let mut buf = vec![];
        key.encode(&mut buf).unwrap();
        assert_eq!(NAME_LEN + SWITCH_ID_LEN + NAME_LEN, buf.len());
        assert_eq!(key, IpcStruct::decode("key_port", &buf).unwrap());
    }

    #[test]
    fn val_boundary_decodes() {
        let val = IpcStruct::from(ValBoundary {
            controller_name1: Some("odc1".to_owned()),
            logical_port_id2: Some("PP-1".to_owned()),
            ..ValBoundary::default()
        });
        let mut buf = vec![];
        val.encode(&mut buf).unwrap();
        assert_eq!(&[0, 1, 0, 0, 0, 0, 1], &buf[..7]);
        assert_eq!(val, IpcStruct::decode("val_boundary", &buf).unwrap());
    }
}

//! Builders for the structs of the physical service

use conf::ControllerTypes;
use factory::Source;
use structs::*;

const AUDIT: [(&str, u8); 2] = [("true", 1), ("false", 0)];
const DOMAIN_TYPE: [(&str, u8); 2] = [("default", 1), ("normal", 2)];

/// Separator of the ends in a link name
const LINK_NAME_SEPARATOR: char = '~';

pub fn key_ctr(src: &Source, leaf: bool) -> KeyCtr {
    KeyCtr {
        controller_name: src.key_name("controller", "controller_id", 0, leaf, NAME_LEN),
    }
}

/// The controller `type` is one of the configured type names
pub fn val_ctr(src: &Source, types: &ControllerTypes) -> ValCtr {
    let attrs = src.attrs("controller");
    let type_ = attrs.string("type", NAME_LEN).and_then(|t| {
        let code = types.code(&t);
        if code.is_none() {
            warn!("Ignoring unknown controller type {}", t);
        }
        code
    });
    ValCtr {
        type_: type_,
        version: attrs.string("version", NAME_LEN),
        description: attrs.string("description", DESCRIPTION_LEN),
        ip_address: attrs.ipv4("ipaddr"),
        user: attrs.string("username", NAME_LEN),
        password: attrs.string("password", PASSWORD_LEN),
        enable_audit: attrs.mapped("enable_audit", &AUDIT),
    }
}

pub fn key_ctr_domain(src: &Source, leaf: bool) -> KeyCtrDomain {
    KeyCtrDomain {
        ctr_key: key_ctr(src, false),
        domain_name: src.key_name("domain", "domain_id", 1, leaf, NAME_LEN),
    }
}

pub fn val_ctr_domain(src: &Source) -> ValCtrDomain {
    let attrs = src.attrs("domain");
    ValCtrDomain {
        type_: attrs.mapped("type", &DOMAIN_TYPE),
        description: attrs.string("description", DESCRIPTION_LEN),
    }
}

pub fn key_switch(src: &Source, leaf: bool) -> KeySwitch {
    KeySwitch {
        ctr_key: key_ctr(src, false),
        switch_id: src.key_name("switch", "switch_id", 1, leaf, SWITCH_ID_LEN),
    }
}

pub fn key_port(src: &Source, leaf: bool) -> KeyPort {
    KeyPort {
        sw_key: key_switch(src, false),
        port_id: src.key_name("port", "port_name", 2, leaf, NAME_LEN),
    }
}

/// A link is named `<switch1>~<port1>~<switch2>~<port2>` in the URI and
/// the index, single ends given in `body.link` take precedence
pub fn key_link(src: &Source, leaf: bool) -> KeyLink {
    let name = src.key_raw("link", "link_name", 1, leaf).unwrap_or_default();
    let mut ends: Vec<&str> = name.split(LINK_NAME_SEPARATOR).collect();
    if ends.len() != 4 {
        if !name.is_empty() {
            warn!("Ignoring link name {}", name);
        }
        ends = vec![""; 4];
    }
    let attrs = src.attrs("link");
    let end = |field: &str, i: usize, width: usize| {
        attrs
            .string(field, width)
            .unwrap_or_else(|| ends[i].chars().take(width - 1).collect())
    };
    KeyLink {
        ctr_key: key_ctr(src, false),
        switch_id1: end("switch1_id", 0, SWITCH_ID_LEN),
        port_id1: end("port1_name", 1, NAME_LEN),
        switch_id2: end("switch2_id", 2, SWITCH_ID_LEN),
        port_id2: end("port2_name", 3, NAME_LEN),
    }
}

pub fn key_logical_port(src: &Source, leaf: bool) -> KeyLogicalPort {
    KeyLogicalPort {
        domain_key: key_ctr_domain(src, false),
        port_id: src.key_name("logical_port", "logical_port_id", 2, leaf, LOGICAL_PORT_ID_LEN),
    }
}

pub fn key_boundary(src: &Source, leaf: bool) -> KeyBoundary {
    KeyBoundary {
        boundary_id: src.key_name("boundary", "boundary_id", 0, leaf, NAME_LEN),
    }
}

/// Both ends are taken from `body.boundary.link`
pub fn val_boundary(src: &Source) -> ValBoundary {
    let attrs = src.attrs("boundary");
    let link = attrs.nested("link");
    ValBoundary {
        description: attrs.string("description", DESCRIPTION_LEN),
        controller_name1: link.string("controller1_id", NAME_LEN),
        domain_name1: link.string("domain1_id", NAME_LEN),
        logical_port_id1: link.string("logical_port1_id", LOGICAL_PORT_ID_LEN),
        controller_name2: link.string("controller2_id", NAME_LEN),
        domain_name2: link.string("domain2_id", NAME_LEN),
        logical_port_id2: link.string("logical_port2_id", LOGICAL_PORT_ID_LEN),
    }
}

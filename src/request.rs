/*!
The request catalogue and the request packet

Every symbolic request name maps to a static descriptor holding the
protocol constants of its packet and the struct types it carries.
*/

use ipc::units::IpcDataUnit;
use std::fmt;
use structs::{IpcStruct, StructKind};
use unc::{DataType, KeyType, Operation, Option1, Option2};

/// The protocol constants a request packet starts from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestDescriptor {
    pub operation: Operation,
    pub option1: Option1,
    pub option2: Option2,
    pub data_type: DataType,
    pub key_type: KeyType,
    pub key: StructKind,
    pub value: Option<StructKind>,
}

macro_rules! request_catalogue {
    ($($variant:ident: $name:tt => $op:ident, $opt2:ident, $dt:ident, $kt:ident, $key:ident, $val:expr;)*) => {
        /// A symbolic request as named by the API layer
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum IpcRequest {
            $($variant),*
        }

        /// Every request of the catalogue
        pub const ALL_REQUESTS: &[IpcRequest] = &[$(IpcRequest::$variant),*];

        impl IpcRequest {
            pub fn name(&self) -> &'static str {
                match *self {
                    $(IpcRequest::$variant => $name),*
                }
            }

            pub fn from_name(name: &str) -> Option<IpcRequest> {
                match name {
                    $($name => Some(IpcRequest::$variant),)*
                    _ => None,
                }
            }

            pub fn descriptor(&self) -> RequestDescriptor {
                match *self {
                    $(IpcRequest::$variant => RequestDescriptor {
                        operation: Operation::$op,
                        option1: Option1::Normal,
                        option2: Option2::$opt2,
                        data_type: DataType::$dt,
                        key_type: KeyType::$kt,
                        key: StructKind::$key,
                        value: $val,
                    }),*
                }
            }
        }
    };
}

request_catalogue! {
    VtnCreate: "KT_VTN_CREATE" => Create, None, Candidate, Vtn, KeyVtn, Some(StructKind::ValVtn);
    VtnUpdate: "KT_VTN_UPDATE" => Update, None, Candidate, Vtn, KeyVtn, Some(StructKind::ValVtn);
    VtnDelete: "KT_VTN_DELETE" => Delete, None, Candidate, Vtn, KeyVtn, None;
    VtnGet: "KT_VTN_GET" => Read, None, State, Vtn, KeyVtn, None;

    VbridgeCreate: "KT_VBRIDGE_CREATE" => Create, None, Candidate, Vbridge, KeyVbr, Some(StructKind::ValVbr);
    VbridgeUpdate: "KT_VBRIDGE_UPDATE" => Update, None, Candidate, Vbridge, KeyVbr, Some(StructKind::ValVbr);
    VbridgeDelete: "KT_VBRIDGE_DELETE" => Delete, None, Candidate, Vbridge, KeyVbr, None;
    VbridgeGet: "KT_VBRIDGE_GET" => Read, None, State, Vbridge, KeyVbr, None;

    VbrIfCreate: "KT_VBR_IF_CREATE" => Create, None, Candidate, VbrIf, KeyVbrIf, Some(StructKind::ValVbrIf);
    VbrIfUpdate: "KT_VBR_IF_UPDATE" => Update, None, Candidate, VbrIf, KeyVbrIf, Some(StructKind::ValVbrIf);
    VbrIfDelete: "KT_VBR_IF_DELETE" => Delete, None, Candidate, VbrIf, KeyVbrIf, None;
    VbrIfGet: "KT_VBR_IF_GET" => Read, None, State, VbrIf, KeyVbrIf, None;

    VbrVlanMapCreate: "KT_VBR_VLANMAP_CREATE" => Create, None, Candidate, VbrVlanMap, KeyVlanMap, Some(StructKind::ValVlanMap);
    VbrVlanMapUpdate: "KT_VBR_VLANMAP_UPDATE" => Update, None, Candidate, VbrVlanMap, KeyVlanMap, Some(StructKind::ValVlanMap);
    VbrVlanMapDelete: "KT_VBR_VLANMAP_DELETE" => Delete, None, Candidate, VbrVlanMap, KeyVlanMap, None;
    VbrVlanMapGet: "KT_VBR_VLANMAP_GET" => Read, None, State, VbrVlanMap, KeyVlanMap, None;

    VrouterCreate: "KT_VROUTER_CREATE" => Create, None, Candidate, Vrouter, KeyVrt, Some(StructKind::ValVrt);
    VrouterUpdate: "KT_VROUTER_UPDATE" => Update, None, Candidate, Vrouter, KeyVrt, Some(StructKind::ValVrt);
    VrouterDelete: "KT_VROUTER_DELETE" => Delete, None, Candidate, Vrouter, KeyVrt, None;
    VrouterGet: "KT_VROUTER_GET" => Read, None, State, Vrouter, KeyVrt, None;

    VrtIfCreate: "KT_VRT_IF_CREATE" => Create, None, Candidate, VrtIf, KeyVrtIf, Some(StructKind::ValVrtIf);
    VrtIfUpdate: "KT_VRT_IF_UPDATE" => Update, None, Candidate, VrtIf, KeyVrtIf, Some(StructKind::ValVrtIf);
    VrtIfDelete: "KT_VRT_IF_DELETE" => Delete, None, Candidate, VrtIf, KeyVrtIf, None;
    VrtIfGet: "KT_VRT_IF_GET" => Read, None, State, VrtIf, KeyVrtIf, None;

    StaticIpRouteCreate: "KT_VRT_STATIC_IP_ROUTE_CREATE" => Create, None, Candidate, VrtStaticIpRoute, KeyStaticIpRoute, Some(StructKind::ValStaticIpRoute);
    StaticIpRouteUpdate: "KT_VRT_STATIC_IP_ROUTE_UPDATE" => Update, None, Candidate, VrtStaticIpRoute, KeyStaticIpRoute, Some(StructKind::ValStaticIpRoute);
    StaticIpRouteDelete: "KT_VRT_STATIC_IP_ROUTE_DELETE" => Delete, None, Candidate, VrtStaticIpRoute, KeyStaticIpRoute, None;
    StaticIpRouteGet: "KT_VRT_STATIC_IP_ROUTE_GET" => Read, None, State, VrtStaticIpRoute, KeyStaticIpRoute, None;

    FlowlistCreate: "KT_FLOWLIST_CREATE" => Create, None, Candidate, Flowlist, KeyFlowlist, Some(StructKind::ValFlowlist);
    FlowlistDelete: "KT_FLOWLIST_DELETE" => Delete, None, Candidate, Flowlist, KeyFlowlist, None;
    FlowlistGet: "KT_FLOWLIST_GET" => Read, None, State, Flowlist, KeyFlowlist, None;

    FlowlistEntryCreate: "KT_FLOWLIST_ENTRY_CREATE" => Create, None, Candidate, FlowlistEntry, KeyFlowlistEntry, Some(StructKind::ValFlowlistEntry);
    FlowlistEntryUpdate: "KT_FLOWLIST_ENTRY_UPDATE" => Update, None, Candidate, FlowlistEntry, KeyFlowlistEntry, Some(StructKind::ValFlowlistEntry);
    FlowlistEntryDelete: "KT_FLOWLIST_ENTRY_DELETE" => Delete, None, Candidate, FlowlistEntry, KeyFlowlistEntry, None;
    FlowlistEntryGet: "KT_FLOWLIST_ENTRY_GET" => Read, None, State, FlowlistEntry, KeyFlowlistEntry, None;

    PolicingProfileCreate: "KT_POLICINGPROFILE_CREATE" => Create, None, Candidate, PolicingProfile, KeyPolicingProfile, None;
    PolicingProfileDelete: "KT_POLICINGPROFILE_DELETE" => Delete, None, Candidate, PolicingProfile, KeyPolicingProfile, None;
    PolicingProfileGet: "KT_POLICINGPROFILE_GET" => Read, None, State, PolicingProfile, KeyPolicingProfile, None;

    PolicingProfileEntryCreate: "KT_POLICINGPROFILE_ENTRY_CREATE" => Create, None, Candidate, PolicingProfileEntry, KeyPolicingProfileEntry, Some(StructKind::ValPolicingProfileEntry);
    PolicingProfileEntryUpdate: "KT_POLICINGPROFILE_ENTRY_UPDATE" => Update, None, Candidate, PolicingProfileEntry, KeyPolicingProfileEntry, Some(StructKind::ValPolicingProfileEntry);
    PolicingProfileEntryDelete: "KT_POLICINGPROFILE_ENTRY_DELETE" => Delete, None, Candidate, PolicingProfileEntry, KeyPolicingProfileEntry, None;
    PolicingProfileEntryGet: "KT_POLICINGPROFILE_ENTRY_GET" => Read, None, State, PolicingProfileEntry, KeyPolicingProfileEntry, None;

    VtnFlowfilterCreate: "KT_VTN_FLOWFILTER_CREATE" => Create, None, Candidate, VtnFlowfilter, KeyVtnFlowfilter, None;
    VtnFlowfilterDelete: "KT_VTN_FLOWFILTER_DELETE" => Delete, None, Candidate, VtnFlowfilter, KeyVtnFlowfilter, None;
    VtnFlowfilterGet: "KT_VTN_FLOWFILTER_GET" => Read, None, State, VtnFlowfilter, KeyVtnFlowfilter, None;

    VtnFlowfilterEntryCreate: "KT_VTN_FLOWFILTER_ENTRY_CREATE" => Create, None, Candidate, VtnFlowfilterEntry, KeyVtnFlowfilterEntry, Some(StructKind::ValVtnFlowfilterEntry);
    VtnFlowfilterEntryUpdate: "KT_VTN_FLOWFILTER_ENTRY_UPDATE" => Update, None, Candidate, VtnFlowfilterEntry, KeyVtnFlowfilterEntry, Some(StructKind::ValVtnFlowfilterEntry);
    VtnFlowfilterEntryDelete: "KT_VTN_FLOWFILTER_ENTRY_DELETE" => Delete, None, Candidate, VtnFlowfilterEntry, KeyVtnFlowfilterEntry, None;
    VtnFlowfilterEntryGet: "KT_VTN_FLOWFILTER_ENTRY_GET" => Read, None, State, VtnFlowfilterEntry, KeyVtnFlowfilterEntry, None;

    VtnPathmapEntryCreate: "KT_VTN_PATHMAP_ENTRY_CREATE" => Create, None, Candidate, VtnPathmapEntry, KeyVtnPathmapEntry, Some(StructKind::ValVtnPathmapEntry);
    VtnPathmapEntryUpdate: "KT_VTN_PATHMAP_ENTRY_UPDATE" => Update, None, Candidate, VtnPathmapEntry, KeyVtnPathmapEntry, Some(StructKind::ValVtnPathmapEntry);
    VtnPathmapEntryDelete: "KT_VTN_PATHMAP_ENTRY_DELETE" => Delete, None, Candidate, VtnPathmapEntry, KeyVtnPathmapEntry, None;
    VtnPathmapEntryGet: "KT_VTN_PATHMAP_ENTRY_GET" => Read, None, State, VtnPathmapEntry, KeyVtnPathmapEntry, None;

    VtnstationControllerGet: "KT_VTNSTATION_CONTROLLER_GET" => Read, None, State, VtnstationController, KeyVtnstationController, None;

    ControllerCreate: "KT_CONTROLLER_CREATE" => Create, None, Candidate, Controller, KeyCtr, Some(StructKind::ValCtr);
    ControllerUpdate: "KT_CONTROLLER_UPDATE" => Update, None, Candidate, Controller, KeyCtr, Some(StructKind::ValCtr);
    ControllerDelete: "KT_CONTROLLER_DELETE" => Delete, None, Candidate, Controller, KeyCtr, None;
    ControllerGet: "KT_CONTROLLER_GET" => Read, None, State, Controller, KeyCtr, None;

    DomainCreate: "KT_CTR_DOMAIN_CREATE" => Create, None, Candidate, Domain, KeyCtrDomain, Some(StructKind::ValCtrDomain);
    DomainUpdate: "KT_CTR_DOMAIN_UPDATE" => Update, None, Candidate, Domain, KeyCtrDomain, Some(StructKind::ValCtrDomain);
    DomainDelete: "KT_CTR_DOMAIN_DELETE" => Delete, None, Candidate, Domain, KeyCtrDomain, None;
    DomainGet: "KT_CTR_DOMAIN_GET" => Read, None, State, Domain, KeyCtrDomain, None;

    BoundaryCreate: "KT_BOUNDARY_CREATE" => Create, None, Candidate, Boundary, KeyBoundary, Some(StructKind::ValBoundary);
    BoundaryUpdate: "KT_BOUNDARY_UPDATE" => Update, None, Candidate, Boundary, KeyBoundary, Some(StructKind::ValBoundary);
    BoundaryDelete: "KT_BOUNDARY_DELETE" => Delete, None, Candidate, Boundary, KeyBoundary, None;
    BoundaryGet: "KT_BOUNDARY_GET" => Read, None, State, Boundary, KeyBoundary, None;

    SwitchGet: "KT_SWITCH_GET" => Read, None, State, Switch, KeySwitch, None;
    PortGet: "KT_PORT_GET" => Read, None, State, Port, KeyPort, None;
    PortNeighborGet: "KT_PORT_NEIGHBOR_GET" => Read, Neighbor, State, Port, KeyPort, None;
    LinkGet: "KT_LINK_GET" => Read, None, State, Link, KeyLink, None;
    LogicalPortGet: "KT_LOGICAL_PORT_GET" => Read, None, State, LogicalPort, KeyLogicalPort, None;
    LogicalPortBoundaryGet: "KT_LOGICAL_PORT_BOUNDARY_GET" => Read, Boundary, State, LogicalPort, KeyLogicalPort, None;
}

impl IpcRequest {
    /// Reads whose empty result is a list rather than a missing object
    pub fn is_read_as_list(&self) -> bool {
        match *self {
            IpcRequest::VtnstationControllerGet | IpcRequest::LinkGet | IpcRequest::SwitchGet => true,
            _ => false,
        }
    }

    /// Reads the API layer issues several times to assemble one response
    pub fn is_multi_call(&self) -> bool {
        match *self {
            IpcRequest::PortGet
            | IpcRequest::PortNeighborGet
            | IpcRequest::LogicalPortGet
            | IpcRequest::LogicalPortBoundaryGet => true,
            _ => false,
        }
    }
}

impl fmt::Display for IpcRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One request as pushed onto a client session
#[derive(Debug, Clone, PartialEq)]
pub struct IpcRequestPacket {
    /// The catalogue entry this packet was built from
    pub request: IpcRequest,
    pub session_id: u32,
    pub config_id: u32,
    pub operation: Operation,
    /// Zero for all but the read operations
    pub max_rep_count: u32,
    pub option1: Option1,
    pub option2: Option2,
    pub data_type: DataType,
    pub key_type: KeyType,
    pub key: IpcStruct,
    pub value: Option<IpcStruct>,
    pub extra_data_units: Vec<IpcDataUnit>,
}

impl IpcRequestPacket {
    /// The data units of this packet in the order they are pushed
    pub fn units(&self) -> Vec<IpcDataUnit> {
        let mut units = vec![
            IpcDataUnit::Uint32(self.session_id),
            IpcDataUnit::Uint32(self.config_id),
            IpcDataUnit::Uint32(self.operation as u32),
            IpcDataUnit::Uint32(self.max_rep_count),
            IpcDataUnit::Uint32(self.option1 as u32),
            IpcDataUnit::Uint32(self.option2 as u32),
            IpcDataUnit::Uint32(self.data_type as u32),
            IpcDataUnit::Uint32(self.key_type as u32),
            IpcDataUnit::Struct(self.key.clone()),
        ];
        if let Some(ref value) = self.value {
            units.push(IpcDataUnit::Struct(value.clone()));
        }
        units.extend(self.extra_data_units.iter().cloned());
        units
    }
}

impl fmt::Display for IpcRequestPacket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} session={} config={} op={:?} max_rep={} opt1={:?} opt2={:?} dt={:?} kt={}",
            self.request,
            self.session_id,
            self.config_id,
            self.operation,
            self.max_rep_count,
            self.option1,
            self.option2,
            self.data_type,
            self.key_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use structs::KeyVtn;
    use unc::KeyTypeRange;

    #[test]
    fn names_are_unique_and_resolvable() {
        let mut names = HashSet::new();
        for request in ALL_REQUESTS {
            assert!(names.insert(request.name()));
            assert_eq!(Some(*request), IpcRequest::from_name(request.name()));
        }
        assert_eq!(None, IpcRequest::from_name("KT_NOTHING_GET"));
    }

    #[test]
    fn descriptors_are_consistent() {
        for request in ALL_REQUESTS {
            let d = request.descriptor();
            assert!(d.key_type.range() != KeyTypeRange::Unclassified);
            if d.operation.is_read_family() {
                assert_eq!(DataType::State, d.data_type, "{}", request);
                assert!(request.name().ends_with("_GET"));
            }
            else {
                assert_eq!(DataType::Candidate, d.data_type, "{}", request);
            }
            if d.operation == Operation::Delete {
                assert_eq!(None, d.value, "{}", request);
            }
        }
    }

    #[test]
    fn options_of_multi_call_reads() {
        assert_eq!(Option2::Neighbor, IpcRequest::PortNeighborGet.descriptor().option2);
        assert_eq!(Option2::Boundary, IpcRequest::LogicalPortBoundaryGet.descriptor().option2);
        assert!(IpcRequest::PortGet.is_multi_call());
        assert!(!IpcRequest::PortGet.is_read_as_list());
        assert!(IpcRequest::SwitchGet.is_read_as_list());
    }

    #[test]
    fn push_order() {
        let packet = IpcRequestPacket {
            request: IpcRequest::VtnGet,
            session_id: 1,
            config_id: 2,
            operation: Operation::ReadSibling,
            max_rep_count: 100,
            option1: Option1::Normal,
            option2: Option2::None,
            data_type: DataType::Running,
            key_type: KeyType::Vtn,
            key: KeyVtn::default().into(),
            value: None,
            extra_data_units: vec![IpcDataUnit::Null],
        };
        let units = packet.units();
        let scalars: Vec<_> = units[..8].iter().map(|u| u.as_u64().unwrap()).collect();
        assert_eq!(vec![1, 2, 9, 100, 0, 0, 3, 0x00a], scalars);
        assert_eq!(IpcDataUnit::Struct(KeyVtn::default().into()), units[8]);
        assert_eq!(IpcDataUnit::Null, units[9]);
        assert_eq!(10, units.len());
    }
}

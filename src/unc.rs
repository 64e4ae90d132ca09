/*!
The UNC protocol enumerations shared by the logical (UPLL) and
physical (UPPL) services.

The numeric values are the ones put on the wire as `uint32` data units.
*/

use std::fmt;

/// The operation a request packet asks the southbound service to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Invalid = 0,
    Create = 1,
    Delete = 2,
    Update = 3,
    Control = 4,
    Rename = 5,
    Read = 6,
    ReadNext = 7,
    ReadBulk = 8,
    ReadSibling = 9,
    ReadSiblingBegin = 10,
    ReadSiblingCount = 11,
}

impl Operation {
    /// Checks whether this is one of the read operations
    pub fn is_read_family(&self) -> bool {
        (*self as u32) >= Operation::Read as u32
    }

    /// Checks whether this is one of the sibling read variants
    pub fn is_sibling_read(&self) -> bool {
        match *self {
            Operation::ReadSibling | Operation::ReadSiblingBegin | Operation::ReadSiblingCount => {
                true
            }
            _ => false,
        }
    }

    /// Checks whether this operation changes configuration
    pub fn is_mutating(&self) -> bool {
        match *self {
            Operation::Create | Operation::Delete | Operation::Update | Operation::Rename => true,
            _ => false,
        }
    }
}

/// The datastore a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Invalid = 0,
    State = 1,
    Candidate = 2,
    Running = 3,
    Startup = 4,
    Import = 5,
    Audit = 6,
}

impl DataType {
    /// Maps a `targetdb` value of a request body.
    /// Unknown names yield `None`, so the caller keeps its data type.
    pub fn from_target_db(name: &str) -> Option<DataType> {
        match name {
            "startup" => Some(DataType::Startup),
            "running" => Some(DataType::Running),
            "candidate" => Some(DataType::Candidate),
            "state" => Some(DataType::State),
            _ => None,
        }
    }
}

/// First operation modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Option1 {
    Normal = 0,
    Detail = 1,
    Count = 2,
}

/// Second operation modifier, refining what a read returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Option2 {
    None = 0,
    L2Domain = 1,
    MacEntry = 2,
    MacEntryStatic = 3,
    MacEntryDynamic = 4,
    Neighbor = 5,
    Boundary = 6,
}

/// Marker stored in a value struct's `valid` array for each attribute.
/// Value structs are built from `Option`s, so requests only ever carry
/// `Invalid` and `Valid`. `ValidNoValue` is read back as an absent attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidFlag {
    Invalid = 0,
    Valid = 1,
    ValidNoValue = 2,
}

impl ValidFlag {
    pub fn from_u8(b: u8) -> ValidFlag {
        match b {
            1 => ValidFlag::Valid,
            2 => ValidFlag::ValidNoValue,
            _ => ValidFlag::Invalid,
        }
    }

    /// The marker matching the presence of an attribute
    pub fn of<T>(attr: &Option<T>) -> ValidFlag {
        if attr.is_some() {
            ValidFlag::Valid
        }
        else {
            ValidFlag::Invalid
        }
    }
}

/// The namespace a key type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTypeRange {
    /// Owned by the logical service (UPLL)
    Logical,
    /// Owned by the physical service (UPPL)
    Physical,
    /// Neither of both
    Unclassified,
}

/// The object class a request is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Root = 0x000,

    /* UPLL */
    Flowlist = 0x001,
    FlowlistEntry = 0x002,
    PolicingProfile = 0x003,
    PolicingProfileEntry = 0x004,
    Vtn = 0x00a,
    VtnFlowfilter = 0x00b,
    VtnFlowfilterEntry = 0x00c,
    VtnPathmapEntry = 0x00e,
    Vbridge = 0x010,
    VbrVlanMap = 0x011,
    VbrIf = 0x014,
    Vrouter = 0x01a,
    VrtStaticIpRoute = 0x01b,
    VrtIf = 0x01e,
    VtnstationController = 0x040,

    /* UPPL */
    Controller = 0x200,
    Switch = 0x201,
    Port = 0x202,
    Link = 0x203,
    Domain = 0x204,
    LogicalPort = 0x205,
    Boundary = 0x207,
}

/// First and last key type owned by the logical service
const LOGICAL_RANGE: (u32, u32) = (KeyType::Flowlist as u32, KeyType::VtnstationController as u32);
/// First and last key type owned by the physical service
const PHYSICAL_RANGE: (u32, u32) = (KeyType::Controller as u32, KeyType::Boundary as u32);

/// Classifies a numeric key type by its range
pub fn key_type_range(key_type: u32) -> KeyTypeRange {
    if key_type >= LOGICAL_RANGE.0 && key_type <= LOGICAL_RANGE.1 {
        KeyTypeRange::Logical
    }
    else if key_type >= PHYSICAL_RANGE.0 && key_type <= PHYSICAL_RANGE.1 {
        KeyTypeRange::Physical
    }
    else {
        KeyTypeRange::Unclassified
    }
}

impl KeyType {
    pub fn range(&self) -> KeyTypeRange {
        key_type_range(*self as u32)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}(0x{:03x})", self, *self as u32)
    }
}

/// Result code of a successful request, in both namespaces
pub const RC_SUCCESS: u32 = 0;
/// UPLL result code for an empty read
pub const UPLL_RC_ERR_NO_SUCH_INSTANCE: u32 = 11;
/// UPPL result code for an empty read
pub const UPPL_RC_ERR_NO_SUCH_INSTANCE: u32 = 16;

/// Sentinel vlan id meaning "untagged traffic"
pub const NO_VLAN_ID: u16 = 0xffff;

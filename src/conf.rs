/*!
A parser for an INI file with the following structure:

```ini
[Connection]
uri=tcp:127.0.0.1:12000

[Services]
logical=upll
physical=uppl

[Read]
; default and ceiling of the max_repetition of reads
max_repetition=10000

; the names the API uses for each controller type
[Controllers]
bypass=bypass
pfc=pfc
vnp=vnp
polc=polc
odc=odc

[Redirect]
prefix=/tenants
context=/vtn-webapi

[Rollback]
; insertion or reverse
order=insertion
```

Every section is optional, missing sections take the values shown.
*/

use ini::ini;
use ini::Ini;

use std::convert::From;
use std::default::Default;
use std::error;
use std::fmt;
use std::io;
use std::net::*;
use std::num::ParseIntError;
use std::str::FromStr;

/// Default TCP port of the southbound session endpoint
pub const IPC_DEFAULT_PORT: u16 = 12000;

/// Default `max_repetition` of read requests
pub const DEFAULT_MAX_REPETITION: u32 = 10000;

const CONN_SECTION: &str = "Connection";
const URI_KEY: &str = "uri";

const SERVICES_SECTION: &str = "Services";
const LOGICAL_KEY: &str = "logical";
const PHYSICAL_KEY: &str = "physical";

const READ_SECTION: &str = "Read";
const MAX_REP_KEY: &str = "max_repetition";

const CONTROLLERS_SECTION: &str = "Controllers";

const REDIRECT_SECTION: &str = "Redirect";
const PREFIX_KEY: &str = "prefix";
const CONTEXT_KEY: &str = "context";

const ROLLBACK_SECTION: &str = "Rollback";
const ORDER_KEY: &str = "order";

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Ini(ini::Error),
    ParseMaxRepetition(ParseIntError),
    InvalidRollbackOrder(String),
    InvalidRedirect(String),
    InvalidUri,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => write!(f, "{}", e),
            Error::Ini(ref e) => write!(f, "{}", e),
            Error::ParseMaxRepetition(ref e) => {
                write!(f, "Error on trying to parse the max_repetition: {}", e)
            }
            Error::InvalidRollbackOrder(ref s) => {
                write!(f, "Rollback order {} is neither insertion nor reverse", s)
            }
            Error::InvalidRedirect(ref s) => {
                write!(f, "Redirect path {} does not start with a slash", s)
            }
            Error::InvalidUri => write!(f, "The IPC Connection URI from INI file is invalid"),
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(ioe) => ioe,
            _ => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        "INI configuration parser error"
    }
}

trait Section {
    type S;

    fn from_ini(conf: &Ini) -> Result<Self::S, Error>;
}

/// Where the southbound session endpoint listens
#[derive(Debug, Clone, PartialEq)]
pub struct IpcConnection {
    pub socket: SocketAddr,
}

impl Section for IpcConnection {
    type S = IpcConnection;

    fn from_ini(conf: &Ini) -> Result<Self::S, Error> {
        debug!("Reading [{}] section", CONN_SECTION);

        match conf.section(Some(CONN_SECTION.to_owned())) {
            Some(conn_section) => {
                let uri = conn_section
                    .get(URI_KEY)
                    .ok_or(Error::InvalidUri)?;
                IpcConnection::from_str(uri)
            }
            _ => Ok(IpcConnection::default()),
        }
    }
}

impl FromStr for IpcConnection {
    type Err = Error;

    /// Parses `tcp:<host>:<port>`, the port being optional
    fn from_str(conn: &str) -> Result<IpcConnection, Self::Err> {
        let def_port = IPC_DEFAULT_PORT.to_string();
        let mut conn_split: Vec<_> = conn.split(':').collect();
        if conn_split.len() == 2 {
            conn_split.push(&def_port);
        }
        if conn_split.len() == 3 && conn_split[0] == "tcp" {
            let joined = &format!("{}:{}", conn_split[1], conn_split[2]);
            if let Ok(socket) = SocketAddr::from_str(joined) {
                let connection = IpcConnection { socket: socket };
                debug!("Got {:?}", connection);
                return Ok(connection);
            }
        }
        Err(Error::InvalidUri)
    }
}

impl Default for IpcConnection {
    fn default() -> Self {
        let socket_v4 = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), IPC_DEFAULT_PORT);
        IpcConnection {
            socket: SocketAddr::V4(socket_v4),
        }
    }
}

/// Names of the southbound services
#[derive(Debug, Clone, PartialEq)]
pub struct Services {
    pub logical: String,
    pub physical: String,
}

impl Section for Services {
    type S = Services;

    fn from_ini(conf: &Ini) -> Result<Self::S, Error> {
        debug!("Reading [{}] section", SERVICES_SECTION);

        let mut services = Services::default();
        if let Some(section) = conf.section(Some(SERVICES_SECTION.to_owned())) {
            if let Some(logical) = section.get(LOGICAL_KEY) {
                services.logical = logical.to_owned();
            }
            if let Some(physical) = section.get(PHYSICAL_KEY) {
                services.physical = physical.to_owned();
            }
        }
        debug!("Got {:?}", services);
        Ok(services)
    }
}

impl Default for Services {
    fn default() -> Self {
        Services {
            logical: "upll".to_owned(),
            physical: "uppl".to_owned(),
        }
    }
}

/// The API names of each controller type, in the order of
/// their numeric codes
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerTypes {
    names: [String; 5],
}

const CONTROLLER_TYPE_KEYS: [&str; 5] = ["bypass", "pfc", "vnp", "polc", "odc"];

impl ControllerTypes {
    /// Maps an API controller type name to its numeric code
    pub fn code(&self, name: &str) -> Option<u8> {
        self.names.iter().position(|n| n == name).map(|i| i as u8)
    }
}

impl Default for ControllerTypes {
    fn default() -> Self {
        ControllerTypes {
            names: [
                CONTROLLER_TYPE_KEYS[0].to_owned(),
                CONTROLLER_TYPE_KEYS[1].to_owned(),
                CONTROLLER_TYPE_KEYS[2].to_owned(),
                CONTROLLER_TYPE_KEYS[3].to_owned(),
                CONTROLLER_TYPE_KEYS[4].to_owned(),
            ],
        }
    }
}

impl Section for ControllerTypes {
    type S = ControllerTypes;

    fn from_ini(conf: &Ini) -> Result<Self::S, Error> {
        debug!("Reading [{}] section", CONTROLLERS_SECTION);

        let mut types = ControllerTypes::default();
        if let Some(section) = conf.section(Some(CONTROLLERS_SECTION.to_owned())) {
            for (i, key) in CONTROLLER_TYPE_KEYS.iter().enumerate() {
                if let Some(name) = section.get(*key) {
                    types.names[i] = name.to_owned();
                }
            }
        }
        debug!("Got {:?}", types);
        Ok(types)
    }
}

/// Where requests of the tenant API are forwarded to
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectConf {
    pub prefix: String,
    pub context: String,
}

impl Default for RedirectConf {
    fn default() -> Self {
        RedirectConf {
            prefix: "/tenants".to_owned(),
            context: "/vtn-webapi".to_owned(),
        }
    }
}

impl Section for RedirectConf {
    type S = RedirectConf;

    fn from_ini(conf: &Ini) -> Result<Self::S, Error> {
        debug!("Reading [{}] section", REDIRECT_SECTION);

        let mut redirect = RedirectConf::default();
        if let Some(section) = conf.section(Some(REDIRECT_SECTION.to_owned())) {
            if let Some(prefix) = section.get(PREFIX_KEY) {
                redirect.prefix = prefix.to_owned();
            }
            if let Some(context) = section.get(CONTEXT_KEY) {
                redirect.context = context.to_owned();
            }
        }
        for path in &[&redirect.prefix, &redirect.context] {
            if !path.starts_with('/') {
                return Err(Error::InvalidRedirect(path.to_string()));
            }
        }
        debug!("Got {:?}", redirect);
        Ok(redirect)
    }
}

/// The order in which a rollback replays the issued packets
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RollbackOrder {
    /// Oldest packet first
    Insertion,
    /// Newest packet first
    Reverse,
}

impl FromStr for RollbackOrder {
    type Err = Error;

    fn from_str(order: &str) -> Result<RollbackOrder, Self::Err> {
        match order {
            "insertion" => Ok(RollbackOrder::Insertion),
            "reverse" => Ok(RollbackOrder::Reverse),
            _ => Err(Error::InvalidRollbackOrder(order.to_owned())),
        }
    }
}

impl Section for RollbackOrder {
    type S = RollbackOrder;

    fn from_ini(conf: &Ini) -> Result<Self::S, Error> {
        debug!("Reading [{}] section", ROLLBACK_SECTION);

        match conf
            .section(Some(ROLLBACK_SECTION.to_owned()))
            .and_then(|s| s.get(ORDER_KEY))
        {
            Some(order) => RollbackOrder::from_str(order),
            None => Ok(RollbackOrder::Insertion),
        }
    }
}

/// The complete gateway configuration.
/// Constructed once and handed to every component that needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConf {
    pub connection: IpcConnection,
    pub services: Services,
    /// Default and ceiling of the max_repetition of reads
    pub max_repetition: u32,
    pub controllers: ControllerTypes,
    pub redirect: RedirectConf,
    pub rollback_order: RollbackOrder,
}

impl Default for GatewayConf {
    fn default() -> Self {
        GatewayConf {
            connection: IpcConnection::default(),
            services: Services::default(),
            max_repetition: DEFAULT_MAX_REPETITION,
            controllers: ControllerTypes::default(),
            redirect: RedirectConf::default(),
            rollback_order: RollbackOrder::Insertion,
        }
    }
}

fn max_repetition_from_ini(conf: &Ini) -> Result<u32, Error> {
    debug!("Reading [{}] section", READ_SECTION);

    match conf
        .section(Some(READ_SECTION.to_owned()))
        .and_then(|s| s.get(MAX_REP_KEY))
    {
        Some(max) => max.parse().map_err(Error::ParseMaxRepetition),
        None => Ok(DEFAULT_MAX_REPETITION),
    }
}

impl GatewayConf {
    pub fn from_ini(conf: &Ini) -> Result<GatewayConf, Error> {
        Ok(GatewayConf {
            connection: IpcConnection::from_ini(conf)?,
            services: Services::from_ini(conf)?,
            max_repetition: max_repetition_from_ini(conf)?,
            controllers: ControllerTypes::from_ini(conf)?,
            redirect: RedirectConf::from_ini(conf)?,
            rollback_order: RollbackOrder::from_ini(conf)?,
        })
    }
}

pub fn parse_file(path: &str) -> Result<GatewayConf, Error> {
    info!("Reading INI file {}", path);

    let conf = match Ini::load_from_file(path) {
        Ok(i) => i,
        Err(e) => {
            return Err(Error::Ini(e));
        }
    };

    GatewayConf::from_ini(&conf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conf(s: &str) -> Result<GatewayConf, Error> {
        GatewayConf::from_ini(&Ini::load_from_str(s).unwrap())
    }

    #[test]
    fn empty_file_takes_defaults() {
        assert_eq!(GatewayConf::default(), conf("").unwrap());
    }

    #[test]
    fn connection_uri() {
        let c = IpcConnection::from_str("tcp:192.0.2.1:4000").unwrap();
        assert_eq!("192.0.2.1:4000".parse::<SocketAddr>().unwrap(), c.socket);
        let c = IpcConnection::from_str("tcp:192.0.2.1").unwrap();
        assert_eq!(IPC_DEFAULT_PORT, c.socket.port());
        assert!(IpcConnection::from_str("udp:192.0.2.1:4000").is_err());
        assert!(IpcConnection::from_str("192.0.2.1").is_err());
    }

    #[test]
    fn sections() {
        let c = conf(
            "[Read]\nmax_repetition=500\n\
             [Controllers]\nodc=opendaylight\n\
             [Services]\nphysical=phys\n\
             [Rollback]\norder=reverse\n",
        ).unwrap();
        assert_eq!(500, c.max_repetition);
        assert_eq!(Some(4), c.controllers.code("opendaylight"));
        assert_eq!(None, c.controllers.code("odc"));
        assert_eq!(Some(1), c.controllers.code("pfc"));
        assert_eq!("upll", c.services.logical);
        assert_eq!("phys", c.services.physical);
        assert_eq!(RollbackOrder::Reverse, c.rollback_order);
    }

    #[test]
    fn invalid_values() {
        assert!(conf("[Read]\nmax_repetition=many\n").is_err());
        assert!(conf("[Rollback]\norder=random\n").is_err());
        assert!(conf("[Redirect]\ncontext=vtn-webapi\n").is_err());
    }
}

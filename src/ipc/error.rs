use result_code::ErrorJson;
use std::error;
use std::fmt;
use std::io;
use std::result;

/// Every failure a request/response cycle can end with
#[derive(Debug)]
pub enum Error {
    /// The session transport failed
    Io(io::Error),
    /// A response frame could not be decoded
    Decode(String),
    /// The session reported a fatal response
    IpcOp(String),
    /// The southbound service answered with an error result code
    Service(ErrorJson),
    /// Replaying a packet during rollback failed
    Rollback(Box<Error>),
    /// The request could not be assembled
    Internal(String),
}

impl Error {
    /// The stringified code handed to the caller
    pub fn code(&self) -> String {
        match *self {
            Error::Io(_) | Error::Decode(_) | Error::IpcOp(_) => "IPC_OP_ERROR".to_owned(),
            Error::Service(ref e) => e.code.to_string(),
            Error::Rollback(_) => "ROLLBACK_ERROR".to_owned(),
            Error::Internal(_) => "INTERNAL_ERROR".to_owned(),
        }
    }

    /// The error body to report for this failure
    pub fn error_json(&self) -> ErrorJson {
        match *self {
            Error::Service(ref e) => e.clone(),
            Error::Rollback(ref cause) => cause.error_json(),
            _ => ErrorJson::internal_server_error(),
        }
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        "UNC IPC request error"
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => write!(f, "{}: session failed: {}", self.code(), e),
            Error::Decode(ref s) => write!(f, "{}: malformed response: {}", self.code(), s),
            Error::IpcOp(ref s) => write!(f, "{}: {}", self.code(), s),
            Error::Service(ref e) => write!(f, "{}: {}", e.code, e.msg),
            Error::Rollback(ref cause) => write!(f, "{}: {}", self.code(), cause),
            Error::Internal(ref s) => write!(f, "{}: {}", self.code(), s),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(ioe) => ioe,
            _ => io::Error::new(io::ErrorKind::Other, e.to_string()),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!("IPC_OP_ERROR", Error::IpcOp("fatal".to_owned()).code());
        assert_eq!("INTERNAL_ERROR", Error::Internal("x".to_owned()).code());
        let service = Error::Service(ErrorJson::new(40400, "Resource not found"));
        assert_eq!("40400", service.code());
        let rollback = Error::Rollback(Box::new(service));
        assert_eq!("ROLLBACK_ERROR", rollback.code());
        assert_eq!(40400, rollback.error_json().code);
    }
}

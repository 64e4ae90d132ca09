/*!
Classification of southbound result codes into the error bodies
of the northbound API

The logical service (UPLL) and the physical service (UPPL) number their
result codes independently. Which table applies is decided by the key
type's range, not by the code itself.
*/

use serde_json::Value;
use std::fmt;
use unc::{key_type_range, KeyTypeRange};

/// An error as reported to the API client:
/// `{"error": {"code": <code>, "msg": <msg>}}`
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorJson {
    pub code: u32,
    pub msg: String,
}

impl ErrorJson {
    pub fn new(code: u32, msg: &str) -> ErrorJson {
        ErrorJson {
            code: code,
            msg: msg.to_owned(),
        }
    }

    /// For key types that belong to neither service
    pub fn server_error() -> ErrorJson {
        ErrorJson::new(50000, "Server error")
    }

    /// For responses that do not even carry a result code
    pub fn internal_server_error() -> ErrorJson {
        ErrorJson::new(50000, "Internal server error")
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code,
                "msg": self.msg,
            }
        })
    }
}

impl fmt::Display for ErrorJson {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Maps a UPLL result code. Unknown codes are treated as a generic failure.
fn upll_error(result_code: u32) -> (u32, &'static str) {
    match result_code {
        2 => (40001, "Bad request"),
        3 => (40002, "Invalid config or session id"),
        4 => (40500, "Operation not supported"),
        5 => (40003, "Invalid option1"),
        6 => (40004, "Invalid option2"),
        7 => (40005, "Configuration syntax error"),
        8 => (40006, "Configuration semantic error"),
        9 => (50301, "Resource disconnected"),
        10 => (50002, "Database access error"),
        11 => (40400, "Resource not found"),
        12 => (40401, "No such name"),
        13 => (40402, "No such data type"),
        14 => (50101, "Not supported by controller"),
        15 => (50302, "Not supported by standby"),
        16 => (40403, "Parent resource does not exist"),
        17 => (40901, "Resource already exists"),
        18 => (40501, "Not allowed for this data type"),
        19 => (40502, "Not allowed for this key type"),
        20 => (50303, "Not allowed at this time"),
        21 => (40301, "Exceeds resource limit"),
        22 => (40902, "Merge conflict"),
        23 => (40903, "Candidate configuration is dirty"),
        24 => (50304, "Shutting down"),
        _ => (50000, "Generic error"),
    }
}

/// Maps a UPPL result code. Unknown codes are treated as a generic failure.
fn uppl_error(result_code: u32) -> (u32, &'static str) {
    match result_code {
        2 => (40001, "Bad request"),
        3 => (40002, "Invalid config id"),
        4 => (40002, "Invalid session id"),
        5 => (40007, "Version not supported"),
        6 => (40502, "Key type not supported"),
        7 => (40501, "Data type not supported"),
        8 => (40008, "Attribute not supported"),
        9 => (40500, "Operation not supported"),
        10 => (40503, "Operation not allowed"),
        11 => (40003, "Invalid option1"),
        12 => (40004, "Invalid option2"),
        13 => (40005, "Configuration syntax error"),
        14 => (40006, "Configuration semantic error"),
        15 => (40403, "Parent resource does not exist"),
        16 => (40400, "Resource not found"),
        17 => (40901, "Resource already exists"),
        18 => (40301, "Exceeds resource limit"),
        19 => (50002, "Database access error"),
        20 => (50003, "Database update error"),
        21 => (50004, "Database write error"),
        22 => (50005, "Database get error"),
        23 => (50006, "IPC write error"),
        24 => (50102, "Notification not supported"),
        25 => (50304, "Shutting down"),
        _ => (50000, "Failure"),
    }
}

/// Builds the error body for a non-success `result_code` of a request
/// about `key_type`
pub fn create_error_json(result_code: u32, key_type: u32) -> ErrorJson {
    let (code, msg) = match key_type_range(key_type) {
        KeyTypeRange::Logical => upll_error(result_code),
        KeyTypeRange::Physical => uppl_error(result_code),
        KeyTypeRange::Unclassified => return ErrorJson::server_error(),
    };
    debug!(
        "Result code {} of key type 0x{:03x} maps to {} {}",
        result_code, key_type, code, msg
    );
    ErrorJson::new(code, msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unc::{KeyType, UPLL_RC_ERR_NO_SUCH_INSTANCE, UPPL_RC_ERR_NO_SUCH_INSTANCE};

    #[test]
    fn unclassified_key_types() {
        for kt in &[KeyType::Root as u32, 0x100, 0x1ff, 0x208, 0xffff_ffff] {
            assert_eq!(ErrorJson::server_error(), create_error_json(17, *kt));
        }
    }

    #[test]
    fn tables_follow_key_type_range() {
        let logical = create_error_json(UPLL_RC_ERR_NO_SUCH_INSTANCE, KeyType::Vbridge as u32);
        assert_eq!(40400, logical.code);
        let physical = create_error_json(UPPL_RC_ERR_NO_SUCH_INSTANCE, KeyType::Port as u32);
        assert_eq!(40400, physical.code);
        // the same number means different things in both namespaces
        assert_eq!(40403, create_error_json(16, KeyType::Vtn as u32).code);
    }

    #[test]
    fn unknown_codes() {
        assert_eq!("Generic error", create_error_json(999, KeyType::Vtn as u32).msg);
        assert_eq!("Failure", create_error_json(999, KeyType::Controller as u32).msg);
    }

    #[test]
    fn json_shape() {
        let expected = json!({"error": {"code": 40901, "msg": "Resource already exists"}});
        assert_eq!(expected, create_error_json(17, KeyType::Vtn as u32).to_json());
    }
}

//! Decides which requests are forwarded to the tenant web application

use conf::RedirectConf;

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Forward to the given path, query included
    Forward(String),
    /// Leave the request to the current application
    PassThrough,
}

pub struct RedirectFilter {
    conf: RedirectConf,
}

impl RedirectFilter {
    pub fn new(conf: RedirectConf) -> RedirectFilter {
        RedirectFilter { conf: conf }
    }

    /// Requests below the configured prefix are forwarded into the
    /// configured context with their query string re-appended
    pub fn dispatch(&self, uri: &str, query: Option<&str>) -> Dispatch {
        if !uri.starts_with(&self.conf.prefix) {
            return Dispatch::PassThrough;
        }
        let target = match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", self.conf.context, uri, q),
            _ => format!("{}{}", self.conf.context, uri),
        };
        debug!("Forwarding {} to {}", uri, target);
        Dispatch::Forward(target)
    }
}

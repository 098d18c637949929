// Typed names for JMAP object kinds and their standard methods.

use jmap_batch_core::Capability;
use std::fmt;

/// Object kinds the client knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Mailbox,
    Email,
    Thread,
    Identity,
    EmailSubmission,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Mailbox => "Mailbox",
            Kind::Email => "Email",
            Kind::Thread => "Thread",
            Kind::Identity => "Identity",
            Kind::EmailSubmission => "EmailSubmission",
        }
    }

    /// Capability whose primary account owns objects of this kind.
    pub fn capability(&self) -> Capability {
        match self {
            Kind::Mailbox | Kind::Email | Kind::Thread => Capability::MAIL,
            Kind::Identity | Kind::EmailSubmission => Capability::SUBMISSION,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Set,
    Query,
    Changes,
    QueryChanges,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Set => "set",
            Method::Query => "query",
            Method::Changes => "changes",
            Method::QueryChanges => "queryChanges",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire method name, e.g. `Mailbox/get`.
pub fn method_name(kind: Kind, method: Method) -> String {
    format!("{}/{}", kind, method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!(method_name(Kind::Mailbox, Method::Get), "Mailbox/get");
        assert_eq!(method_name(Kind::Email, Method::QueryChanges), "Email/queryChanges");
        assert_eq!(method_name(Kind::EmailSubmission, Method::Set), "EmailSubmission/set");
    }

    #[test]
    fn test_kind_capabilities() {
        assert_eq!(Kind::Thread.capability(), Capability::MAIL);
        assert_eq!(Kind::Identity.capability(), Capability::SUBMISSION);
    }
}

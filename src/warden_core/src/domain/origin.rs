/// Where a request came from, as far as the transport layer could tell.
/// Attached to audit events; never used for decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

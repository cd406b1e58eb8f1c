use crate::service::{Service, ServiceStatus};
use dmp_gossip::{Member, MemberStatus};

pub const NAMESPACE_TAG: &str = "namespace";
pub const COMM_PORT_TAG: &str = "messagePort";
pub const TOPIC_PREFIX: &str = "TAG:";

/// Build the gossip tag set for a registration (§4.6 "Register"/"Update").
pub fn service_tags(namespace: &str, comm_port: u16, topics: &std::collections::HashSet<String>) -> std::collections::HashMap<String, String> {
    let mut tags = std::collections::HashMap::new();
    tags.insert(NAMESPACE_TAG.to_string(), namespace.to_string());
    tags.insert(COMM_PORT_TAG.to_string(), comm_port.to_string());
    for topic in topics {
        tags.insert(format!("{TOPIC_PREFIX}{topic}"), topic.clone());
    }
    tags
}

/// Project a gossip member's tags and failure-detector status into a
/// `Service`. Returns `None` if the member never registered a namespace
/// (a bare cluster peer with no DMP router attached).
///
/// Grounded on `discovery/serf_discovery.go`'s `ConvertMemberToService`.
pub fn member_to_service(member: &Member, status: &MemberStatus) -> Option<Service> {
    let namespace = member.tags.get(NAMESPACE_TAG)?.clone();
    let comm_port: u16 = member.tags.get(COMM_PORT_TAG)?.parse().ok()?;

    let service_status = match status {
        MemberStatus::Alive { .. } => ServiceStatus::Alive,
        MemberStatus::Suspect { .. } => ServiceStatus::Suspect,
        MemberStatus::Dead { .. } => ServiceStatus::Fail,
    };

    let mut service = Service::new(namespace, member.addr.ip(), comm_port, service_status);
    for key in member.tags.keys() {
        if let Some(topic) = key.strip_prefix(TOPIC_PREFIX) {
            service.subscribe(topic);
        }
    }
    Some(service)
}
